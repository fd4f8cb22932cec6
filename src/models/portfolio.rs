use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct PortfolioCategory {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub position: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl PortfolioCategory {
    pub fn new(position: i32) -> Self {
        Self {
            id: 0,
            name: String::new(),
            slug: String::new(),
            position,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct PortfolioProject {
    pub id: i32,
    pub category_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub project_date: Option<NaiveDate>,
    pub position: i32,
    /// Draft projects never reach the public site
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PortfolioProject {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            category_id: None,
            title: String::new(),
            description: None,
            client_name: None,
            project_date: None,
            position: 0,
            published: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for PortfolioProject {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct PortfolioImage {
    pub id: i32,
    pub project_id: i32,
    pub url: String,
    pub title: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// An image attached to a project form before it is saved
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDraft {
    pub url: String,
    pub title: Option<String>,
}

impl From<&PortfolioImage> for ImageDraft {
    fn from(image: &PortfolioImage) -> Self {
        Self {
            url: image.url.clone(),
            title: image.title.clone(),
        }
    }
}

/// A project with its category name and images sorted by position
#[derive(Serialize, Debug, Clone)]
pub struct ProjectWithImages {
    pub project: PortfolioProject,
    pub category_name: Option<String>,
    pub images: Vec<PortfolioImage>,
}

impl ProjectWithImages {
    pub fn cover(&self) -> Option<&PortfolioImage> {
        self.images.first()
    }
}
