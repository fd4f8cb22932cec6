use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct Contact {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub message: String,
    pub read: bool,
}

/// Fields posted by the public contact form
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn clear(&mut self) {
        *self = ContactForm::default();
    }
}
