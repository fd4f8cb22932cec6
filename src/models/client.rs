use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct Client {
    pub id: i32,
    pub company_name: String,
    pub tax_id: Option<String>,
    pub contact_person: Option<String>,
    pub personal_tax_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            company_name: String::new(),
            tax_id: None,
            contact_person: None,
            personal_tax_id: None,
            birth_date: None,
            address: None,
            city: None,
            state: None,
            email: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive match on company name or contact person, plain match on tax id.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.company_name.to_lowercase().contains(&needle)
            || self
                .contact_person
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&needle))
            || self.tax_id.as_deref().is_some_and(|t| t.contains(term))
    }

    /// "City, ST" when a city is known.
    pub fn location(&self) -> Option<String> {
        let city = self.city.as_deref().filter(|c| !c.is_empty())?;
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => Some(format!("{}, {}", city, state)),
            None => Some(city.to_string()),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_covers_name_contact_and_tax_id() {
        let mut client = Client::new();
        client.company_name = "Foto Sul Ltda".to_string();
        client.contact_person = Some("Ana Souza".to_string());
        client.tax_id = Some("12.345.678/0001-90".to_string());

        assert!(client.matches("foto"));
        assert!(client.matches("SOUZA"));
        assert!(client.matches("345.678"));
        assert!(!client.matches("studio"));
    }

    #[test]
    fn location_joins_city_and_state() {
        let mut client = Client::new();
        assert_eq!(client.location(), None);
        client.city = Some("Maringá".to_string());
        assert_eq!(client.location().as_deref(), Some("Maringá"));
        client.state = Some("PR".to_string());
        assert_eq!(client.location().as_deref(), Some("Maringá, PR"));
    }
}
