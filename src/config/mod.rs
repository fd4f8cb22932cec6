use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Address the public site listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Directory backing the portfolio image bucket
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Base URL used to build public image links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub compress_uploads: bool,
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,
    /// Log destination for the terminal back-office
    #[serde(default = "default_log_file")]
    pub log_file: String,
    pub smtp_server: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub notify_from: Option<String>,
    pub notify_to: Option<String>,
}

fn default_max_connections() -> u32 {
    5
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_storage_dir() -> String {
    "./storage/portfolio".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_session_ttl_minutes() -> i64 {
    720
}

fn default_log_file() -> String {
    "studio-manager.log".to_string()
}

/// SMTP settings, present only when every notification variable is set
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn smtp(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            server: self.smtp_server.clone()?,
            username: self.smtp_username.clone()?,
            password: self.smtp_password.clone()?,
            from: self.notify_from.clone()?,
            to: self.notify_to.clone()?,
        })
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config: Config =
            envy::from_iter(vars(&[("DATABASE_URL", "postgres://localhost/studio")])).unwrap();

        assert_eq!(config.database_url(), "postgres://localhost/studio");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert!(!config.compress_uploads);
        assert!(config.smtp().is_none());
    }

    #[test]
    fn smtp_requires_every_field() {
        let partial: Config = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/studio"),
            ("SMTP_SERVER", "smtp.example.com"),
            ("NOTIFY_TO", "studio@example.com"),
        ]))
        .unwrap();
        assert!(partial.smtp().is_none());

        let full: Config = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/studio"),
            ("SMTP_SERVER", "smtp.example.com"),
            ("SMTP_USERNAME", "user"),
            ("SMTP_PASSWORD", "secret"),
            ("NOTIFY_FROM", "site@example.com"),
            ("NOTIFY_TO", "studio@example.com"),
        ]))
        .unwrap();
        let smtp = full.smtp().unwrap();
        assert_eq!(smtp.server, "smtp.example.com");
        assert_eq!(smtp.to, "studio@example.com");
    }
}
