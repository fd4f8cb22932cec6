//! Domain operations shared by the terminal back-office and the web server.

pub mod analytics;
pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod finance;
pub mod jobs;
pub mod portfolio;
pub mod time_tracker;
