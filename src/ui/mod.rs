//! Terminal back-office screens. Each screen owns an `XState`, renders with
//! `render_x` and turns key presses into an `XAction` the app loop executes.

pub mod analytics;
pub mod categories;
pub mod category_wizard;
pub mod change_password;
pub mod client_wizard;
pub mod clients;
pub mod components;
pub mod dashboard;
pub mod finance;
pub mod finance_wizard;
pub mod job_wizard;
pub mod jobs;
pub mod login;
pub mod messages;
pub mod project_wizard;
pub mod projects;
