use thiserror::Error;

/// Errors raised by the store, the services and the blob bucket
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("invalid e-mail or password")]
    Unauthorized,

    #[error("job {0} already has an open time-tracking session")]
    SessionAlreadyOpen(i32),

    #[error("invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("mail error: {0}")]
    Mail(String),
}

pub type StudioResult<T> = Result<T, StudioError>;

impl StudioError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StudioError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StudioError::Validation(message.into())
    }
}
