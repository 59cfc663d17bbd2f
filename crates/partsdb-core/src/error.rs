use thiserror::Error;

pub use sqlx::Error as SqlxError;

#[derive(Debug, Error)]
pub enum PartsError {
    #[error("category not found: {0}")]
    CategoryNotFound(i32),

    #[error("part not found: {0}")]
    PartNotFound(i32),

    #[error("parts.name is immutable once assigned (part {0})")]
    PartNameImmutable(i32),

    #[error("invalid id '{0}': expected an integer")]
    InvalidId(String),

    #[error("unknown library: {0}")]
    UnknownLibrary(String),

    #[error("invalid identifier '{0}': must be lowercase alphanumeric with underscores")]
    InvalidIdentifier(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PartsError>;
