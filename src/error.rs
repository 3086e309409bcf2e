use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{entity_type} already exists: {identifier}")]
    AlreadyExists {
        entity_type: String,
        identifier: String,
    },

    #[error("{entity_type} {id} is still referenced by existing callings")]
    InUse { entity_type: String, id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

impl TrackError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        TrackError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        TrackError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TrackError::Validation { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, TrackError::PermissionDenied { .. })
    }
}

pub type TrackResult<T> = Result<T, TrackError>;
