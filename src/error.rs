use thiserror::Error;

pub type Result<T> = std::result::Result<T, BacklogError>;

#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("Story not found: {0}")]
    StoryNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Checklist not found: {0}")]
    ChecklistNotFound(String),

    #[error("Checklist item not found: {0}")]
    ChecklistItemNotFound(usize),

    #[error("Reorder partially applied ({applied} of {total} updates): {failed}")]
    PartialUpdate {
        applied: usize,
        total: usize,
        failed: String,
    },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}
