use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Access to this chatroom is not allowed")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
