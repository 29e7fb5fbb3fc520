use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerDbError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("account already exists: {0}")]
    AccountExists(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("invalid password")]
    InvalidPassword,

    #[error("character key already taken: {0}")]
    CharacterKeyTaken(String),

    #[error("character not found: {0}")]
    CharacterNotFound(i64),

    #[error("character {0} has already finished creation")]
    AlreadyCommitted(i64),

    #[error("sheet encoding error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("password hashing error: {0}")]
    HashError(String),
}
