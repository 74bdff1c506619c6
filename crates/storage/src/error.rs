use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness or referential constraint rejected the write,
    /// e.g. an already-taken username. Carries SQLite's message naming
    /// the violated constraint.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(failure, Some(message))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Conflict(message.clone())
            }
            _ => Error::Database(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
