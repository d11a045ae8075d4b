use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlabError {
    #[error("No session found for id '{0}'")]
    SessionNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine errors outside the query boundary (e.g. the CLI opening its
    /// own database). Errors crossing the query boundary are sanitized into
    /// `Execution` instead.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SqlabError>;
