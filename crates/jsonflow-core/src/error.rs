use thiserror::Error;

/// Errors surfaced by the JSON-to-graph pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The caller handed over something that breaks a graph precondition.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The document text is not valid JSON. Line and column are 1-based.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("Input of {size} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        // serde_json appends " at line X column Y" to Display; keep only the cause.
        let message = err.to_string();
        let message = match message.rfind(" at line ") {
            Some(pos) => message[..pos].to_string(),
            None => message,
        };
        Self::Syntax {
            line: err.line(),
            column: err.column(),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
