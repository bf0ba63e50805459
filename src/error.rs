use thiserror::Error;

/// Errors surfaced by the assistant pipeline.
///
/// SQL failures of a generated statement are not represented here: they are
/// captured in [`crate::query::QueryOutcome::Error`] and narrated to the user.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Connecting to the database or reading its catalog failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The chat model could not be reached or returned an unusable reply.
    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading the user's input or writing to the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AssistantError>;
