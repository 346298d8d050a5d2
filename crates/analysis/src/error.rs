use chatstats_core::MessageId;
use thiserror::Error;

/// Errors that can occur during analysis operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Loading the chat export failed.
    #[error(transparent)]
    Core(#[from] chatstats_core::Error),
    /// NLP processing error.
    #[error("NLP error: {0}")]
    Nlp(String),
    /// A message lacks a key the operation reads.
    #[error("Message {id} has no `{field}` field")]
    MissingField {
        /// Id of the offending message.
        id: MessageId,
        /// Name of the missing key.
        field: &'static str,
    },
    /// Font loading error.
    #[error("Font error: {0}")]
    Font(String),
    /// Image encoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Nothing left to draw after stop-word removal.
    #[error("Need at least one word to plot a word cloud, got 0")]
    EmptyCorpus,
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O operation error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
