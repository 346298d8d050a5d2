//! Text analysis and statistics for Telegram chat exports.
//!
//! This crate provides Persian/Arabic-aware normalization and tokenization,
//! stop-word removal, question detection, reply statistics, and word cloud
//! rendering.

#![deny(missing_docs, unsafe_code)]

/// Normalization, tokenization, and stop words.
pub mod nlp;

/// Question detection.
pub mod question;

/// Reply statistics and word cloud corpus.
pub mod stats;

/// Word cloud layout and rendering.
pub mod wordcloud;

/// Error types for analysis operations.
pub mod error;

pub use error::{AnalysisError, AnalysisResult};
pub use nlp::{Normalizer, StopWords, TextPipeline};
pub use question::{QuestionFlags, QuestionStatus};
pub use stats::{ChatStatistics, UserReplyCount};
pub use wordcloud::WordCloud;
