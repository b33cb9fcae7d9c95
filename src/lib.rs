//! Summarize AI - A Rust CLI tool for summarizing YouTube videos
//!
//! This library resolves a video identifier from a YouTube link, fetches the video's
//! transcript in a chosen spoken language and asks Google Gemini for a bullet-point
//! summary of it.

pub mod cli;
pub mod config;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod summarize;
pub mod transcript;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ApiKey, Config};
pub use language::LanguageSelection;
pub use pipeline::{PipelineOutcome, SummaryPipeline, SummaryReport};
pub use resolver::{resolve, VideoReference};
pub use summarize::{Summarizer, SummarizerError};
pub use transcript::{Acquisition, ProviderError, TranscriptAcquirer, TranscriptProvider};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, SummarizeError>;

/// Error types specific to summarization requests
#[derive(thiserror::Error, Debug)]
pub enum SummarizeError {
    #[error("Invalid video link: {0}")]
    MalformedInput(String),

    #[error("Transcript provider failed: {0}")]
    ProviderFailure(#[from] ProviderError),

    #[error("Summarizer failed: {0}")]
    SummarizerFailure(#[from] SummarizerError),

    #[error("Configuration error: {0}")]
    Config(String),
}
