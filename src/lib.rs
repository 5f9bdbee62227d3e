//! Tubescript - A Rust CLI tool for fetching YouTube transcripts
//!
//! This library extracts a video identifier from a URL, looks the transcript up through a
//! primary caption source, falls back to the player's caption tracks when that fails, and
//! exports the result as text, JSON or a Word document.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod retrieval;
pub mod sources;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{extract_video_id, VideoId};
pub use retrieval::{display_parts, Transcript, TranscriptOrigin, TranscriptPipeline, TranscriptResult};
pub use sources::{FallbackSource, SourceTranscript, TranscriptSegment, TranscriptSource};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Marker every user-facing error message starts with
pub const ERROR_MARKER: &str = "Error:";

/// Categorized retrieval failures. The `Display` text is the message shown to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Error: Please enter a valid YouTube URL.")]
    InvalidUrl,

    #[error("Error: Subtitles are disabled for this video.")]
    CaptionsDisabled,

    #[error("Error: No transcript was found for this video in the requested languages.")]
    NoTranscriptFound,

    #[error("Error: The video is unavailable or private.")]
    VideoUnavailable,

    #[error("Error: Too many requests were sent to YouTube. Please wait a while and try again.")]
    RateLimited,

    #[error("Error: No caption tracks were found for this video.")]
    NoCaptionsFound,

    #[error("Error: An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl TranscriptError {
    /// Short machine-readable name of the failure category
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid-url",
            Self::CaptionsDisabled => "captions-disabled",
            Self::NoTranscriptFound => "no-transcript-found",
            Self::VideoUnavailable => "video-unavailable",
            Self::RateLimited => "rate-limited",
            Self::NoCaptionsFound => "no-captions-found",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl From<reqwest::Error> for TranscriptError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            return Self::RateLimited;
        }
        Self::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for TranscriptError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(format!("malformed response: {}", err))
    }
}

impl From<url::ParseError> for TranscriptError {
    fn from(err: url::ParseError) -> Self {
        Self::Unexpected(format!("malformed caption URL: {}", err))
    }
}

/// Whether a piece of display text is an error message rather than a transcript
pub fn is_error_text(text: &str) -> bool {
    text.starts_with(ERROR_MARKER)
}
