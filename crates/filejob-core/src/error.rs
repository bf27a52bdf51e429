//! Error types for the job lifecycle engine
//!
//! Each stage of a run has its own error type so callers can tell an inline
//! validation problem from a terminal remote failure. [`Error`] wraps them for
//! APIs that cross stages.

use thiserror::Error;

use crate::types::job::JobKind;

/// Result type alias for filejob operations
pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected before any job exists. Recoverable; shown inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a file.")]
    NoFile,

    #[error("File size exceeds {limit_mb}MB limit.")]
    FileTooLarge { limit_mb: u64 },

    /// Same as `FileTooLarge`, used for multi-file batches
    #[error("File \"{name}\" exceeds {limit_mb}MB limit.")]
    NamedFileTooLarge { name: String, limit_mb: u64 },

    #[error("Please select a PDF file.")]
    NotPdf,

    #[error("File \"{name}\" is not a PDF.")]
    NamedNotPdf { name: String },

    #[error("Unsupported image type: {mime}")]
    UnsupportedImage { mime: String },

    #[error("Could not read image dimensions.")]
    UndecodableImage,

    #[error("Image has zero width or height.")]
    ZeroDimension,

    #[error("only one file can be submitted for {kind}")]
    TooManyFiles { kind: JobKind },

    #[error("at least 2 files required")]
    NotEnoughFiles,

    #[error("start page must be at least 1")]
    StartPageTooLow,

    #[error("end page must be ≥ start page")]
    PageRangeInverted,

    #[error("page numbers cannot exceed {max}")]
    PageOutOfRange { max: u32 },

    #[error("width and height must be at least 1")]
    InvalidDimensions,

    #[error("quality must be between 1 and 100")]
    QualityOutOfRange,

    #[error("target size must be between 1 and {max_kb} KB")]
    TargetSizeOutOfRange { max_kb: u32 },

    #[error("file is already {format}")]
    SameFormat { format: String },

    #[error("{actual} options cannot be used for a {expected} job")]
    OptionsMismatch { expected: JobKind, actual: JobKind },
}

/// Job creation failed. Terminal for the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Submission request failed: {0}")]
    Transport(String),

    #[error("Submission rejected: HTTP {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to parse submission response: {0}")]
    MalformedResponse(String),
}

/// A progress check failed. Terminal for the run; the poller is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollingError {
    #[error("Progress request failed: {0}")]
    Transport(String),

    #[error("Progress check failed: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse progress response: {0}")]
    Decode(String),

    #[error("job finished without a result location")]
    MissingResult,
}

/// Downloading or saving the result failed. The job keeps its status; retry
/// by retrieving again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("No result is available for this job")]
    NoResult,

    #[error("Download failed: {0}")]
    Transport(String),

    #[error("Download failed: HTTP {status}")]
    Status { status: u16 },

    #[error("Failed to save '{filename}': {message}")]
    Save { filename: String, message: String },
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Polling(#[from] PollingError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error leaves the current job untouched
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Retrieval(_))
    }
}
