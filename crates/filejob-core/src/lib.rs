//! filejob-core: client-side lifecycle engine for remote file transformation jobs
//!
//! A job is validated locally, submitted to a remote processing service, polled
//! until it reaches a terminal state, and its result is fetched on demand. One
//! [`JobController`] drives one job at a time for one [`JobKind`].

pub mod collection;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod naming;
pub mod processing;
pub mod providers;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use collection::OrderedCollection;
pub use config::FilejobConfig;
pub use dimensions::{AspectRatio, DimensionSolver, Preset, PRESETS};
pub use error::{Error, PollingError, Result, RetrievalError, SubmissionError, ValidationError};
pub use processing::{
    JobController, JobSubmitter, PollSchedule, PollerState, ProgressPoller, ResultRetriever,
};
pub use providers::{DirectorySink, HttpJobService, JobService, MemorySink, ResultSink};
pub use types::{
    file::{FileId, ImageDimensions, SelectedFile},
    job::{Job, JobId, JobKind, JobSnapshot, JobStatus, ResultRef},
    options::{
        CompressImageOptions, CompressPdfOptions, CompressionLevel, ConvertImageOptions,
        ExtractPdfOptions, JobOptions, ResizeImageOptions, TargetFormat,
    },
};
pub use validation::ValidationPolicy;
