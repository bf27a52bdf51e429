//! Core types for jobs, selected files, and operation options

pub mod file;
pub mod job;
pub mod options;

pub use file::{FileId, ImageDimensions, SelectedFile};
pub use job::{Job, JobId, JobKind, JobSnapshot, JobStatus, MediaFamily, ResultRef};
pub use options::{
    CompressImageOptions, CompressPdfOptions, CompressionLevel, ConvertImageOptions,
    ExtractPdfOptions, JobOptions, ResizeImageOptions, TargetFormat,
};
