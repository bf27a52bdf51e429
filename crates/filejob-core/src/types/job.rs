//! Job record and its lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::file::SelectedFile;
use super::options::JobOptions;

/// Remote operation performed by a job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    CompressImage,
    ConvertImage,
    ResizeImage,
    CompressPdf,
    ExtractPdf,
    MergePdf,
}

/// Kind of media a job operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFamily {
    Image,
    Pdf,
}

impl JobKind {
    pub const ALL: [JobKind; 6] = [
        JobKind::CompressImage,
        JobKind::ConvertImage,
        JobKind::ResizeImage,
        JobKind::CompressPdf,
        JobKind::ExtractPdf,
        JobKind::MergePdf,
    ];

    /// Path of the submission endpoint, relative to the service base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            JobKind::CompressImage => "image/compress",
            JobKind::ConvertImage => "image/convert",
            JobKind::ResizeImage => "image/resize",
            JobKind::CompressPdf => "pdf/compress",
            JobKind::ExtractPdf => "pdf/extract",
            JobKind::MergePdf => "pdf/merge",
        }
    }

    pub fn family(&self) -> MediaFamily {
        match self {
            JobKind::CompressImage | JobKind::ConvertImage | JobKind::ResizeImage => {
                MediaFamily::Image
            }
            JobKind::CompressPdf | JobKind::ExtractPdf | JobKind::MergePdf => MediaFamily::Pdf,
        }
    }

    /// Whether the job takes an ordered list of files instead of a single one
    pub fn is_multi_file(&self) -> bool {
        matches!(self, JobKind::MergePdf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::CompressImage => "compress-image",
            JobKind::ConvertImage => "convert-image",
            JobKind::ResizeImage => "resize-image",
            JobKind::CompressPdf => "compress-pdf",
            JobKind::ExtractPdf => "extract-pdf",
            JobKind::MergePdf => "merge-pdf",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown job kind: {}", s))
    }
}

/// Lifecycle status of a job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Idle,
    Validated,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed or Failed: no further transitions occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Opaque job identifier issued by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque locator for a finished job's output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRef(String);

impl ResultRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One user-initiated remote operation.
///
/// Transitions are guarded: the job only moves forward through
/// Idle → Validated → Submitting → Polling → {Completed | Failed}, terminal
/// states absorb every later update, and the id is bound exactly once.
#[derive(Debug, Clone)]
pub struct Job {
    id: Option<JobId>,
    kind: JobKind,
    inputs: Vec<SelectedFile>,
    options: JobOptions,
    status: JobStatus,
    progress: u8,
    result: Option<ResultRef>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(kind: JobKind, inputs: Vec<SelectedFile>, options: JobOptions) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            kind,
            inputs,
            options,
            status: JobStatus::Idle,
            progress: 0,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Option<&JobId> {
        self.id.as_ref()
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn inputs(&self) -> &[SelectedFile] {
        &self.inputs
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn result(&self) -> Option<&ResultRef> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn mark_validated(&mut self) -> bool {
        self.advance(JobStatus::Idle, JobStatus::Validated)
    }

    pub fn mark_submitting(&mut self) -> bool {
        self.advance(JobStatus::Validated, JobStatus::Submitting)
    }

    /// Bind the remote id and enter Polling
    pub fn start_polling(&mut self, id: JobId) -> bool {
        if self.status != JobStatus::Submitting || self.id.is_some() {
            return false;
        }
        self.id = Some(id);
        self.progress = 0;
        self.advance(JobStatus::Submitting, JobStatus::Polling)
    }

    /// Fold a progress reading in; the stored value never decreases.
    /// Returns the progress after the update.
    pub fn record_progress(&mut self, progress: u8) -> u8 {
        if self.status == JobStatus::Polling {
            self.progress = self.progress.max(progress.min(100));
            self.touch();
        }
        self.progress
    }

    pub fn complete(&mut self, result: ResultRef) -> bool {
        if self.status != JobStatus::Polling {
            return false;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.result = Some(result);
        self.touch();
        true
    }

    /// Fail from any non-terminal status
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.error = Some(message.into());
        self.touch();
        true
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            kind: self.kind,
            status: self.status,
            progress: self.progress,
            result: self.result.clone(),
            error: self.error.clone(),
            inputs: self.inputs.iter().map(|f| f.name().to_string()).collect(),
            options: self.options.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn advance(&mut self, from: JobStatus, to: JobStatus) -> bool {
        if self.status != from {
            tracing::warn!("Ignoring job transition {:?} -> {:?} from {:?}", from, to, self.status);
            return false;
        }
        self.status = to;
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Read-only view of a job, without file contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub id: Option<JobId>,
    pub kind: JobKind,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub inputs: Vec<String>,
    pub options: JobOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
