//! Remote job service trait and its wire types

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::{PollingError, Result, RetrievalError, SubmissionError};
use crate::types::file::SelectedFile;
use crate::types::job::{JobId, JobKind, ResultRef};
use crate::types::options::JobOptions;

/// Trait for the remote processing service
///
/// Implementations:
/// - `HttpJobService`: multipart/JSON over HTTP
#[async_trait]
pub trait JobService: Send + Sync {
    /// Create a job. Exactly one request; no retries.
    async fn submit(&self, request: SubmitRequest) -> std::result::Result<JobId, SubmissionError>;

    /// Ask for the current progress of a job
    async fn progress(&self, job_id: &JobId) -> std::result::Result<ProgressReport, PollingError>;

    /// Download a finished job's output
    async fn fetch(&self, result: &ResultRef) -> std::result::Result<Bytes, RetrievalError>;

    /// Check if the service is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// One multipart field
#[derive(Debug, Clone)]
pub enum FormField {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        file_name: String,
        mime: String,
        data: Bytes,
    },
}

impl FormField {
    pub fn name(&self) -> &'static str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => *name,
        }
    }
}

/// Provider-neutral submission payload
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub kind: JobKind,
    pub fields: Vec<FormField>,
}

impl SubmitRequest {
    /// Build the field list: the file part(s) first, in input order, then the
    /// option fields. Single-file kinds send `upload`; merge repeats `files`.
    pub fn build(kind: JobKind, inputs: &[SelectedFile], options: &JobOptions) -> Self {
        let file_field = if kind.is_multi_file() { "files" } else { "upload" };

        let mut fields: Vec<FormField> = inputs
            .iter()
            .map(|file| FormField::File {
                name: file_field,
                file_name: file.name().to_string(),
                mime: file.mime().to_string(),
                data: file.data(),
            })
            .collect();

        fields.extend(
            options
                .form_fields()
                .into_iter()
                .map(|(name, value)| FormField::Text { name, value }),
        );

        Self { kind, fields }
    }

    /// File names of the file parts, in order
    pub fn file_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter_map(|f| match f {
                FormField::File { file_name, .. } => Some(file_name.as_str()),
                FormField::Text { .. } => None,
            })
            .collect()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            FormField::Text { name: n, value } if *n == name => Some(value.as_str()),
            _ => None,
        })
    }
}

/// Submission response body
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(alias = "taskId")]
    pub task_id: String,
}

/// Progress response body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressReport {
    pub progress: f64,
    #[serde(default)]
    pub result_url: Option<String>,
}

impl ProgressReport {
    pub fn new(progress: f64, result_url: Option<&str>) -> Self {
        Self {
            progress,
            result_url: result_url.map(str::to_string),
        }
    }

    /// Progress as a whole percentage in [0, 100]
    pub fn percent(&self) -> u8 {
        if self.progress.is_nan() {
            return 0;
        }
        self.progress.clamp(0.0, 100.0).floor() as u8
    }

    /// The remote side considers the job finished
    pub fn is_finished(&self) -> bool {
        self.progress >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::pdf_file;
    use crate::types::options::{CompressPdfOptions, CompressionLevel};

    #[test]
    fn test_merge_repeats_files_in_order() {
        let inputs = vec![pdf_file("b.pdf"), pdf_file("a.pdf"), pdf_file("c.pdf")];
        let request = SubmitRequest::build(JobKind::MergePdf, &inputs, &JobOptions::MergePdf);
        assert!(request.fields.iter().all(|f| f.name() == "files"));
        assert_eq!(request.file_names(), vec!["b.pdf", "a.pdf", "c.pdf"]);
    }

    #[test]
    fn test_single_file_uses_upload_field() {
        let options = JobOptions::CompressPdf(CompressPdfOptions {
            compression_level: CompressionLevel::Low,
        });
        let request = SubmitRequest::build(JobKind::CompressPdf, &[pdf_file("r.pdf")], &options);
        assert_eq!(request.fields[0].name(), "upload");
        assert_eq!(request.text("compression_level"), Some("low"));
        assert_eq!(request.text("quality"), None);
    }

    #[test]
    fn test_progress_report_parsing() {
        let report: ProgressReport = serde_json::from_str(r#"{"progress": 42.7}"#).unwrap();
        assert_eq!(report.percent(), 42);
        assert!(!report.is_finished());

        let done: ProgressReport =
            serde_json::from_str(r#"{"progress": 100, "result_url": "/results/x.pdf"}"#).unwrap();
        assert!(done.is_finished());
        assert_eq!(done.result_url.as_deref(), Some("/results/x.pdf"));

        assert_eq!(ProgressReport::new(-5.0, None).percent(), 0);
        assert_eq!(ProgressReport::new(180.0, None).percent(), 100);
    }

    #[test]
    fn test_submit_response_accepts_camel_case() {
        let body: SubmitResponse = serde_json::from_str(r#"{"taskId": "abc"}"#).unwrap();
        assert_eq!(body.task_id, "abc");
    }
}
