//! Shared fixtures for unit tests

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{PollingError, Result, RetrievalError, SubmissionError};
use crate::providers::{JobService, ProgressReport, SubmitRequest};
use crate::types::file::SelectedFile;
use crate::types::job::{JobId, ResultRef};

/// A small PDF-typed file
pub fn pdf_file(name: &str) -> SelectedFile {
    SelectedFile::new(name, b"%PDF-1.4\n%%EOF\n".to_vec(), None)
}

/// A zero-filled file of `len` bytes, typed by its name
pub fn sized_file(name: &str, len: usize) -> SelectedFile {
    SelectedFile::new(name, vec![0u8; len], None)
}

/// A real PNG with the given dimensions
pub fn png_file(name: &str, width: u32, height: u32) -> SelectedFile {
    let mut buf = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    SelectedFile::new(name, buf.into_inner(), None)
}

/// A small real JPEG padded with trailing bytes to `len`
pub fn jpeg_file(name: &str, len: usize) -> SelectedFile {
    let mut buf = Cursor::new(Vec::new());
    image::RgbImage::new(64, 48)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    let mut data = buf.into_inner();
    if data.len() < len {
        data.resize(len, 0);
    }
    SelectedFile::new(name, data, None)
}

type ScriptedProgress = (Duration, std::result::Result<ProgressReport, PollingError>);

/// In-memory job service driven by a script.
///
/// Each progress call takes the next scripted response and waits its delay
/// before answering. Once the script runs out, progress calls never resolve.
pub struct ScriptedService {
    submit: Mutex<std::result::Result<JobId, SubmissionError>>,
    progress: Mutex<VecDeque<ScriptedProgress>>,
    fetch: Mutex<std::result::Result<Bytes, RetrievalError>>,
    submitted: Mutex<Vec<SubmitRequest>>,
    progress_calls: Mutex<Vec<Instant>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            submit: Mutex::new(Ok(JobId::new("task-1"))),
            progress: Mutex::new(VecDeque::new()),
            fetch: Mutex::new(Err(RetrievalError::Status { status: 404 })),
            submitted: Mutex::new(Vec::new()),
            progress_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_submit(self, result: std::result::Result<JobId, SubmissionError>) -> Self {
        *self.submit.lock() = result;
        self
    }

    /// Responses as `(delay in ms, result)`
    pub fn with_progress(
        self,
        script: Vec<(u64, std::result::Result<ProgressReport, PollingError>)>,
    ) -> Self {
        *self.progress.lock() = script
            .into_iter()
            .map(|(ms, result)| (Duration::from_millis(ms), result))
            .collect();
        self
    }

    pub fn with_fetch(self, result: std::result::Result<Bytes, RetrievalError>) -> Self {
        self.set_fetch(result);
        self
    }

    pub fn set_fetch(&self, result: std::result::Result<Bytes, RetrievalError>) {
        *self.fetch.lock() = result;
    }

    pub fn submitted(&self) -> Vec<SubmitRequest> {
        self.submitted.lock().clone()
    }

    pub fn progress_calls(&self) -> usize {
        self.progress_calls.lock().len()
    }

    pub fn progress_call_times(&self) -> Vec<Instant> {
        self.progress_calls.lock().clone()
    }
}

#[async_trait]
impl JobService for ScriptedService {
    async fn submit(&self, request: SubmitRequest) -> std::result::Result<JobId, SubmissionError> {
        self.submitted.lock().push(request);
        self.submit.lock().clone()
    }

    async fn progress(&self, _job_id: &JobId) -> std::result::Result<ProgressReport, PollingError> {
        self.progress_calls.lock().push(Instant::now());
        let next = self.progress.lock().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => std::future::pending().await,
        }
    }

    async fn fetch(&self, _result: &ResultRef) -> std::result::Result<Bytes, RetrievalError> {
        self.fetch.lock().clone()
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
