//! Result download

use bytes::Bytes;
use std::sync::Arc;

use crate::error::RetrievalError;
use crate::naming::derive_filename;
use crate::providers::{JobService, ResultSink};
use crate::types::job::{Job, JobStatus, ResultRef};

/// Fetches finished results and hands them to a sink.
///
/// Failures leave the job untouched; calling again retries.
pub struct ResultRetriever {
    service: Arc<dyn JobService>,
    sink: Arc<dyn ResultSink>,
}

impl ResultRetriever {
    pub fn new(service: Arc<dyn JobService>, sink: Arc<dyn ResultSink>) -> Self {
        Self { service, sink }
    }

    pub async fn retrieve(&self, result: &ResultRef) -> Result<Bytes, RetrievalError> {
        let data = self.service.fetch(result).await?;
        tracing::debug!("Fetched {} bytes from {}", data.len(), result);
        Ok(data)
    }

    pub async fn save_as(&self, data: Bytes, filename: &str) -> Result<String, RetrievalError> {
        self.sink.save(data, filename).await
    }

    /// Fetch a completed job's result and save it under its derived name
    pub async fn download(&self, job: &Job) -> Result<String, RetrievalError> {
        let result = match (job.status(), job.result()) {
            (JobStatus::Completed, Some(result)) => result,
            _ => return Err(RetrievalError::NoResult),
        };
        let filename = derive_filename(job.options(), job.inputs());

        let data = self.retrieve(result).await.map_err(|e| {
            tracing::warn!("Download of {} failed: {}", result, e);
            e
        })?;
        self.save_as(data, &filename).await
    }
}
