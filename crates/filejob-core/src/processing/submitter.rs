//! Job submission

use std::sync::Arc;

use crate::error::SubmissionError;
use crate::providers::{JobService, SubmitRequest};
use crate::types::file::SelectedFile;
use crate::types::job::{JobId, JobKind};
use crate::types::options::JobOptions;

/// Exchanges validated input for a remote job id
pub struct JobSubmitter {
    service: Arc<dyn JobService>,
}

impl JobSubmitter {
    pub fn new(service: Arc<dyn JobService>) -> Self {
        Self { service }
    }

    /// Send one submission request. Failures are returned, never retried.
    pub async fn submit(
        &self,
        kind: JobKind,
        inputs: &[SelectedFile],
        options: &JobOptions,
    ) -> Result<JobId, SubmissionError> {
        let request = SubmitRequest::build(kind, inputs, options);
        tracing::info!(
            "Submitting {} job with {} file(s) to {}",
            kind,
            inputs.len(),
            self.service.name()
        );

        match self.service.submit(request).await {
            Ok(id) => {
                tracing::info!("{} job accepted: {}", kind, id);
                Ok(id)
            }
            Err(e) => {
                tracing::error!("{} submission failed: {}", kind, e);
                Err(e)
            }
        }
    }
}
