//! HTTP implementation of the job service

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::config::ApiConfig;
use crate::error::{Error, PollingError, Result, RetrievalError, SubmissionError};
use crate::types::job::{JobId, ResultRef};

use super::service::{FormField, JobService, ProgressReport, SubmitRequest, SubmitResponse};

/// Job service reached over HTTP.
///
/// `POST {base}/<kind endpoint>` with a multipart body creates a job,
/// `GET {base}/progress/{id}` reports progress, and the result location is
/// downloaded with a plain `GET`.
pub struct HttpJobService {
    client: Client,
    base_url: String,
}

impl HttpJobService {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs are used as-is; anything else is joined to the base
    pub fn resolve(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            format!("{}/{}", self.base_url, location.trim_start_matches('/'))
        }
    }

    fn build_form(fields: Vec<FormField>) -> std::result::Result<Form, SubmissionError> {
        let mut form = Form::new();
        for field in fields {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File {
                    name,
                    file_name,
                    mime,
                    data,
                } => {
                    let part = Part::bytes(data.to_vec())
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| {
                            SubmissionError::Transport(format!("invalid content type '{}': {}", mime, e))
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl JobService for HttpJobService {
    async fn submit(&self, request: SubmitRequest) -> std::result::Result<JobId, SubmissionError> {
        let url = format!("{}/{}", self.base_url, request.kind.endpoint());
        let form = Self::build_form(request.fields)?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| SubmissionError::MalformedResponse(e.to_string()))?;

        if body.task_id.is_empty() {
            return Err(SubmissionError::MalformedResponse("empty task_id".to_string()));
        }

        tracing::debug!("POST {} accepted as task {}", url, body.task_id);
        Ok(JobId::new(body.task_id))
    }

    async fn progress(&self, job_id: &JobId) -> std::result::Result<ProgressReport, PollingError> {
        let url = format!("{}/progress/{}", self.base_url, job_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PollingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PollingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ProgressReport>()
            .await
            .map_err(|e| PollingError::Decode(e.to_string()))
    }

    async fn fetch(&self, result: &ResultRef) -> std::result::Result<Bytes, RetrievalError> {
        let url = self.resolve(result.as_str());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RetrievalError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| RetrievalError::Transport(e.to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => Ok(!response.status().is_server_error()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
