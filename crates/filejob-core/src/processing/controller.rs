//! Per-kind composition of validation, submission, polling and retrieval

use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use crate::collection::OrderedCollection;
use crate::config::FilejobConfig;
use crate::dimensions::DimensionSolver;
use crate::error::{Result, RetrievalError, ValidationError};
use crate::providers::{JobService, ResultSink};
use crate::types::file::SelectedFile;
use crate::types::job::{Job, JobKind, JobSnapshot};
use crate::types::options::{JobOptions, ResizeImageOptions};
use crate::validation::ValidationPolicy;

use super::poller::{PollEvent, ProgressPoller};
use super::retriever::ResultRetriever;
use super::submitter::JobSubmitter;

/// Drives one job at a time for one job kind.
///
/// The job moves Idle → Validated → Submitting → Polling and ends Completed
/// or Failed. [`reset`](Self::reset) stops polling and discards everything.
pub struct JobController {
    kind: JobKind,
    policy: ValidationPolicy,
    submitter: JobSubmitter,
    retriever: ResultRetriever,
    poller: ProgressPoller,
    files: OrderedCollection,
    dimensions: Option<DimensionSolver>,
    active: Option<Arc<Mutex<Job>>>,
    validation_error: Option<ValidationError>,
    updates: Arc<watch::Sender<Option<JobSnapshot>>>,
}

impl JobController {
    pub fn new(
        kind: JobKind,
        service: Arc<dyn JobService>,
        sink: Arc<dyn ResultSink>,
        config: &FilejobConfig,
    ) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            kind,
            policy: ValidationPolicy::from_limits(kind, &config.limits),
            submitter: JobSubmitter::new(Arc::clone(&service)),
            retriever: ResultRetriever::new(Arc::clone(&service), sink),
            poller: ProgressPoller::from_config(service, &config.polling),
            files: OrderedCollection::new(),
            dimensions: None,
            active: None,
            validation_error: None,
            updates: Arc::new(updates),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Accept files picked by the user.
    ///
    /// Single-file kinds replace the current selection; merge appends to it.
    /// A rejected batch leaves the selection unchanged.
    pub fn select(&mut self, files: Vec<SelectedFile>) -> std::result::Result<usize, ValidationError> {
        self.validation_error = None;
        let outcome = if self.kind.is_multi_file() {
            self.files.append(files, &self.policy)
        } else {
            self.replace_selection(files)
        };
        if let Err(e) = &outcome {
            tracing::warn!("Rejected selection for {}: {}", self.kind, e);
            self.validation_error = Some(e.clone());
        }
        outcome
    }

    fn replace_selection(&mut self, files: Vec<SelectedFile>) -> std::result::Result<usize, ValidationError> {
        if files.len() > 1 {
            return Err(ValidationError::TooManyFiles { kind: self.kind });
        }
        let file = files.into_iter().next().ok_or(ValidationError::NoFile)?;
        let file = self.policy.admit(file)?;

        self.dimensions = match self.kind {
            JobKind::ResizeImage => file.dimensions().map(DimensionSolver::from_source),
            _ => None,
        };
        self.files.replace_with(file);
        Ok(1)
    }

    pub fn files(&self) -> &OrderedCollection {
        &self.files
    }

    /// Reorder or remove selected files
    pub fn files_mut(&mut self) -> &mut OrderedCollection {
        &mut self.files
    }

    pub fn dimensions(&self) -> Option<&DimensionSolver> {
        self.dimensions.as_ref()
    }

    pub fn dimensions_mut(&mut self) -> Option<&mut DimensionSolver> {
        self.dimensions.as_mut()
    }

    /// Resize options from the current dimension fields
    pub fn resize_options(&self) -> std::result::Result<ResizeImageOptions, ValidationError> {
        self.dimensions
            .as_ref()
            .ok_or(ValidationError::NoFile)?
            .to_options()
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    /// Validate, submit and start polling.
    ///
    /// A validation failure is kept as
    /// [`validation_error`](Self::validation_error) and leaves any existing
    /// job untouched. A submission failure leaves a Failed job. Once the
    /// inputs pass, any job still active is cancelled before the new one starts.
    pub async fn run(&mut self, inputs: Vec<SelectedFile>, options: JobOptions) -> Result<JobSnapshot> {
        self.validation_error = None;

        if let Err(e) = self.policy.validate_submission(&inputs, &options) {
            tracing::warn!("{} job not submitted: {}", self.kind, e);
            self.validation_error = Some(e.clone());
            return Err(e.into());
        }
        self.discard_active();

        let mut job = Job::new(self.kind, inputs.clone(), options.clone());
        job.mark_validated();
        job.mark_submitting();
        let job = Arc::new(Mutex::new(job));
        self.active = Some(Arc::clone(&job));
        self.publish(&job);

        let job_id = match self.submitter.submit(self.kind, &inputs, &options).await {
            Ok(id) => id,
            Err(e) => {
                job.lock().fail(e.to_string());
                self.publish(&job);
                return Err(e.into());
            }
        };

        job.lock().start_polling(job_id.clone());
        self.publish(&job);

        let kind = self.kind;
        let target = Arc::clone(&job);
        let updates = Arc::clone(&self.updates);
        self.poller.arm(job_id, move |event| {
            let mut job = target.lock();
            match event {
                PollEvent::Progress(progress) => {
                    job.record_progress(progress);
                }
                PollEvent::Done(result) => {
                    tracing::info!("{} job finished: {}", kind, result);
                    job.complete(result);
                }
                PollEvent::Failed(e) => {
                    tracing::error!("{} job failed: {}", kind, e);
                    job.fail(e.to_string());
                }
            }
            updates.send_replace(Some(job.snapshot()));
        });

        let snapshot = job.lock().snapshot();
        Ok(snapshot)
    }

    /// Run with the current selection
    pub async fn run_selected(&mut self, options: JobOptions) -> Result<JobSnapshot> {
        let inputs = self.files.to_vec();
        self.run(inputs, options).await
    }

    /// Current job state, if a job exists
    pub fn snapshot(&self) -> Option<JobSnapshot> {
        self.active.as_ref().map(|job| job.lock().snapshot())
    }

    /// Receive every published snapshot. `None` means no job.
    pub fn subscribe(&self) -> watch::Receiver<Option<JobSnapshot>> {
        self.updates.subscribe()
    }

    /// Wait until the current job is Completed or Failed. Returns `None`
    /// immediately when there is no job.
    pub async fn wait_for_terminal(&self) -> Option<JobSnapshot> {
        let mut rx = self.subscribe();
        let finished = match rx
            .wait_for(|snapshot| snapshot.as_ref().map_or(true, JobSnapshot::is_terminal))
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => None,
        };
        finished
    }

    /// Fetch the finished job's result bytes
    pub async fn retrieve(&self) -> std::result::Result<Bytes, RetrievalError> {
        let result = self
            .snapshot()
            .and_then(|s| s.result)
            .ok_or(RetrievalError::NoResult)?;
        self.retriever.retrieve(&result).await
    }

    /// Fetch the finished job's result and save it. Returns where it was saved.
    pub async fn download(&self) -> std::result::Result<String, RetrievalError> {
        let job = self
            .active
            .as_ref()
            .map(|job| job.lock().clone())
            .ok_or(RetrievalError::NoResult)?;
        self.retriever.download(&job).await
    }

    /// Stop polling and return to an empty, idle controller
    pub fn reset(&mut self) {
        self.discard_active();
        self.files.clear();
        self.dimensions = None;
        self.validation_error = None;
        tracing::info!("{} controller reset", self.kind);
    }

    fn discard_active(&mut self) {
        self.poller.cancel();
        if self.active.take().is_some() {
            self.updates.send_replace(None);
        }
    }

    fn publish(&self, job: &Mutex<Job>) {
        let snapshot = job.lock().snapshot();
        self.updates.send_replace(Some(snapshot));
    }
}
