//! Progress polling for a submitted job
//!
//! One poller owns at most one background task. Arming a poller cancels the
//! previous task first, and cancelling is idempotent. Every state change made
//! by the task is checked against the arm generation under the same lock that
//! `cancel()` takes, so once `cancel()` returns no further events reach the
//! callback.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::PollingConfig;
use crate::error::PollingError;
use crate::providers::{JobService, ProgressReport};
use crate::types::job::{JobId, ResultRef};

/// When the next progress request is issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollSchedule {
    /// Tick on a fixed period regardless of outstanding requests. A slow
    /// response may overlap the next tick and arrive out of order.
    #[default]
    FixedInterval,
    /// Wait one period after the previous response settles
    AfterSettle,
}

/// Observable poller state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Armed(JobId),
    Polling(JobId),
    Done(ResultRef),
    Failed(String),
}

impl PollerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollerState::Done(_) | PollerState::Failed(_))
    }
}

/// Delivered to the poller's owner after each applied response
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// Monotonic progress, 0-99
    Progress(u8),
    Done(ResultRef),
    Failed(PollingError),
}

impl PollEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollEvent::Progress(_))
    }
}

/// Folds progress responses into events.
///
/// Progress only moves forward, and nothing is emitted after the first
/// terminal event.
#[derive(Debug, Default)]
pub(crate) struct ProgressTracker {
    progress: u8,
    finished: bool,
}

impl ProgressTracker {
    pub(crate) fn apply(
        &mut self,
        response: Result<ProgressReport, PollingError>,
    ) -> Option<PollEvent> {
        if self.finished {
            return None;
        }
        match response {
            Ok(report) if report.is_finished() => {
                self.finished = true;
                self.progress = 100;
                Some(match report.result_url {
                    Some(url) if !url.is_empty() => PollEvent::Done(ResultRef::new(url)),
                    _ => PollEvent::Failed(PollingError::MissingResult),
                })
            }
            Ok(report) => {
                self.progress = self.progress.max(report.percent());
                Some(PollEvent::Progress(self.progress))
            }
            Err(e) => {
                self.finished = true;
                Some(PollEvent::Failed(e))
            }
        }
    }
}

struct Shared {
    state: PollerState,
    generation: u64,
}

/// The task's handle on shared state, valid for one arm generation
struct Slot {
    shared: Arc<Mutex<Shared>>,
    generation: u64,
}

impl Slot {
    fn mark_polling(&self, job_id: &JobId) -> bool {
        let mut shared = self.shared.lock();
        if shared.generation != self.generation {
            return false;
        }
        if matches!(shared.state, PollerState::Armed(_)) {
            shared.state = PollerState::Polling(job_id.clone());
        }
        true
    }

    /// Record the event and hand it to the owner. False once stale.
    fn deliver<F: FnMut(PollEvent)>(&self, event: PollEvent, on_event: &mut F) -> bool {
        let mut shared = self.shared.lock();
        if shared.generation != self.generation {
            return false;
        }
        match &event {
            PollEvent::Done(result) => shared.state = PollerState::Done(result.clone()),
            PollEvent::Failed(e) => shared.state = PollerState::Failed(e.to_string()),
            PollEvent::Progress(_) => {}
        }
        on_event(event);
        true
    }
}

/// Periodic progress checker for one job at a time
pub struct ProgressPoller {
    service: Arc<dyn JobService>,
    period: Duration,
    schedule: PollSchedule,
    shared: Arc<Mutex<Shared>>,
    task: Option<JoinHandle<()>>,
}

impl ProgressPoller {
    pub fn new(service: Arc<dyn JobService>, period: Duration, schedule: PollSchedule) -> Self {
        Self {
            service,
            period,
            schedule,
            shared: Arc::new(Mutex::new(Shared {
                state: PollerState::Idle,
                generation: 0,
            })),
            task: None,
        }
    }

    pub fn from_config(service: Arc<dyn JobService>, config: &PollingConfig) -> Self {
        Self::new(service, config.interval(), config.schedule)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn schedule(&self) -> PollSchedule {
        self.schedule
    }

    pub fn state(&self) -> PollerState {
        self.shared.lock().state.clone()
    }

    /// A polling task exists and has not finished
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start polling `job_id`. The first request goes out one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, job_id: JobId, on_event: F)
    where
        F: FnMut(PollEvent) + Send + 'static,
    {
        self.cancel();

        let generation = {
            let mut shared = self.shared.lock();
            shared.state = PollerState::Armed(job_id.clone());
            shared.generation
        };
        let slot = Slot {
            shared: Arc::clone(&self.shared),
            generation,
        };
        let service = Arc::clone(&self.service);

        tracing::debug!(
            "Polling job {} every {:?} ({:?})",
            job_id,
            self.period,
            self.schedule
        );

        let task = match self.schedule {
            PollSchedule::FixedInterval => tokio::spawn(poll_fixed_interval(
                service,
                job_id,
                self.period,
                slot,
                on_event,
            )),
            PollSchedule::AfterSettle => tokio::spawn(poll_after_settle(
                service,
                job_id,
                self.period,
                slot,
                on_event,
            )),
        };
        self.task = Some(task);
    }

    /// Stop polling. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Poller task cancelled");
        }
        let mut shared = self.shared.lock();
        shared.generation += 1;
        if !shared.state.is_terminal() {
            shared.state = PollerState::Idle;
        }
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn poll_fixed_interval<F>(
    service: Arc<dyn JobService>,
    job_id: JobId,
    period: Duration,
    slot: Slot,
    mut on_event: F,
) where
    F: FnMut(PollEvent) + Send + 'static,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: JoinSet<Result<ProgressReport, PollingError>> = JoinSet::new();
    let mut tracker = ProgressTracker::default();

    // Returning drops `in_flight`, which aborts any outstanding request.
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !slot.mark_polling(&job_id) {
                    return;
                }
                let service = Arc::clone(&service);
                let id = job_id.clone();
                in_flight.spawn(async move { service.progress(&id).await });
                tracing::debug!("Progress check for {} ({} in flight)", job_id, in_flight.len());
            }
            Some(joined) = in_flight.join_next() => {
                let response = joined.unwrap_or_else(|e| {
                    Err(PollingError::Transport(format!("progress request aborted: {}", e)))
                });
                let Some(event) = tracker.apply(response) else {
                    continue;
                };
                let terminal = event.is_terminal();
                if !slot.deliver(event, &mut on_event) || terminal {
                    return;
                }
            }
        }
    }
}

async fn poll_after_settle<F>(
    service: Arc<dyn JobService>,
    job_id: JobId,
    period: Duration,
    slot: Slot,
    mut on_event: F,
) where
    F: FnMut(PollEvent) + Send + 'static,
{
    let mut tracker = ProgressTracker::default();
    let mut next = Instant::now() + period;

    loop {
        tokio::time::sleep_until(next).await;
        if !slot.mark_polling(&job_id) {
            return;
        }
        tracing::debug!("Progress check for {}", job_id);
        let response = service.progress(&job_id).await;
        next = Instant::now() + period;

        if let Some(event) = tracker.apply(response) {
            let terminal = event.is_terminal();
            if !slot.deliver(event, &mut on_event) || terminal {
                return;
            }
        }
    }
}
