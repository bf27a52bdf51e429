//! Job processing pipeline
//!
//! Submits validated jobs, polls their progress, fetches results, and ties the
//! stages together per job kind.

pub mod controller;
pub mod poller;
pub mod retriever;
pub mod submitter;

pub use controller::JobController;
pub use poller::{PollEvent, PollSchedule, PollerState, ProgressPoller};
pub use retriever::ResultRetriever;
pub use submitter::JobSubmitter;
