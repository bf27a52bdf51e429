//! Provider abstractions for the remote job service and result storage
//!
//! The engine only talks to these traits, so the HTTP service can be replaced
//! by an in-memory one in tests.

pub mod http;
pub mod service;
pub mod sink;

pub use http::HttpJobService;
pub use service::{FormField, JobService, ProgressReport, SubmitRequest};
pub use sink::{DirectorySink, MemorySink, ResultSink};
