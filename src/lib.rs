//! `network-monitor` decides when an intercepted HTTP request should be
//! retried during an automated test run.
//!
//! The policy lives in [`RetryCoordinator`], which counts retries per
//! method + URL and answers each observed response with a [`Decision`]:
//! - [`RetryCoordinator::reset`] before every test case
//! - [`RetryCoordinator::on_request_observed`] when a request goes out
//! - [`RetryCoordinator::decide`] when its response comes back
//!
//! [`hooks::dispatch`] turns a decision into log lines and hook calls, and
//! [`MonitoredClient`] is a ready-made interception layer over `reqwest`
//! that re-sends the request whenever a retry is granted.

mod client;
mod coordinator;
mod decision;
mod delay;
mod error;
pub mod hooks;
mod options;
mod types;

pub use client::{MonitoredClient, MonitoredResponse, RequestBody};
pub use coordinator::RetryCoordinator;
pub use decision::Decision;
pub use error::{BoxError, MonitorError};
pub use options::{
    MonitorOptions, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_RETRY_STATUS,
};
pub use types::{RequestDescriptor, RequestKey, ResponseDescriptor};

pub type Result<T> = std::result::Result<T, MonitorError>;
