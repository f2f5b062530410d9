use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{Decision, MonitorOptions, RequestDescriptor, RequestKey, ResponseDescriptor};

/// Per-test-case retry bookkeeping.
///
/// Holds one counter per [`RequestKey`]. A key is present once its request
/// has been observed, and its counter is the number of retries granted so
/// far, never more than `max_retries`. Counters only move forward; the only
/// way back to zero is [`RetryCoordinator::reset`].
///
/// The coordinator performs no I/O and never sleeps. Waiting, re-issuing
/// requests and running hooks is left to the interception layer.
pub struct RetryCoordinator {
    options: MonitorOptions,
    counters: Mutex<HashMap<RequestKey, u32>>,
}

impl std::fmt::Debug for RetryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryCoordinator")
            .field("options", &self.options)
            .field("tracked_requests", &self.tracked_requests())
            .finish()
    }
}

impl Default for RetryCoordinator {
    fn default() -> Self {
        Self::new(MonitorOptions::default())
    }
}

impl RetryCoordinator {
    pub fn new(options: MonitorOptions) -> Self {
        Self {
            options,
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Forgets every counter. Call before each test case.
    pub fn reset(&self) {
        self.counters().clear();
    }

    /// Starts tracking `request` with a zero counter if it is not tracked yet.
    pub fn on_request_observed(&self, request: &RequestDescriptor) {
        self.counters().entry(request.key()).or_insert(0);
    }

    /// Decides what to do with `response` and records a granted retry.
    ///
    /// Only the status code is consulted. When a retry is granted the
    /// request's counter is incremented under the same lock that read it,
    /// so concurrent callers never hand out the same attempt twice.
    pub fn decide(&self, request: &RequestDescriptor, response: &ResponseDescriptor) -> Decision {
        if !self.options.is_retryable_status(response.status) {
            return Decision::Proceed;
        }

        let max_retries = self.options.max_retries;
        let mut counters = self.counters();
        // Unobserved requests start at zero.
        let count = counters.entry(request.key()).or_insert(0);

        if *count < max_retries {
            *count += 1;
            Decision::Retry {
                attempt: *count,
                delay: self.options.retry_delay,
            }
        } else {
            Decision::GiveUp {
                total_attempts: max_retries,
            }
        }
    }

    /// Retries granted so far for `request`, or `None` if it was never seen
    /// since the last reset.
    pub fn retry_count(&self, request: &RequestDescriptor) -> Option<u32> {
        self.counters().get(&request.key()).copied()
    }

    /// Number of distinct request keys currently tracked.
    pub fn tracked_requests(&self) -> usize {
        self.counters().len()
    }

    // A panic while holding the lock cannot leave a half-written counter.
    fn counters(&self) -> MutexGuard<'_, HashMap<RequestKey, u32>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
