use std::time::Duration;

/// Outcome of [`RetryCoordinator::decide`](crate::RetryCoordinator::decide).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Status is not retryable; continue normally.
    Proceed,
    /// Re-issue the logical request after `delay`. `attempt` is 1-based.
    Retry { attempt: u32, delay: Duration },
    /// Retry budget for this request is spent.
    GiveUp { total_attempts: u32 },
}

impl Decision {
    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }

    pub fn is_give_up(&self) -> bool {
        matches!(self, Self::GiveUp { .. })
    }
}
