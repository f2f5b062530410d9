/// Boxed error returned by user-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A configuration value was rejected at construction time.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        /// Name of the option as it appears in the configuration surface.
        option: &'static str,
        /// Human-readable description of the violated constraint.
        reason: String,
    },
    /// Options document could not be parsed.
    #[error("decode error: {0}")]
    Decode(String),
    /// Request could not be built (e.g. malformed method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// A configured hook returned an error.
    #[error("{hook} hook failed: {source}")]
    Hook {
        /// Which hook failed (`on_retry` or `on_max_retries_exceeded`).
        hook: &'static str,
        /// Error returned by the hook, passed through unchanged.
        #[source]
        source: BoxError,
    },
}

impl MonitorError {
    pub(crate) fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }
}
