//! Reporting of coordinator decisions: log lines and user hooks.

use std::sync::Arc;

use crate::{
    error::BoxError, Decision, MonitorError, MonitorOptions, RequestDescriptor,
    ResponseDescriptor, Result,
};

/// Return type of a hook.
pub type HookResult = std::result::Result<(), BoxError>;

/// Callback receiving the request, its response and an attempt count.
///
/// For `on_retry` the count is the 1-based retry number; for
/// `on_max_retries_exceeded` it is the configured `max_retries`.
pub type Hook =
    Arc<dyn Fn(&RequestDescriptor, &ResponseDescriptor, u32) -> HookResult + Send + Sync>;

/// Logs `decision` (when enabled) and runs the matching hook.
///
/// `Proceed` does nothing. A failing hook is returned as
/// [`MonitorError::Hook`] with the original error as its source.
pub fn dispatch(
    options: &MonitorOptions,
    request: &RequestDescriptor,
    response: &ResponseDescriptor,
    decision: Decision,
) -> Result<()> {
    match decision {
        Decision::Proceed => Ok(()),
        Decision::Retry { attempt, .. } => {
            if options.log_retries {
                log_retry(options, request, response, attempt);
            }
            run_hook("on_retry", options.on_retry.as_ref(), request, response, attempt)
        }
        Decision::GiveUp { total_attempts } => {
            if options.log_retries {
                log_exhausted(request, response, total_attempts);
            }
            run_hook(
                "on_max_retries_exceeded",
                options.on_max_retries_exceeded.as_ref(),
                request,
                response,
                total_attempts,
            )
        }
    }
}

fn run_hook(
    name: &'static str,
    hook: Option<&Hook>,
    request: &RequestDescriptor,
    response: &ResponseDescriptor,
    count: u32,
) -> Result<()> {
    let Some(hook) = hook else {
        return Ok(());
    };
    hook(request, response, count).map_err(|source| MonitorError::Hook { hook: name, source })
}

#[allow(unused_variables)]
fn log_retry(
    options: &MonitorOptions,
    request: &RequestDescriptor,
    response: &ResponseDescriptor,
    attempt: u32,
) {
    #[cfg(feature = "tracing")]
    {
        tracing::warn!(
            "Network request failed with status {}. Retrying ({}/{})...",
            response.status,
            attempt,
            options.max_retries
        );
        tracing::warn!(
            target: "network_retry",
            method = %request.method,
            url = %request.url,
            status = response.status,
            retry_count = attempt,
            max_retries = options.max_retries,
            "{} {} - Status: {} - Retry: {}/{}",
            request.method,
            request.url,
            response.status,
            attempt,
            options.max_retries
        );
    }
}

#[allow(unused_variables)]
fn log_exhausted(request: &RequestDescriptor, response: &ResponseDescriptor, max_retries: u32) {
    #[cfg(feature = "tracing")]
    tracing::error!(
        method = %request.method,
        url = %request.url,
        "Maximum retries ({}) exceeded for request. Status: {}",
        max_retries,
        response.status
    );
}
