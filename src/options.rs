use std::{collections::BTreeSet, fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Deserializer};

use crate::{
    hooks::{Hook, HookResult},
    MonitorError, RequestDescriptor, ResponseDescriptor, Result,
};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RETRY_STATUS: u16 = 500;

/// Configures which responses are retried, how often and what is reported.
///
/// Built once per test scope and shared read-only afterwards.
#[derive(Clone)]
pub struct MonitorOptions {
    /// Retries granted per request key before giving up.
    pub max_retries: u32,
    /// Delay the interception layer waits before re-issuing a request.
    pub retry_delay: Duration,
    /// Status codes that make a response eligible for retry. Empty disables
    /// retrying altogether.
    pub status_codes_to_retry: BTreeSet<u16>,
    /// Emit log lines on retry and on exhaustion.
    pub log_retries: bool,
    /// Called with the 1-based attempt number before each retry.
    pub on_retry: Option<Hook>,
    /// Called with `max_retries` once the budget is spent.
    pub on_max_retries_exceeded: Option<Hook>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            status_codes_to_retry: BTreeSet::from([DEFAULT_RETRY_STATUS]),
            log_retries: true,
            on_retry: None,
            on_max_retries_exceeded: None,
        }
    }
}

impl fmt::Debug for MonitorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorOptions")
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("status_codes_to_retry", &self.status_codes_to_retry)
            .field("log_retries", &self.log_retries)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .field(
                "on_max_retries_exceeded",
                &self.on_max_retries_exceeded.as_ref().map(|_| "<hook>"),
            )
            .finish()
    }
}

impl MonitorOptions {
    /// Parses the recognized options from a JSON object.
    ///
    /// Accepts `maxRetries`, `retryDelay` (milliseconds), `statusCodesToRetry`
    /// and `logRetries`; missing keys take their defaults. Hooks cannot be
    /// expressed in JSON and are attached with [`Self::with_on_retry`] and
    /// [`Self::with_on_max_retries_exceeded`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw = serde_json::from_str::<RawOptions>(json)
            .map_err(|err| MonitorError::Decode(format!("invalid monitor options JSON: {err}")))?;
        Self::from_raw(raw)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Replaces the retry status set. Codes are checked by [`Self::validate`].
    pub fn with_status_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.status_codes_to_retry = codes.into_iter().collect();
        self
    }

    pub fn with_log_retries(mut self, log_retries: bool) -> Self {
        self.log_retries = log_retries;
        self
    }

    pub fn with_on_retry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestDescriptor, &ResponseDescriptor, u32) -> HookResult + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    pub fn with_on_max_retries_exceeded<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestDescriptor, &ResponseDescriptor, u32) -> HookResult + Send + Sync + 'static,
    {
        self.on_max_retries_exceeded = Some(Arc::new(hook));
        self
    }

    /// Checks that every retry status is an HTTP status code (100..=999).
    ///
    /// Options parsed by [`Self::from_json`] or serde are already validated;
    /// options assembled with the `with_*` builders should be checked here
    /// before use.
    pub fn validate(&self) -> Result<()> {
        for &code in &self.status_codes_to_retry {
            validate_status_code(code.into())?;
        }
        Ok(())
    }

    /// Returns `true` when `status` is in the configured retry set.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_codes_to_retry.contains(&status)
    }
}

impl<'de> Deserialize<'de> for MonitorOptions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawOptions::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

/// Wire shape of the options, signed so that negative values reach
/// validation instead of failing as a type mismatch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct RawOptions {
    max_retries: i64,
    retry_delay: i64,
    status_codes_to_retry: Vec<i64>,
    log_retries: bool,
}

impl Default for RawOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES.into(),
            retry_delay: DEFAULT_RETRY_DELAY_MS as i64,
            status_codes_to_retry: vec![DEFAULT_RETRY_STATUS.into()],
            log_retries: true,
        }
    }
}

impl MonitorOptions {
    fn from_raw(raw: RawOptions) -> Result<Self> {
        if raw.max_retries < 0 {
            return Err(MonitorError::invalid_option(
                "maxRetries",
                format!("must be non-negative, got {}", raw.max_retries),
            ));
        }
        let max_retries = u32::try_from(raw.max_retries).map_err(|_| {
            MonitorError::invalid_option(
                "maxRetries",
                format!("must not exceed {}, got {}", u32::MAX, raw.max_retries),
            )
        })?;

        if raw.retry_delay < 0 {
            return Err(MonitorError::invalid_option(
                "retryDelay",
                format!("must be non-negative, got {}", raw.retry_delay),
            ));
        }
        let retry_delay = Duration::from_millis(raw.retry_delay as u64);

        let status_codes_to_retry = raw
            .status_codes_to_retry
            .into_iter()
            .map(|code| {
                u16::try_from(code).map_err(|_| {
                    MonitorError::invalid_option(
                        "statusCodesToRetry",
                        format!("{code} is not an HTTP status code"),
                    )
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        let options = Self {
            max_retries,
            retry_delay,
            status_codes_to_retry,
            log_retries: raw.log_retries,
            on_retry: None,
            on_max_retries_exceeded: None,
        };
        options.validate()?;
        Ok(options)
    }
}

fn validate_status_code(code: i64) -> Result<u16> {
    match u16::try_from(code) {
        Ok(status @ 100..=999) => Ok(status),
        _ => Err(MonitorError::invalid_option(
            "statusCodesToRetry",
            format!("{code} is not an HTTP status code"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::MonitorOptions;
    use crate::MonitorError;

    #[test]
    fn defaults_match_documented_values() {
        let options = MonitorOptions::default();
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.retry_delay, Duration::from_millis(1_000));
        assert!(options.status_codes_to_retry.contains(&500));
        assert_eq!(options.status_codes_to_retry.len(), 1);
        assert!(options.log_retries);
        assert!(options.on_retry.is_none());
        assert!(options.on_max_retries_exceeded.is_none());
    }

    #[test]
    fn json_overrides_only_supplied_keys() {
        let options =
            MonitorOptions::from_json(r#"{"maxRetries": 5, "statusCodesToRetry": [502, 503]}"#)
                .expect("options must parse");
        assert_eq!(options.max_retries, 5);
        assert_eq!(options.retry_delay, Duration::from_millis(1_000));
        assert!(options.is_retryable_status(502));
        assert!(options.is_retryable_status(503));
        assert!(!options.is_retryable_status(500));
        assert!(options.log_retries);
    }

    #[test]
    fn zero_values_are_kept() {
        let options = MonitorOptions::from_json(
            r#"{"maxRetries": 0, "retryDelay": 0, "statusCodesToRetry": [], "logRetries": false}"#,
        )
        .expect("options must parse");
        assert_eq!(options.max_retries, 0);
        assert_eq!(options.retry_delay, Duration::ZERO);
        assert!(options.status_codes_to_retry.is_empty());
        assert!(!options.log_retries);
    }

    #[test]
    fn negative_max_retries_is_rejected() {
        let err = MonitorOptions::from_json(r#"{"maxRetries": -1}"#)
            .expect_err("negative retries must fail");
        assert!(matches!(
            err,
            MonitorError::InvalidOption {
                option: "maxRetries",
                ..
            }
        ));
    }

    #[test]
    fn negative_retry_delay_is_rejected() {
        let err = MonitorOptions::from_json(r#"{"retryDelay": -250}"#)
            .expect_err("negative delay must fail");
        assert!(matches!(
            err,
            MonitorError::InvalidOption {
                option: "retryDelay",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_status_code_is_rejected() {
        let err = MonitorOptions::from_json(r#"{"statusCodesToRetry": [500, 42]}"#)
            .expect_err("status 42 must fail");
        assert!(matches!(
            err,
            MonitorError::InvalidOption {
                option: "statusCodesToRetry",
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_and_bad_json_are_decode_errors() {
        assert!(matches!(
            MonitorOptions::from_json(r#"{"maxRetry": 2}"#),
            Err(MonitorError::Decode(_))
        ));
        assert!(matches!(
            MonitorOptions::from_json("not json"),
            Err(MonitorError::Decode(_))
        ));
    }

    #[test]
    fn serde_deserialize_validates() {
        let parsed: Result<MonitorOptions, _> =
            serde_json::from_value(serde_json::json!({ "maxRetries": -3 }));
        assert!(parsed.is_err());

        let parsed: MonitorOptions =
            serde_json::from_value(serde_json::json!({ "logRetries": false }))
                .expect("options must deserialize");
        assert!(!parsed.log_retries);
    }

    #[test]
    fn builder_status_codes_are_validated() {
        for bad in [0, 42, 1000] {
            let err = MonitorOptions::default()
                .with_status_codes([500, bad])
                .validate()
                .expect_err("non-HTTP status must fail");
            assert!(matches!(
                err,
                MonitorError::InvalidOption {
                    option: "statusCodesToRetry",
                    ..
                }
            ));
        }

        MonitorOptions::default()
            .with_status_codes([100, 503, 999])
            .validate()
            .expect("HTTP statuses must pass");
        MonitorOptions::default()
            .with_status_codes([])
            .validate()
            .expect("empty set must pass");
    }

    #[test]
    fn debug_hides_hook_closures() {
        let options = MonitorOptions::default().with_on_retry(|_, _, _| Ok(()));
        let debug = format!("{options:?}");
        assert!(debug.contains("<hook>"));
    }
}
