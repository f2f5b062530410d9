use std::{fmt, sync::Arc};

use reqwest::{header, Method};

use crate::{
    delay, hooks, Decision, MonitorError, MonitorOptions, RequestDescriptor, ResponseDescriptor, Result,
    RetryCoordinator,
};

/// Final response handed back by [`MonitoredClient::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitoredResponse {
    pub status: u16,
    pub body: String,
    /// Retries granted while producing this response.
    pub retries: u32,
    /// `true` when the retry budget for the request ran out.
    pub exhausted: bool,
}

/// Payload sent with a request, with the `Content-Type` it is sent under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestBody {
    pub content_type: String,
    pub content: String,
}

impl RequestBody {
    pub fn new(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    pub fn json(content: impl Into<String>) -> Self {
        Self::new("application/json", content)
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new("text/plain; charset=utf-8", content)
    }
}

/// HTTP client that watches every response and re-sends requests whose
/// status is in the configured retry set.
///
/// All clones share one [`RetryCoordinator`], so a test case that issues
/// the same request from several places draws on a single retry budget.
#[derive(Clone)]
pub struct MonitoredClient {
    http: reqwest::Client,
    coordinator: Arc<RetryCoordinator>,
}

impl fmt::Debug for MonitoredClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoredClient")
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

impl Default for MonitoredClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitoredClient {
    /// Creates a client with default [`MonitorOptions`].
    pub fn new() -> Self {
        Self::with_http(reqwest::Client::new())
    }

    /// Wraps an existing `reqwest` client, keeping its timeouts and TLS
    /// settings.
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            coordinator: Arc::new(RetryCoordinator::default()),
        }
    }

    /// Replaces the monitor options. Retry counts collected so far are
    /// discarded.
    pub fn with_options(mut self, opts: MonitorOptions) -> Self {
        self.coordinator = Arc::new(RetryCoordinator::new(opts));
        self
    }

    pub fn options(&self) -> &MonitorOptions {
        self.coordinator.options()
    }

    pub fn coordinator(&self) -> &Arc<RetryCoordinator> {
        &self.coordinator
    }

    /// Clears retry counts. Call at the start of every test case.
    pub fn begin_test_case(&self) {
        self.coordinator.reset();
    }

    /// Sends a `GET` request.
    pub async fn get(&self, url: impl Into<String>) -> Result<MonitoredResponse> {
        self.send(RequestDescriptor::get(url), None).await
    }

    /// Sends `request`, re-sending it while the coordinator grants retries.
    ///
    /// `body` goes out with its own `Content-Type` on every attempt.
    ///
    /// The response that ends the loop is returned whatever its status; a
    /// response whose budget ran out is flagged with `exhausted`. Transport
    /// errors are not retried.
    pub async fn send(
        &self,
        request: RequestDescriptor,
        body: Option<RequestBody>,
    ) -> Result<MonitoredResponse> {
        let method = Method::from_bytes(request.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|err| {
                MonitorError::InvalidRequest(format!("method '{}': {err}", request.method))
            })?;

        self.coordinator.on_request_observed(&request);

        let mut retries = 0u32;
        loop {
            let response = self.send_once(&method, &request, body.as_ref()).await?;
            let decision = self.coordinator.decide(&request, &response);
            hooks::dispatch(self.coordinator.options(), &request, &response, decision)?;

            match decision {
                Decision::Proceed => {
                    return Ok(MonitoredResponse {
                        status: response.status,
                        body: response.body,
                        retries,
                        exhausted: false,
                    });
                }
                Decision::GiveUp { .. } => {
                    return Ok(MonitoredResponse {
                        status: response.status,
                        body: response.body,
                        retries,
                        exhausted: true,
                    });
                }
                Decision::Retry { attempt, delay } => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "re-sending {} {} in {} ms (attempt {})",
                        request.method,
                        request.url,
                        delay.as_millis(),
                        attempt
                    );

                    delay::wait(delay).await;
                    retries = attempt;
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        request: &RequestDescriptor,
        body: Option<&RequestBody>,
    ) -> Result<ResponseDescriptor> {
        let mut builder = self.http.request(method.clone(), &request.url);
        if let Some(body) = body {
            builder = builder
                .header(header::CONTENT_TYPE, body.content_type.as_str())
                .body(body.content.clone());
        }

        let response = builder.send().await.map_err(MonitorError::Transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(MonitorError::Transport)?;
        Ok(ResponseDescriptor::new(status, body))
    }
}
