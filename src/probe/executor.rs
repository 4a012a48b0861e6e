//! Timed execution of a single HTTP probe.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;

use crate::error::{ReadyCheckError, Result};
use crate::results::Outcome;

use super::request::{Expectation, Headers, ProbeRequest, ProbeResponse, ResponseBody};

/// Header carrying the tenant identifier.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// No response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("timeout after {}", secs_label(.after))]
    Timeout { after: Duration },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// Why a probe did not yield a usable response.
///
/// Check bodies propagate this with `?`; the message becomes the FAIL detail.
#[derive(Debug, Clone, Error)]
pub enum ProbeFailure {
    #[error("{request}: {source}")]
    Transport {
        request: String,
        #[source]
        source: TransportFailure,
    },

    #[error("{request}: expected {expected}, got status {observed}")]
    ExpectationMismatch {
        request: String,
        expected: String,
        observed: u16,
    },

    #[error("{request}: malformed response: {message}")]
    MalformedResponse { request: String, message: String },
}

/// Result of executing one probe.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    request: String,
    expectation: Expectation,
    result: std::result::Result<ProbeResponse, TransportFailure>,
    elapsed: Duration,
}

impl ProbeOutcome {
    /// Whether the response matched the request's expectation.
    ///
    /// A transport failure never meets either expectation.
    pub fn met_expectation(&self) -> bool {
        match &self.result {
            Ok(response) => self.expectation.is_met_by(response.status),
            Err(_) => false,
        }
    }

    /// PASS when the expectation was met, otherwise FAIL.
    pub fn base_outcome(&self) -> Outcome {
        Outcome::from_bool(self.met_expectation())
    }

    /// Human-readable description of what happened.
    pub fn detail(&self) -> String {
        match &self.result {
            Ok(response) => format!(
                "{} -> status {} in {}ms",
                self.request,
                response.status,
                response.elapsed.as_millis()
            ),
            Err(failure) => format!("{}: {}", self.request, failure),
        }
    }

    /// The response, if one arrived.
    pub fn response(&self) -> Option<&ProbeResponse> {
        self.result.as_ref().ok()
    }

    /// The transport failure, if no response arrived.
    pub fn transport_failure(&self) -> Option<&TransportFailure> {
        self.result.as_ref().err()
    }

    /// Status code, if a response arrived.
    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// Wall time spent on the call, including failed attempts.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The response if the request's expectation was met.
    pub fn verify(&self) -> std::result::Result<&ProbeResponse, ProbeFailure> {
        let response = self.received()?;
        if self.expectation.is_met_by(response.status) {
            Ok(response)
        } else {
            Err(ProbeFailure::ExpectationMismatch {
                request: self.request.clone(),
                expected: self.expectation.describe().to_string(),
                observed: response.status,
            })
        }
    }

    /// The response if its status is exactly `code`.
    pub fn expect_status(&self, code: u16) -> std::result::Result<&ProbeResponse, ProbeFailure> {
        let response = self.received()?;
        if response.status == code {
            Ok(response)
        } else {
            Err(ProbeFailure::ExpectationMismatch {
                request: self.request.clone(),
                expected: format!("status {}", code),
                observed: response.status,
            })
        }
    }

    /// The verified response's JSON body.
    pub fn json(&self) -> std::result::Result<&serde_json::Value, ProbeFailure> {
        let response = self.verify()?;
        response.json().ok_or_else(|| ProbeFailure::MalformedResponse {
            request: self.request.clone(),
            message: format!("body is not JSON: {}", truncate(&response.text(), 80)),
        })
    }

    fn received(&self) -> std::result::Result<&ProbeResponse, ProbeFailure> {
        self.result
            .as_ref()
            .map_err(|failure| ProbeFailure::Transport {
                request: self.request.clone(),
                source: failure.clone(),
            })
    }
}

/// Issues HTTP probes against one base URL.
///
/// Holds a pooled blocking client; safe to share between threads.
#[derive(Debug, Clone)]
pub struct ProbeExecutor {
    client: Client,
    base_url: String,
    default_timeout: Duration,
    default_headers: Headers,
}

impl ProbeExecutor {
    /// Create an executor for `base_url`.
    pub fn new(base_url: &str, default_timeout: Duration, insecure_tls: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("readycheck/", env!("CARGO_PKG_VERSION")))
            .timeout(default_timeout)
            .danger_accept_invalid_certs(insecure_tls)
            .build()
            .map_err(|e| ReadyCheckError::HttpClient {
                message: e.to_string(),
            })?;

        let mut default_headers = Headers::new();
        default_headers.insert("Content-Type", "application/json");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout,
            default_headers,
        })
    }

    /// Send the tenant header on every request.
    pub fn with_tenant(self, tenant: &str) -> Self {
        self.with_default_header(TENANT_HEADER, tenant)
    }

    /// Send a header on every request unless the request overrides it.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout used when a request has none.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Resolve a request path to a full URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Execute one request. Exactly one attempt; never retries.
    pub fn execute(&self, request: &ProbeRequest) -> ProbeOutcome {
        let url = self.url_for(&request.path);
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &url)
            .timeout(timeout);
        for (name, value) in self.default_headers.merged(&request.headers).iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let started = Instant::now();
        let result = builder.send().and_then(|response| {
            let status = response.status().as_u16();
            let headers = Headers::from(response.headers());
            let bytes = response.bytes()?;
            Ok((status, headers, bytes))
        });
        let elapsed = started.elapsed();

        let result = match result {
            Ok((status, headers, bytes)) => {
                debug!("{} {} -> {} in {:?}", request.method, url, status, elapsed);
                Ok(ProbeResponse {
                    status,
                    headers,
                    body: ResponseBody::from_bytes(&bytes),
                    elapsed,
                })
            }
            Err(e) => {
                let failure = classify(&e, timeout, elapsed);
                debug!("{} {} failed: {}", request.method, url, failure);
                Err(failure)
            }
        };

        ProbeOutcome {
            request: request.label(),
            expectation: request.expectation,
            result,
            elapsed,
        }
    }
}

fn classify(error: &reqwest::Error, timeout: Duration, elapsed: Duration) -> TransportFailure {
    if error.is_timeout() || (!error.is_connect() && elapsed >= timeout) {
        TransportFailure::Timeout { after: timeout }
    } else if error.is_connect() {
        TransportFailure::Connect(root_cause(error))
    } else {
        TransportFailure::Other(root_cause(error))
    }
}

fn root_cause(error: &(dyn StdError + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

fn secs_label(duration: &Duration) -> String {
    format_secs(*duration)
}

/// `5s`, or `0.3s` for sub-second values.
pub(crate) fn format_secs(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeRequest;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::net::TcpListener;

    fn executor_for(server: &MockServer) -> ProbeExecutor {
        ProbeExecutor::new(&server.base_url(), Duration::from_secs(5), false)
            .unwrap()
            .with_tenant("DEMO")
    }

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[test]
    fn success_status_meets_success_expectation() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200).json_body(json!({"status": "ok"}));
        });

        let outcome = executor_for(&server).execute(&ProbeRequest::get("/health"));

        assert!(outcome.met_expectation());
        assert_eq!(outcome.base_outcome(), Outcome::Pass);
        assert_eq!(outcome.status(), Some(200));
        assert_eq!(outcome.json().unwrap()["status"], "ok");
    }

    #[test]
    fn unauthorized_meets_failure_expectation() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(401).json_body(json!({"success": false, "error": "bad credentials"}));
        });

        let request = ProbeRequest::post("/api/auth/login")
            .json(json!({"email": "x@example.com", "password": "nope"}))
            .expect_failure();
        let outcome = executor_for(&server).execute(&request);

        assert!(outcome.met_expectation());
        assert!(outcome.expect_status(401).is_ok());
    }

    #[test]
    fn server_error_does_not_meet_success_expectation() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/users");
            then.status(500).body("boom");
        });

        let outcome = executor_for(&server).execute(&ProbeRequest::get("/api/users"));

        assert!(!outcome.met_expectation());
        assert_eq!(outcome.base_outcome(), Outcome::Fail);
        let err = outcome.verify().unwrap_err().to_string();
        assert!(err.contains("got status 500"), "{}", err);
    }

    #[test]
    fn expect_status_mismatch_names_both_codes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(403);
        });

        let outcome = executor_for(&server).execute(&ProbeRequest::get("/missing").expect_failure());
        assert!(outcome.met_expectation());

        let err = outcome.expect_status(404).unwrap_err().to_string();
        assert!(err.contains("expected status 404"), "{}", err);
        assert!(err.contains("got status 403"), "{}", err);
    }

    #[test]
    fn connection_refused_is_transport_failure() {
        let executor = ProbeExecutor::new(&closed_port_url(), Duration::from_secs(2), false).unwrap();

        for request in [
            ProbeRequest::get("/health"),
            ProbeRequest::get("/health").expect_failure(),
        ] {
            let outcome = executor.execute(&request);
            assert!(outcome.transport_failure().is_some());
            assert!(!outcome.met_expectation());
            assert_eq!(outcome.base_outcome(), Outcome::Fail);
        }
    }

    #[test]
    fn slow_response_times_out_within_bound() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_secs(3));
        });

        let request = ProbeRequest::get("/slow").timeout(Duration::from_millis(300));
        let outcome = executor_for(&server).execute(&request);

        assert_eq!(
            outcome.transport_failure(),
            Some(&TransportFailure::Timeout {
                after: Duration::from_millis(300)
            })
        );
        assert!(outcome.detail().contains("timeout after 0.3s"), "{}", outcome.detail());
        assert!(outcome.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn default_headers_are_sent_and_overridable() {
        let server = MockServer::start();
        let tenant_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/with-tenant")
                .header("X-Tenant-ID", "DEMO")
                .header("Content-Type", "application/json");
            then.status(200);
        });
        let override_mock = server.mock(|when, then| {
            when.method(GET).path("/other-tenant").header("x-tenant-id", "OTHER");
            then.status(200);
        });

        let executor = executor_for(&server);
        assert!(executor.execute(&ProbeRequest::get("/with-tenant")).met_expectation());
        let request = ProbeRequest::get("/other-tenant").header("x-tenant-id", "OTHER");
        assert!(executor.execute(&request).met_expectation());

        tenant_mock.assert();
        override_mock.assert();
    }

    #[test]
    fn non_json_body_is_malformed_when_json_requested() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/html");
            then.status(200).body("<html></html>");
        });

        let outcome = executor_for(&server).execute(&ProbeRequest::get("/html"));
        assert!(outcome.met_expectation());
        let err = outcome.json().unwrap_err();
        assert!(matches!(err, ProbeFailure::MalformedResponse { .. }));
        assert_eq!(outcome.response().unwrap().text(), "<html></html>");
    }

    #[test]
    fn url_for_joins_paths() {
        let executor =
            ProbeExecutor::new("http://localhost:3001/", Duration::from_secs(1), false).unwrap();
        assert_eq!(executor.url_for("/health"), "http://localhost:3001/health");
        assert_eq!(executor.url_for("health"), "http://localhost:3001/health");
        assert_eq!(executor.url_for("https://other/x"), "https://other/x");
    }

    #[test]
    fn format_secs_handles_fractions() {
        assert_eq!(format_secs(Duration::from_secs(10)), "10s");
        assert_eq!(format_secs(Duration::from_millis(1500)), "1.5s");
    }
}
