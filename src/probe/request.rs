//! Probe request and response types.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// HTTP method of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller expects the service to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expectation {
    /// A response with status below 400.
    #[default]
    Success,
    /// A response with status 400 or above.
    Failure,
}

impl Expectation {
    /// Whether `status` satisfies this expectation.
    pub fn is_met_by(self, status: u16) -> bool {
        match self {
            Expectation::Success => status < 400,
            Expectation::Failure => status >= 400,
        }
    }

    /// Short description used in mismatch details.
    pub fn describe(self) -> &'static str {
        match self {
            Expectation::Success => "status < 400",
            Expectation::Failure => "status >= 400",
        }
    }
}

/// Header list with case-insensitive names, preserving insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value of a header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// These headers overlaid with `overrides`.
    pub fn merged(&self, overrides: &Headers) -> Headers {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.insert(name, value);
        }
        merged
    }
}

impl From<&reqwest::header::HeaderMap> for Headers {
    fn from(map: &reqwest::header::HeaderMap) -> Self {
        let mut headers = Headers::new();
        for (name, value) in map {
            if let Ok(value) = value.to_str() {
                headers.entries.push((name.as_str().to_string(), value.to_string()));
            }
        }
        headers
    }
}

/// A single HTTP probe.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use readycheck::probe::{Expectation, ProbeRequest};
///
/// let request = ProbeRequest::post("/api/auth/login")
///     .json(serde_json::json!({"email": "nobody@example.com", "password": "wrong"}))
///     .timeout(Duration::from_secs(5))
///     .expect_failure();
///
/// assert_eq!(request.expectation, Expectation::Failure);
/// ```
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the executor's base URL, or an absolute URL.
    pub path: String,
    /// Request headers. These override executor defaults.
    pub headers: Headers,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Overrides the executor's default timeout.
    pub timeout: Option<Duration>,
    /// Expected class of response.
    pub expectation: Expectation,
}

impl ProbeRequest {
    /// Create a request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: None,
            timeout: None,
            expectation: Expectation::Success,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add or replace a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a bearer token.
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Expect a 4xx/5xx answer.
    pub fn expect_failure(mut self) -> Self {
        self.expectation = Expectation::Failure;
        self
    }

    /// `METHOD path`, for details and logs.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Body of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that is empty or not valid JSON.
    Raw(Vec<u8>),
}

impl ResponseBody {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) if !bytes.is_empty() => ResponseBody::Json(value),
            _ => ResponseBody::Raw(bytes.to_vec()),
        }
    }
}

/// A response received from the service.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Response body.
    pub body: ResponseBody,
    /// Time from send until the body was read.
    pub elapsed: Duration,
}

impl ProbeResponse {
    /// Parsed JSON body, if the body was JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    /// Body as text (lossy for raw bodies).
    pub fn text(&self) -> String {
        match &self.body {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Look up a value in the JSON body by JSON pointer (e.g. `/data/token`).
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.json().and_then(|v| v.pointer(pointer))
    }

    /// Look up a response header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expectation_boundaries() {
        assert!(Expectation::Success.is_met_by(200));
        assert!(Expectation::Success.is_met_by(399));
        assert!(!Expectation::Success.is_met_by(400));
        assert!(Expectation::Failure.is_met_by(400));
        assert!(Expectation::Failure.is_met_by(503));
        assert!(!Expectation::Failure.is_met_by(302));
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("content-type", "application/json");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert!(headers.contains("content-type"));
    }

    #[test]
    fn merged_prefers_overrides() {
        let mut defaults = Headers::new();
        defaults.insert("X-Tenant-ID", "DEMO");
        defaults.insert("Content-Type", "application/json");
        let mut overrides = Headers::new();
        overrides.insert("x-tenant-id", "");

        let merged = defaults.merged(&overrides);
        assert_eq!(merged.get("X-Tenant-ID"), Some(""));
        assert_eq!(merged.get("content-type"), Some("application/json"));
    }

    #[test]
    fn builder_sets_fields() {
        let request = ProbeRequest::put("/api/users/1")
            .bearer("abc")
            .json(json!({"name": "x"}))
            .timeout(Duration::from_millis(250));

        assert_eq!(request.method, Method::Put);
        assert_eq!(request.headers.get("authorization"), Some("Bearer abc"));
        assert_eq!(request.timeout, Some(Duration::from_millis(250)));
        assert_eq!(request.expectation, Expectation::Success);
        assert_eq!(request.label(), "PUT /api/users/1");
    }

    #[test]
    fn body_parsing_keeps_non_json_raw() {
        assert_eq!(
            ResponseBody::from_bytes(br#"{"ok":true}"#),
            ResponseBody::Json(json!({"ok": true}))
        );
        assert_eq!(
            ResponseBody::from_bytes(b"<html>"),
            ResponseBody::Raw(b"<html>".to_vec())
        );
        assert_eq!(ResponseBody::from_bytes(b""), ResponseBody::Raw(Vec::new()));
    }

    #[test]
    fn response_pointer_reads_nested_fields() {
        let response = ProbeResponse {
            status: 200,
            headers: Headers::new(),
            body: ResponseBody::Json(json!({"data": {"token": "t-1"}})),
            elapsed: Duration::from_millis(3),
        };
        assert_eq!(response.pointer("/data/token"), Some(&json!("t-1")));
        assert!(response.pointer("/data/missing").is_none());
    }
}
