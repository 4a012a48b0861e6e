//! State shared by the checks of one run.

use crate::probe::{ProbeExecutor, ProbeOutcome, ProbeRequest};
use crate::runner::InterruptFlag;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Placeholder in resource payloads replaced with the run's unique token.
pub const UNIQUE_PLACEHOLDER: &str = "${unique}";

/// Values later checks depend on, such as the login token.
#[derive(Debug, Default)]
pub struct Session {
    pub token: Option<String>,
    ids: HashMap<String, String>,
}

impl Session {
    pub fn remember(&mut self, key: impl Into<String>, id: impl Into<String>) {
        self.ids.insert(key.into(), id.into());
    }

    pub fn recall(&self, key: &str) -> Option<&str> {
        self.ids.get(key).map(String::as_str)
    }

    pub fn forget(&mut self, key: &str) -> Option<String> {
        self.ids.remove(key)
    }
}

/// Everything a check body can reach.
///
/// Shared by reference between concurrently running checks; the session is
/// behind a mutex.
#[derive(Debug)]
pub struct CheckContext {
    executor: ProbeExecutor,
    session: Mutex<Session>,
    unique: String,
    interrupt: Mutex<InterruptFlag>,
}

impl CheckContext {
    pub fn new(executor: ProbeExecutor) -> Self {
        let unique = chrono::Utc::now().timestamp_millis().to_string();
        Self::with_unique(executor, unique)
    }

    /// Use a fixed token for `${unique}` substitution.
    pub fn with_unique(executor: ProbeExecutor, unique: impl Into<String>) -> Self {
        Self {
            executor,
            session: Mutex::new(Session::default()),
            unique: unique.into(),
            interrupt: Mutex::new(InterruptFlag::new()),
        }
    }

    pub fn executor(&self) -> &ProbeExecutor {
        &self.executor
    }

    /// Execute a request as-is.
    pub fn probe(&self, request: ProbeRequest) -> ProbeOutcome {
        self.executor.execute(&request)
    }

    /// Execute a request carrying the session token, if one was obtained.
    pub fn probe_authed(&self, request: ProbeRequest) -> ProbeOutcome {
        let request = match self.token() {
            Some(token) => request.bearer(&token),
            None => request,
        };
        self.executor.execute(&request)
    }

    /// Lock the session. A poisoned lock is recovered.
    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.session().token.clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.session().token = Some(token.into());
    }

    /// Flag of the run this context belongs to.
    pub fn interrupt(&self) -> InterruptFlag {
        self.interrupt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Share `flag` with the checks run against this context.
    pub fn attach_interrupt(&self, flag: InterruptFlag) {
        *self
            .interrupt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = flag;
    }

    pub fn unique(&self) -> &str {
        &self.unique
    }

    /// Replace `${unique}` in every string of `payload`.
    pub fn personalize(&self, payload: &Value) -> Value {
        match payload {
            Value::String(s) => Value::String(s.replace(UNIQUE_PLACEHOLDER, &self.unique)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.personalize(v)).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.personalize(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn context() -> CheckContext {
        let executor =
            ProbeExecutor::new("http://127.0.0.1:9", Duration::from_secs(1), false).unwrap();
        CheckContext::with_unique(executor, "42")
    }

    #[test]
    fn personalize_replaces_nested_placeholders() {
        let ctx = context();
        let payload = json!({
            "email": "user_${unique}@test.com",
            "tags": ["a-${unique}", 7],
            "nested": {"name": "${unique}"}
        });

        assert_eq!(
            ctx.personalize(&payload),
            json!({
                "email": "user_42@test.com",
                "tags": ["a-42", 7],
                "nested": {"name": "42"}
            })
        );
    }

    #[test]
    fn session_tracks_token_and_ids() {
        let ctx = context();
        assert!(ctx.token().is_none());

        ctx.set_token("abc");
        ctx.session().remember("customers", "17");

        assert_eq!(ctx.token().as_deref(), Some("abc"));
        assert_eq!(ctx.session().recall("customers"), Some("17"));
        assert_eq!(ctx.session().forget("customers").as_deref(), Some("17"));
        assert!(ctx.session().recall("customers").is_none());
    }

    #[test]
    fn attached_interrupt_is_shared() {
        let ctx = context();
        assert!(!ctx.interrupt().is_set());

        let flag = InterruptFlag::new();
        ctx.attach_interrupt(flag.clone());
        flag.trigger();

        assert!(ctx.interrupt().is_set());
    }
}
