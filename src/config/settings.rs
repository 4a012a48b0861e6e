//! Resolved harness configuration.

use crate::error::{ReadyCheckError, Result};
use crate::secrets::REDACTED;
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use super::schema::{ResourceConfig, ServerConfig, SuiteConfig};

/// Default base URL of the service under assessment.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Default tenant identifier.
pub const DEFAULT_TENANT: &str = "DEMO";

/// Default report directory.
pub const DEFAULT_REPORT_DIR: &str = "readycheck-report";

/// Configuration after every layer has been applied.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessConfig {
    pub target: Target,
    pub timeouts: Timeouts,
    pub endpoints: Endpoints,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
    pub resources: Vec<ResourceConfig>,
    pub suites: Vec<SuiteConfig>,
    pub production_mode: bool,
    pub report_dir: PathBuf,
    /// Files that contributed to this configuration, in load order.
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub base_url: String,
    pub tenant_id: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub insecure_tls: bool,
}

impl Target {
    /// Whether login credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeouts {
    pub request_secs: u64,
    pub readiness_secs: u64,
    pub readiness_interval_ms: u64,
    pub shutdown_grace_secs: u64,
    pub run_secs: Option<u64>,
    /// Applies to suites that set no `timeout_secs` of their own.
    pub suite_secs: u64,
}

impl Timeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn readiness(&self) -> Duration {
        Duration::from_secs(self.readiness_secs)
    }

    pub fn readiness_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn run(&self) -> Option<Duration> {
        self.run_secs.map(Duration::from_secs)
    }

    pub fn suite(&self) -> Duration {
        Duration::from_secs(self.suite_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: 10,
            readiness_secs: 60,
            readiness_interval_ms: 500,
            shutdown_grace_secs: 5,
            run_secs: None,
            suite_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Endpoints {
    pub health: String,
    pub login: String,
    pub profile: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: "/api/health".to_string(),
            login: "/api/auth/login".to_string(),
            profile: "/api/users/profile".to_string(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            target: Target {
                base_url: DEFAULT_BASE_URL.to_string(),
                tenant_id: DEFAULT_TENANT.to_string(),
                email: None,
                password: None,
                insecure_tls: false,
            },
            timeouts: Timeouts::default(),
            endpoints: Endpoints::default(),
            server: None,
            resources: default_resources(),
            suites: Vec::new(),
            production_mode: false,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            sources: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Whether the run should spawn and supervise the server.
    pub fn should_spawn_server(&self) -> bool {
        !self.production_mode && self.server.is_some()
    }

    /// Path polled for server readiness.
    pub fn readiness_path(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.health_path.as_deref())
            .unwrap_or(&self.endpoints.health)
    }

    /// Copy with the password and server secrets masked, for display.
    pub fn redacted(&self) -> HarnessConfig {
        let mut copy = self.clone();
        if copy.target.password.is_some() {
            copy.target.password = Some(REDACTED.to_string());
        }
        if let Some(server) = copy.server.as_mut() {
            for (key, value) in server.env.iter_mut() {
                if crate::secrets::is_secret_key(key) {
                    *value = REDACTED.to_string();
                }
            }
        }
        copy
    }

    /// Check value constraints, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ReadyCheckError::ConfigValidationError {
                message: errors.join("; "),
            })
        }
    }

    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let url = self.target.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("base_url must start with http:// or https://, got '{}'", url));
        } else if url
            .split("://")
            .nth(1)
            .is_none_or(|rest| rest.trim_matches('/').is_empty())
        {
            errors.push(format!("base_url has no host: '{}'", url));
        }

        if self.target.tenant_id.trim().is_empty() {
            errors.push("tenant_id must not be empty".to_string());
        }

        for (name, value) in [
            ("request_secs", self.timeouts.request_secs),
            ("readiness_secs", self.timeouts.readiness_secs),
            ("readiness_interval_ms", self.timeouts.readiness_interval_ms),
            ("shutdown_grace_secs", self.timeouts.shutdown_grace_secs),
            ("suite_secs", self.timeouts.suite_secs),
        ] {
            if value == 0 {
                errors.push(format!("timeouts.{} must be greater than zero", name));
            }
        }
        if self.timeouts.run_secs == Some(0) {
            errors.push("timeouts.run_secs must be greater than zero".to_string());
        }

        if let Some(server) = &self.server {
            if server.command.trim().is_empty() {
                errors.push("server.command must not be empty".to_string());
            }
        }

        for endpoint in [&self.endpoints.health, &self.endpoints.login, &self.endpoints.profile] {
            if !endpoint.starts_with('/') {
                errors.push(format!("endpoint '{}' must start with '/'", endpoint));
            }
        }

        errors.extend(unique_names(
            "resource",
            self.resources.iter().map(|r| r.name.as_str()),
        ));
        for resource in &self.resources {
            if !resource.path.starts_with('/') {
                errors.push(format!(
                    "resource '{}' path must start with '/'",
                    resource.name
                ));
            }
        }

        errors.extend(unique_names("suite", self.suites.iter().map(|s| s.name.as_str())));
        for suite in &self.suites {
            if suite.command.trim().is_empty() {
                errors.push(format!("suite '{}' has an empty command", suite.name));
            }
            if suite.timeout_secs == Some(0) {
                errors.push(format!("suite '{}' timeout must be greater than zero", suite.name));
            }
        }

        errors
    }
}

fn unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for name in names {
        if name.trim().is_empty() {
            errors.push(format!("{} name must not be empty", kind));
        } else if !seen.insert(name) {
            errors.push(format!("duplicate {} name '{}'", kind, name));
        }
    }
    errors
}

/// Resources exercised when the configuration file names none.
pub fn default_resources() -> Vec<ResourceConfig> {
    vec![
        ResourceConfig {
            name: "users".to_string(),
            path: "/api/users".to_string(),
            create: json!({
                "email": "readycheck_${unique}@test.com",
                "password": "Test123!",
                "first_name": "Test",
                "last_name": "User",
                "role": "sales_rep"
            }),
            update: json!({"first_name": "Updated", "last_name": "Name"}),
        },
        ResourceConfig {
            name: "customers".to_string(),
            path: "/api/customers".to_string(),
            create: json!({
                "name": "Test Customer ${unique}",
                "email": "customer_${unique}@test.com",
                "phone": "+1234567890",
                "company": "Test Company",
                "status": "active"
            }),
            update: json!({"name": "Updated Customer Name", "status": "active"}),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = HarnessConfig::default();
        config.validate().unwrap();
        assert_eq!(config.target.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.target.tenant_id, "DEMO");
        assert!(!config.should_spawn_server());
        assert_eq!(config.readiness_path(), "/api/health");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = HarnessConfig::default();
        config.target.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("http:// or https://"), "{}", err);
    }

    #[test]
    fn rejects_zero_timeouts_and_reports_all_errors() {
        let mut config = HarnessConfig::default();
        config.timeouts.request_secs = 0;
        config.timeouts.readiness_secs = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("request_secs"));
        assert!(err.contains("readiness_secs"));
    }

    #[test]
    fn rejects_duplicate_suite_names() {
        let mut config = HarnessConfig::default();
        let suite = SuiteConfig {
            name: "unit".to_string(),
            command: "true".to_string(),
            cwd: None,
            timeout_secs: None,
        };
        config.suites = vec![suite.clone(), suite];
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate suite name 'unit'"), "{}", err);
    }

    #[test]
    fn server_spawns_unless_production_mode() {
        let mut config = HarnessConfig::default();
        config.server = Some(ServerConfig {
            command: "npm start".to_string(),
            cwd: None,
            env: Default::default(),
            health_path: Some("/ready".to_string()),
        });
        assert!(config.should_spawn_server());
        assert_eq!(config.readiness_path(), "/ready");

        config.production_mode = true;
        assert!(!config.should_spawn_server());
    }

    #[test]
    fn redacted_masks_password_and_secret_env() {
        let mut config = HarnessConfig::default();
        config.target.password = Some("hunter2".to_string());
        config.server = Some(ServerConfig {
            command: "npm start".to_string(),
            cwd: None,
            env: [
                ("JWT_SECRET".to_string(), "abc".to_string()),
                ("PORT".to_string(), "3001".to_string()),
            ]
            .into_iter()
            .collect(),
            health_path: None,
        });

        let redacted = config.redacted();
        assert_eq!(redacted.target.password.as_deref(), Some(REDACTED));
        let env = &redacted.server.as_ref().unwrap().env;
        assert_eq!(env["JWT_SECRET"], REDACTED);
        assert_eq!(env["PORT"], "3001");
    }
}
