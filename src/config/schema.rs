//! Configuration file format (`readycheck.yml`).
//!
//! Every field is optional: values left out fall through to the built-in
//! defaults, and the environment and command line may override any of them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root of `readycheck.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Service under assessment.
    pub target: TargetSection,

    /// Time budgets.
    pub timeouts: TimeoutSection,

    /// Well-known endpoint paths.
    pub endpoints: EndpointSection,

    /// Dependent process to launch before the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Resources exercised by the CRUD checks. Replaces the defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceConfig>>,

    /// External test-runner commands.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suites: Vec<SuiteConfig>,

    /// Assess an already-running deployment; never spawn the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_mode: Option<bool>,

    /// Where the report and logs are written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetSection {
    pub base_url: Option<String>,
    pub tenant_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub insecure_tls: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutSection {
    pub request_secs: Option<u64>,
    pub readiness_secs: Option<u64>,
    pub readiness_interval_ms: Option<u64>,
    pub shutdown_grace_secs: Option<u64>,
    pub run_secs: Option<u64>,
    pub suite_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointSection {
    pub health: Option<String>,
    pub login: Option<String>,
    pub profile: Option<String>,
}

/// Dependent process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Shell command that starts the service.
    pub command: String,

    /// Working directory for the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Extra environment for the command.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Readiness path; defaults to the health endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_path: Option<String>,
}

/// A REST collection exercised by list/create/get/update/delete checks.
///
/// String values in `create` and `update` may contain `${unique}`, replaced
/// with a per-run token so repeated runs do not collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Display name (e.g. `customers`).
    pub name: String,

    /// Collection path (e.g. `/api/customers`).
    pub path: String,

    /// Body for the create request.
    pub create: serde_json::Value,

    /// Body for the update request.
    pub update: serde_json::Value,
}

/// An external test-runner command scored as one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    pub name: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_valid() {
        let file: ConfigFile = serde_yaml::from_str("{}").unwrap();
        assert!(file.target.base_url.is_none());
        assert!(file.resources.is_none());
        assert!(file.suites.is_empty());
    }

    #[test]
    fn parses_full_file() {
        let yaml = r#"
target:
  base_url: https://staging.example.com
  tenant_id: ACME
  insecure_tls: true
timeouts:
  request_secs: 5
  readiness_secs: 90
endpoints:
  health: /healthz
server:
  command: npm start
  cwd: backend
  env:
    PORT: "3001"
resources:
  - name: customers
    path: /api/customers
    create:
      name: "Customer ${unique}"
      status: active
    update:
      status: inactive
suites:
  - name: playwright
    command: npx playwright test
    timeout_secs: 600
production_mode: false
report_dir: out
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(file.target.tenant_id.as_deref(), Some("ACME"));
        assert_eq!(file.target.insecure_tls, Some(true));
        assert_eq!(file.timeouts.readiness_secs, Some(90));
        assert_eq!(file.endpoints.health.as_deref(), Some("/healthz"));

        let server = file.server.unwrap();
        assert_eq!(server.command, "npm start");
        assert_eq!(server.env.get("PORT").map(String::as_str), Some("3001"));

        let resources = file.resources.unwrap();
        assert_eq!(resources[0].create["name"], "Customer ${unique}");
        assert_eq!(file.suites[0].timeout_secs, Some(600));
        assert_eq!(file.report_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ConfigFile, _> = serde_yaml::from_str("target:\n  base_uri: x\n");
        assert!(result.is_err());
    }
}
