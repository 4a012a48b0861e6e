//! Layered configuration loading.
//!
//! Later layers win:
//! 1. Built-in defaults
//! 2. `readycheck.yml` (or the file given with `--config`)
//! 3. Dotenv file (`--env-file`, else `.env.test.local` / `.env.test`)
//! 4. Process environment
//! 5. Command-line overrides

use crate::config::env_file::EnvFileParser;
use crate::config::schema::{ConfigFile, ServerConfig};
use crate::config::settings::HarnessConfig;
use crate::error::{ReadyCheckError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "readycheck.yml";

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub tenant_id: Option<String>,
    pub production_mode: bool,
    pub report_dir: Option<PathBuf>,
}

/// Where to look for each layer.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Directory relative paths are resolved against.
    pub base_dir: PathBuf,
    /// Explicit config file; must exist when given.
    pub config_file: Option<PathBuf>,
    /// Explicit dotenv file; must exist when given.
    pub env_file: Option<PathBuf>,
}

impl ConfigSources {
    /// Discover layers in `base_dir` with no explicit files.
    pub fn discover(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            config_file: None,
            env_file: None,
        }
    }

    fn config_path(&self) -> Option<PathBuf> {
        match &self.config_file {
            Some(path) => Some(self.resolve(path)),
            None => {
                let path = self.base_dir.join(CONFIG_FILE_NAME);
                path.is_file().then_some(path)
            }
        }
    }

    fn env_path(&self) -> Option<PathBuf> {
        match &self.env_file {
            Some(path) => Some(self.resolve(path)),
            None => EnvFileParser::discover(&self.base_dir),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Load configuration using the real process environment.
pub fn load_config(sources: &ConfigSources, overrides: &ConfigOverrides) -> Result<HarnessConfig> {
    let process_env: HashMap<String, String> = std::env::vars().collect();
    load_config_with_env(sources, &process_env, overrides)
}

/// Load configuration with an explicit process environment.
pub fn load_config_with_env(
    sources: &ConfigSources,
    process_env: &HashMap<String, String>,
    overrides: &ConfigOverrides,
) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::default();

    if let Some(path) = sources.config_path() {
        let file = load_config_file(&path)?;
        apply_file(&mut config, file);
        config.sources.push(path);
    }

    let mut env = HashMap::new();
    if let Some(path) = sources.env_path() {
        env.extend(EnvFileParser::load(&path)?);
        config.sources.push(path);
    }
    env.extend(process_env.iter().map(|(k, v)| (k.clone(), v.clone())));
    apply_env(&mut config, &env)?;

    apply_overrides(&mut config, overrides);
    resolve_paths(&mut config, &sources.base_dir);

    debug!("Resolved configuration from {:?}", config.sources);
    config.validate()?;
    Ok(config)
}

/// Load and parse a `readycheck.yml` file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReadyCheckError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ReadyCheckError::Io(e)
        }
    })?;

    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    serde_yaml::from_str(&content).map_err(|e| ReadyCheckError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn apply_file(config: &mut HarnessConfig, file: ConfigFile) {
    let target = file.target;
    set(&mut config.target.base_url, target.base_url);
    set(&mut config.target.tenant_id, target.tenant_id);
    config.target.email = target.email.or(config.target.email.take());
    config.target.password = target.password.or(config.target.password.take());
    set(&mut config.target.insecure_tls, target.insecure_tls);

    let timeouts = file.timeouts;
    set(&mut config.timeouts.request_secs, timeouts.request_secs);
    set(&mut config.timeouts.readiness_secs, timeouts.readiness_secs);
    set(&mut config.timeouts.readiness_interval_ms, timeouts.readiness_interval_ms);
    set(&mut config.timeouts.shutdown_grace_secs, timeouts.shutdown_grace_secs);
    set(&mut config.timeouts.suite_secs, timeouts.suite_secs);
    if timeouts.run_secs.is_some() {
        config.timeouts.run_secs = timeouts.run_secs;
    }

    set(&mut config.endpoints.health, file.endpoints.health);
    set(&mut config.endpoints.login, file.endpoints.login);
    set(&mut config.endpoints.profile, file.endpoints.profile);

    if file.server.is_some() {
        config.server = file.server;
    }
    set(&mut config.resources, file.resources);
    config.suites = file.suites;
    set(&mut config.production_mode, file.production_mode);
    set(&mut config.report_dir, file.report_dir);
}

fn apply_env(config: &mut HarnessConfig, env: &HashMap<String, String>) -> Result<()> {
    let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(url) = get("API_BASE_URL") {
        config.target.base_url = url.to_string();
    }
    if let Some(tenant) = get("TENANT_ID") {
        config.target.tenant_id = tenant.to_string();
    }
    if let Some(email) = get("TEST_EMAIL") {
        config.target.email = Some(email.to_string());
    }
    if let Some(password) = env.get("TEST_PASSWORD").filter(|v| !v.is_empty()) {
        config.target.password = Some(password.clone());
    }
    if let Some(value) = get("INSECURE_TLS") {
        config.target.insecure_tls = parse_bool("INSECURE_TLS", value)?;
    }

    for (key, slot) in [
        ("REQUEST_TIMEOUT_SECS", &mut config.timeouts.request_secs),
        ("READINESS_TIMEOUT_SECS", &mut config.timeouts.readiness_secs),
        ("READINESS_INTERVAL_MS", &mut config.timeouts.readiness_interval_ms),
        ("SHUTDOWN_GRACE_SECS", &mut config.timeouts.shutdown_grace_secs),
        ("SUITE_TIMEOUT_SECS", &mut config.timeouts.suite_secs),
    ] {
        if let Some(value) = get(key) {
            *slot = parse_number(key, value)?;
        }
    }
    if let Some(value) = get("RUN_TIMEOUT_SECS") {
        config.timeouts.run_secs = Some(parse_number("RUN_TIMEOUT_SECS", value)?);
    }

    for key in ["PW_TEST_PRODUCTION", "PRODUCTION_MODE"] {
        if let Some(value) = get(key) {
            config.production_mode = parse_bool(key, value)?;
        }
    }

    if let Some(command) = get("SERVER_COMMAND") {
        match config.server.as_mut() {
            Some(server) => server.command = command.to_string(),
            None => {
                config.server = Some(ServerConfig {
                    command: command.to_string(),
                    cwd: None,
                    env: HashMap::new(),
                    health_path: None,
                })
            }
        }
    }
    if let Some(dir) = get("SERVER_DIR") {
        if let Some(server) = config.server.as_mut() {
            server.cwd = Some(PathBuf::from(dir));
        }
    }
    if let Some(dir) = get("REPORT_DIR") {
        config.report_dir = PathBuf::from(dir);
    }

    Ok(())
}

fn apply_overrides(config: &mut HarnessConfig, overrides: &ConfigOverrides) {
    if let Some(url) = &overrides.base_url {
        config.target.base_url = url.clone();
    }
    if let Some(tenant) = &overrides.tenant_id {
        config.target.tenant_id = tenant.clone();
    }
    if overrides.production_mode {
        config.production_mode = true;
    }
    if let Some(dir) = &overrides.report_dir {
        config.report_dir = dir.clone();
    }
}

fn resolve_paths(config: &mut HarnessConfig, base_dir: &Path) {
    let resolve = |path: &Path| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    };

    config.report_dir = resolve(&config.report_dir);
    if let Some(server) = config.server.as_mut() {
        server.cwd = Some(resolve(server.cwd.as_deref().unwrap_or(Path::new("."))));
    }
    for suite in &mut config.suites {
        suite.cwd = Some(resolve(suite.cwd.as_deref().unwrap_or(Path::new("."))));
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| ReadyCheckError::ConfigValidationError {
            message: format!("{} must be a whole number, got '{}'", key, value),
        })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ReadyCheckError::ConfigValidationError {
            message: format!("{} must be true or false, got '{}'", key, value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(temp: &TempDir, process_env: &[(&str, &str)], overrides: &ConfigOverrides) -> Result<HarnessConfig> {
        load_config_with_env(&ConfigSources::discover(temp.path()), &env(process_env), overrides)
    }

    #[test]
    fn defaults_when_nothing_is_configured() {
        let temp = TempDir::new().unwrap();
        let config = load(&temp, &[], &ConfigOverrides::default()).unwrap();

        assert_eq!(config.target.base_url, "http://localhost:3001");
        assert_eq!(config.target.tenant_id, "DEMO");
        assert_eq!(config.report_dir, temp.path().join("readycheck-report"));
        assert!(config.sources.is_empty());
    }

    #[test]
    fn file_then_dotenv_then_process_env_then_cli() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "target:\n  base_url: http://from-file\n  tenant_id: FILE\n  email: file@example.com\ntimeouts:\n  request_secs: 3\n",
        )
        .unwrap();
        fs::write(
            temp.path().join(".env.test"),
            "API_BASE_URL=http://from-dotenv\nTENANT_ID=DOTENV\nREQUEST_TIMEOUT_SECS=4\n",
        )
        .unwrap();

        let config = load(
            &temp,
            &[("TENANT_ID", "PROCESS")],
            &ConfigOverrides {
                base_url: Some("http://from-cli".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.target.base_url, "http://from-cli");
        assert_eq!(config.target.tenant_id, "PROCESS");
        assert_eq!(config.target.email.as_deref(), Some("file@example.com"));
        assert_eq!(config.timeouts.request_secs, 4);
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let temp = TempDir::new().unwrap();
        let sources = ConfigSources {
            config_file: Some(PathBuf::from("missing.yml")),
            ..ConfigSources::discover(temp.path())
        };

        let err = load_config_with_env(&sources, &HashMap::new(), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ReadyCheckError::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "target: [unclosed").unwrap();

        let err = load(&temp, &[], &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ReadyCheckError::ConfigParseError { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_env_number_is_a_validation_error() {
        let temp = TempDir::new().unwrap();
        let err = load(&temp, &[("REQUEST_TIMEOUT_SECS", "soon")], &ConfigOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn suite_timeout_defaults_and_overrides() {
        let temp = TempDir::new().unwrap();
        let config = load(&temp, &[], &ConfigOverrides::default()).unwrap();
        assert_eq!(config.timeouts.suite_secs, 600);

        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "timeouts:\n  suite_secs: 120\n",
        )
        .unwrap();
        let config = load(&temp, &[], &ConfigOverrides::default()).unwrap();
        assert_eq!(config.timeouts.suite_secs, 120);

        let config = load(&temp, &[("SUITE_TIMEOUT_SECS", "30")], &ConfigOverrides::default()).unwrap();
        assert_eq!(config.timeouts.suite(), std::time::Duration::from_secs(30));

        let err = load(&temp, &[("SUITE_TIMEOUT_SECS", "0")], &ConfigOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("suite_secs"), "{}", err);
    }

    #[test]
    fn production_mode_alias_disables_server() {
        let temp = TempDir::new().unwrap();
        let config = load(
            &temp,
            &[("SERVER_COMMAND", "npm start"), ("PW_TEST_PRODUCTION", "true")],
            &ConfigOverrides::default(),
        )
        .unwrap();

        assert!(config.server.is_some());
        assert!(config.production_mode);
        assert!(!config.should_spawn_server());
    }

    #[test]
    fn server_and_suite_dirs_resolve_against_base_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "server:\n  command: npm start\n  cwd: backend\nsuites:\n  - name: unit\n    command: npm test\n",
        )
        .unwrap();

        let config = load(&temp, &[], &ConfigOverrides::default()).unwrap();

        assert_eq!(
            config.server.unwrap().cwd,
            Some(temp.path().join("backend"))
        );
        assert_eq!(config.suites[0].cwd, Some(temp.path().join(".")));
    }

    #[test]
    fn invalid_base_url_fails_validation() {
        let temp = TempDir::new().unwrap();
        let err = load(&temp, &[("API_BASE_URL", "localhost:3001")], &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ReadyCheckError::ConfigValidationError { .. }));
    }
}
