//! Configuration loading, parsing, and validation.
//!
//! - File format in [`schema`]
//! - Resolved settings and validation in [`settings`]
//! - Dotenv parsing in [`env_file`]
//! - Layered loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use readycheck::config::{load_config_with_env, ConfigOverrides, ConfigSources};
//! use std::collections::HashMap;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! std::fs::write(temp.path().join("readycheck.yml"), "target:\n  tenant_id: ACME\n").unwrap();
//!
//! let env: HashMap<String, String> =
//!     [("API_BASE_URL".to_string(), "https://staging.example.com".to_string())].into();
//! let config = load_config_with_env(
//!     &ConfigSources::discover(temp.path()),
//!     &env,
//!     &ConfigOverrides::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(config.target.base_url, "https://staging.example.com");
//! assert_eq!(config.target.tenant_id, "ACME");
//! ```

pub mod env_file;
pub mod loader;
pub mod schema;
pub mod settings;

pub use env_file::{EnvFileParser, DEFAULT_ENV_FILES};
pub use loader::{
    load_config, load_config_file, load_config_with_env, ConfigOverrides, ConfigSources,
    CONFIG_FILE_NAME,
};
pub use schema::{ConfigFile, ResourceConfig, ServerConfig, SuiteConfig};
pub use settings::{
    default_resources, Endpoints, HarnessConfig, Target, Timeouts, DEFAULT_BASE_URL,
    DEFAULT_REPORT_DIR, DEFAULT_TENANT,
};
