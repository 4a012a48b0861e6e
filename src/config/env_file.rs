//! Dotenv file parsing.

use crate::error::{ReadyCheckError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Dotenv files probed, in order, when none is given explicitly.
pub const DEFAULT_ENV_FILES: &[&str] = &[".env.test.local", ".env.test"];

/// Parses dotenv files into a map of variables.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Exported: `export KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Trailing comments on unquoted values: `KEY=value # note`
/// - Empty: `KEY=`
/// - Comments: `# This is a comment`
///
/// # Example
///
/// ```
/// use readycheck::config::EnvFileParser;
///
/// let content = r#"
/// # Target
/// API_BASE_URL=https://staging.example.com
/// export TENANT_ID="ACME"
/// TEST_PASSWORD='p#ss word'
/// "#;
///
/// let vars = EnvFileParser::parse(content);
/// assert_eq!(vars["API_BASE_URL"], "https://staging.example.com");
/// assert_eq!(vars["TENANT_ID"], "ACME");
/// assert_eq!(vars["TEST_PASSWORD"], "p#ss word");
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse dotenv content. Lines without `=` are ignored.
    pub fn parse(content: &str) -> HashMap<String, String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(Self::parse_line)
            .collect()
    }

    fn parse_line(line: &str) -> Option<(String, String)> {
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), Self::parse_value(value.trim())))
    }

    fn parse_value(value: &str) -> String {
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        match value.find(" #") {
            Some(pos) => value[..pos].trim_end().to_string(),
            None => value.to_string(),
        }
    }

    /// Load and parse a dotenv file.
    pub fn load(path: &Path) -> Result<HashMap<String, String>> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReadyCheckError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ReadyCheckError::Io(e)
            }
        })?;
        Ok(Self::parse(&content))
    }

    /// First existing file of [`DEFAULT_ENV_FILES`] in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_ENV_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_simple_pairs_and_skips_comments() {
        let vars = EnvFileParser::parse("# comment\nKEY1=value1\n\nKEY2=value2\n");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["KEY1"], "value1");
        assert_eq!(vars["KEY2"], "value2");
    }

    #[test]
    fn keeps_equals_signs_in_values() {
        let vars = EnvFileParser::parse("URL=https://example.com?a=b&c=d");
        assert_eq!(vars["URL"], "https://example.com?a=b&c=d");
    }

    #[test]
    fn strips_trailing_comment_from_unquoted_value() {
        let vars = EnvFileParser::parse("TENANT_ID=DEMO # default tenant\nEMPTY=");
        assert_eq!(vars["TENANT_ID"], "DEMO");
        assert_eq!(vars["EMPTY"], "");
    }

    #[test]
    fn ignores_malformed_lines() {
        let vars = EnvFileParser::parse("not a pair\n=novalue\nOK=1");
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn discover_prefers_local_file() {
        let temp = TempDir::new().unwrap();
        assert!(EnvFileParser::discover(temp.path()).is_none());

        std::fs::write(temp.path().join(".env.test"), "A=1").unwrap();
        assert_eq!(
            EnvFileParser::discover(temp.path()),
            Some(temp.path().join(".env.test"))
        );

        std::fs::write(temp.path().join(".env.test.local"), "A=2").unwrap();
        assert_eq!(
            EnvFileParser::discover(temp.path()),
            Some(temp.path().join(".env.test.local"))
        );
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let err = EnvFileParser::load(Path::new("/nonexistent/.env.test")).unwrap_err();
        assert!(matches!(err, ReadyCheckError::ConfigNotFound { .. }));
    }
}
