//! Secret name and token patterns.

use regex::Regex;
use std::sync::LazyLock;

/// Patterns for environment variable names that hold secrets.
///
/// Each tuple contains (name, regex_pattern).
pub const SECRET_KEY_PATTERNS: &[(&str, &str)] = &[
    ("api_key", r"(?i)^.*_?(API_?KEY|APIKEY)$"),
    ("secret", r"(?i)^.*_?(SECRET|SECRET_KEY)$"),
    ("token", r"(?i)^.*_?(TOKEN|ACCESS_TOKEN|AUTH_TOKEN)$"),
    ("password", r"(?i)^.*_?(PASSWORD|PASSWD|PWD)$"),
    ("private_key", r"(?i)^.*_?PRIVATE_KEY$"),
    ("connection_string", r"(?i)^.*(CONNECTION_STRING|DATABASE_URL)$"),
];

static SECRET_KEYS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SECRET_KEY_PATTERNS
        .iter()
        .map(|(_, pattern)| Regex::new(pattern).unwrap())
        .collect()
});

/// `Bearer <token>` in headers or free text.
pub(crate) static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(bearer\s+)[A-Za-z0-9\-._~+/]+=*").unwrap());

/// Credential-bearing JSON string fields, e.g. `"token": "..."`.
pub(crate) static JSON_SECRET_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)("(?:token|access_token|refresh_token|password)"\s*:\s*")[^"]*(")"#).unwrap()
});

/// Whether an environment variable name looks like it holds a secret.
///
/// # Example
///
/// ```
/// use readycheck::secrets::is_secret_key;
///
/// assert!(is_secret_key("TEST_PASSWORD"));
/// assert!(is_secret_key("JWT_SECRET"));
/// assert!(!is_secret_key("API_BASE_URL"));
/// ```
pub fn is_secret_key(name: &str) -> bool {
    SECRET_KEYS.iter().any(|p| p.is_match(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_secret_names() {
        for name in ["API_KEY", "GITHUB_TOKEN", "DB_PASSWORD", "TEST_PASSWORD", "DATABASE_URL"] {
            assert!(is_secret_key(name), "{}", name);
        }
    }

    #[test]
    fn ignores_harness_settings() {
        for name in ["API_BASE_URL", "TENANT_ID", "TEST_EMAIL", "REQUEST_TIMEOUT_SECS", "PORT"] {
            assert!(!is_secret_key(name), "{}", name);
        }
    }

    #[test]
    fn bearer_pattern_matches_token_only() {
        let replaced = BEARER.replace_all("Authorization: Bearer abc.def-ghi", "${1}X");
        assert_eq!(replaced, "Authorization: Bearer X");
    }
}
