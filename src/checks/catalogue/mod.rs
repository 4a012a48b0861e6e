//! Built-in checks.
//!
//! Each submodule builds one category from the resolved configuration. The
//! runner treats these exactly like user-built categories.

pub mod auth;
pub mod errors;
pub mod headers;
pub mod infrastructure;
pub mod isolation;
pub mod performance;
pub mod resources;
pub mod suites;

use crate::config::HarnessConfig;
use crate::probe::ProbeOutcome;
use serde_json::Value;

use super::model::{Category, CheckVerdict};

/// All built-in categories, in run order.
///
/// The suites category is only present when suites are configured.
pub fn builtin_catalogue(config: &HarnessConfig) -> Vec<Category> {
    let mut categories = vec![
        infrastructure::category(config),
        headers::category(),
        auth::category(config),
        resources::category(config),
        isolation::category(config),
        errors::category(config),
        performance::category(config),
    ];
    if !config.suites.is_empty() {
        categories.push(suites::category(config));
    }
    categories
}

/// PASS when the response status is exactly `code`.
pub(crate) fn expect_status(outcome: &ProbeOutcome, code: u16) -> anyhow::Result<CheckVerdict> {
    outcome.expect_status(code)?;
    Ok(CheckVerdict::pass(outcome.detail()))
}

/// PASS when the response status is one of `codes`.
pub(crate) fn expect_any_status(
    outcome: &ProbeOutcome,
    codes: &[u16],
) -> anyhow::Result<CheckVerdict> {
    let response = outcome
        .response()
        .ok_or_else(|| anyhow::anyhow!(outcome.detail()))?;
    Ok(CheckVerdict::from_bool(
        codes.contains(&response.status),
        format!("{} (accepted: {})", outcome.detail(), join_codes(codes)),
    ))
}

/// First string or number found at any of `pointers`, as text.
pub(crate) fn find_text(body: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| body.pointer(p))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn join_codes(codes: &[u16]) -> String {
    codes
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use serde_json::json;

    #[test]
    fn catalogue_order_and_suites() {
        let mut config = HarnessConfig::default();
        let names: Vec<String> = builtin_catalogue(&config)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "Infrastructure",
                "Security Headers",
                "Authentication",
                "Resources",
                "Tenant Isolation",
                "Error Handling",
                "Performance",
            ]
        );

        config.suites.push(SuiteConfig {
            name: "unit".to_string(),
            command: "true".to_string(),
            cwd: None,
            timeout_secs: None,
        });
        let last = builtin_catalogue(&config).pop().unwrap();
        assert_eq!(last.name, "Test Suites");
    }

    #[test]
    fn find_text_accepts_strings_and_numbers() {
        let body = json!({"data": {"id": 17, "token": ""}, "token": "abc"});
        assert_eq!(find_text(&body, &["/data/id"]), Some("17".to_string()));
        assert_eq!(
            find_text(&body, &["/data/token", "/token"]),
            Some("abc".to_string())
        );
        assert_eq!(find_text(&body, &["/missing"]), None);
    }
}
