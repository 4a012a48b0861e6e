//! Error responses for bad input and unknown routes.

use crate::checks::{Category, CheckVerdict};
use crate::config::HarnessConfig;
use crate::probe::ProbeRequest;
use serde_json::json;

use super::expect_status;

/// Id that should not exist in any dataset.
const MISSING_ID: &str = "99999999";

pub fn category(config: &HarnessConfig) -> Category {
    let category = Category::new("Error Handling").check("Unknown endpoint returns 404", |ctx| {
        let request = ProbeRequest::get("/api/nonexistent").expect_failure();
        expect_status(&ctx.probe(request), 404)
    });

    let Some(resource) = config.resources.first() else {
        return category;
    };
    let collection = resource.path.trim_end_matches('/').to_string();
    let missing = format!("{}/{}", collection, MISSING_ID);

    category
        .check("Invalid payload rejected", move |ctx| {
            if ctx.token().is_none() {
                anyhow::bail!("no session token; login did not succeed");
            }
            let request = ProbeRequest::post(collection.as_str())
                .json(json!({"invalid": "data"}))
                .expect_failure();
            expect_status(&ctx.probe_authed(request), 400)
        })
        .check("Error body has envelope", move |ctx| {
            let outcome = ctx.probe_authed(ProbeRequest::get(missing.as_str()).expect_failure());
            let response = outcome.verify()?;
            let enveloped = response
                .json()
                .and_then(|body| body.as_object())
                .is_some_and(|body| body.contains_key("error") || body.contains_key("success"));
            Ok(CheckVerdict::from_bool(
                enveloped,
                if enveloped {
                    format!("{}; error envelope present", outcome.detail())
                } else {
                    format!("{}; body lacks 'error' or 'success'", outcome.detail())
                },
            ))
        })
}
