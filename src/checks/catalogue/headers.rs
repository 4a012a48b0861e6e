//! Security response headers on the root document.

use crate::checks::{Category, CheckVerdict};
use crate::probe::ProbeRequest;

/// Headers every production deployment should send.
pub const SECURITY_HEADERS: &[&str] = &[
    "Strict-Transport-Security",
    "Content-Security-Policy",
    "X-Frame-Options",
    "X-Content-Type-Options",
    "X-XSS-Protection",
    "Referrer-Policy",
];

pub fn category() -> Category {
    SECURITY_HEADERS
        .iter()
        .fold(Category::new("Security Headers").parallel(), |category, &name| {
            category.check(format!("{} present", name), move |ctx| {
                let outcome = ctx.probe(ProbeRequest::get("/"));
                let response = outcome
                    .response()
                    .ok_or_else(|| anyhow::anyhow!(outcome.detail()))?;
                Ok(match response.header(name) {
                    Some(value) => CheckVerdict::pass(format!("{}: {}", name, value)),
                    None => CheckVerdict::fail(format!("{} header missing", name)),
                })
            })
        })
}
