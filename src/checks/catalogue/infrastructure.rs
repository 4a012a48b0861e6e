//! Reachability of the service.

use crate::checks::{Category, CheckVerdict};
use crate::config::HarnessConfig;
use crate::probe::ProbeRequest;

use super::expect_status;

pub fn category(config: &HarnessConfig) -> Category {
    let health = config.endpoints.health.clone();
    let https = config.target.base_url.starts_with("https://");

    Category::new("Infrastructure")
        .check("Service reachable", |ctx| {
            let outcome = ctx.probe(ProbeRequest::get("/"));
            outcome.verify()?;
            Ok(CheckVerdict::from(&outcome))
        })
        .check("API health", move |ctx| {
            expect_status(&ctx.probe(ProbeRequest::get(health.as_str())), 200)
        })
        .check("HTTPS enforced", move |_| {
            Ok(if https {
                CheckVerdict::pass("base URL uses HTTPS")
            } else {
                CheckVerdict::fail("base URL is not HTTPS")
            })
        })
}
