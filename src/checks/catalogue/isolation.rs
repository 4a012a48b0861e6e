//! Tenant boundary enforcement.

use crate::checks::Category;
use crate::config::HarnessConfig;
use crate::probe::{ProbeRequest, TENANT_HEADER};

use super::expect_any_status;

/// Tenant identifier that no deployment should accept.
pub const FOREIGN_TENANT: &str = "INVALID_TENANT";

pub fn category(config: &HarnessConfig) -> Category {
    let tenant_path = format!("/api/tenants/{}", config.target.tenant_id);
    let guarded = config
        .resources
        .first()
        .map(|r| r.path.clone())
        .unwrap_or_else(|| config.endpoints.profile.clone());

    Category::new("Tenant Isolation")
        .check("Current tenant readable", move |ctx| {
            let outcome = ctx.probe_authed(ProbeRequest::get(tenant_path.as_str()));
            expect_any_status(&outcome, &[200, 403])
        })
        .check("Foreign tenant rejected", move |ctx| {
            let request = ProbeRequest::get(guarded.as_str())
                .header(TENANT_HEADER, FOREIGN_TENANT)
                .expect_failure();
            expect_any_status(&ctx.probe_authed(request), &[400, 401, 403])
        })
}
