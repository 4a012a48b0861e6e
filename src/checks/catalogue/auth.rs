//! Login and token handling.

use crate::checks::{Category, CheckContext, CheckVerdict};
use crate::config::HarnessConfig;
use crate::probe::{ProbeRequest, TENANT_HEADER};
use serde_json::json;

use super::{expect_status, find_text};

/// Credentials tried when none are configured.
const FALLBACK_EMAIL: &str = "test@example.com";
const FALLBACK_PASSWORD: &str = "testpassword";

/// Where login responses carry the token.
const TOKEN_POINTERS: &[&str] = &["/data/token", "/token"];

pub fn category(config: &HarnessConfig) -> Category {
    let login = config.endpoints.login.clone();
    let profile = config.endpoints.profile.clone();
    let configured = config.target.has_credentials();
    let email = config
        .target
        .email
        .clone()
        .unwrap_or_else(|| FALLBACK_EMAIL.to_string());
    let password = config
        .target
        .password
        .clone()
        .unwrap_or_else(|| FALLBACK_PASSWORD.to_string());
    let credentials = json!({"email": email, "password": password});

    Category::new("Authentication")
        .check("Invalid login rejected", {
            let login = login.clone();
            move |ctx| {
                let request = ProbeRequest::post(login.as_str())
                    .json(json!({"email": "wrong@test.com", "password": "wrong"}))
                    .expect_failure();
                expect_status(&ctx.probe(request), 401)
            }
        })
        .check("Login without tenant rejected", {
            let login = login.clone();
            let credentials = credentials.clone();
            move |ctx| {
                let request = ProbeRequest::post(login.as_str())
                    .header(TENANT_HEADER, "")
                    .json(credentials.clone())
                    .expect_failure();
                expect_status(&ctx.probe(request), 400)
            }
        })
        .check("Valid login", move |ctx| {
            valid_login(ctx, &login, &credentials, configured)
        })
        .check("Protected endpoint requires auth", {
            let profile = profile.clone();
            move |ctx| {
                let request = ProbeRequest::get(profile.as_str()).expect_failure();
                expect_status(&ctx.probe(request), 401)
            }
        })
        .check("Authenticated request succeeds", move |ctx| {
            let token = ctx
                .token()
                .ok_or_else(|| anyhow::anyhow!("no session token; login did not succeed"))?;
            expect_status(&ctx.probe(ProbeRequest::get(profile.as_str()).bearer(&token)), 200)
        })
}

fn valid_login(
    ctx: &CheckContext,
    login: &str,
    credentials: &serde_json::Value,
    configured: bool,
) -> anyhow::Result<CheckVerdict> {
    let outcome = ctx.probe(ProbeRequest::post(login).json(credentials.clone()));

    if outcome.status() == Some(401) && !configured {
        return Ok(CheckVerdict::partial(
            "login endpoint answers 401; no test credentials configured",
        ));
    }

    let body = outcome.json()?;
    match find_text(body, TOKEN_POINTERS) {
        Some(token) => {
            ctx.set_token(token);
            Ok(CheckVerdict::pass(format!("{}; token received", outcome.detail())))
        }
        None => Ok(CheckVerdict::fail(format!(
            "{}; no token in response",
            outcome.detail()
        ))),
    }
}
