//! Create/read/update/delete round trip over each configured resource.
//!
//! Later checks use the id captured by the create check. When create fails
//! they fail with a detail naming the missing id rather than probing.

use crate::checks::{Category, CheckContext, CheckVerdict};
use crate::config::{HarnessConfig, ResourceConfig};
use crate::probe::ProbeRequest;

use super::{expect_any_status, expect_status, find_text};

const ID_POINTERS: &[&str] = &["/data/id", "/id", "/data/_id"];

pub fn category(config: &HarnessConfig) -> Category {
    config
        .resources
        .iter()
        .fold(Category::new("Resources"), |category, resource| {
            add_resource(category, resource)
        })
}

fn add_resource(category: Category, resource: &ResourceConfig) -> Category {
    let name = resource.name.as_str();

    category
        .check(format!("List {}", name), {
            let resource = resource.clone();
            move |ctx| {
                let request = ProbeRequest::get(resource.path.as_str());
                expect_status(&ctx.probe_authed(request), 200)
            }
        })
        .check(format!("Create {}", name), {
            let resource = resource.clone();
            move |ctx| create(ctx, &resource)
        })
        .check(format!("Get {} by ID", name), {
            let resource = resource.clone();
            move |ctx| {
                let path = item_path(ctx, &resource)?;
                expect_status(&ctx.probe_authed(ProbeRequest::get(path)), 200)
            }
        })
        .check(format!("Update {}", name), {
            let resource = resource.clone();
            move |ctx| {
                let path = item_path(ctx, &resource)?;
                let body = ctx.personalize(&resource.update);
                expect_status(&ctx.probe_authed(ProbeRequest::put(path).json(body)), 200)
            }
        })
        .check(format!("Update {} persisted", name), {
            let resource = resource.clone();
            move |ctx| update_persisted(ctx, &resource)
        })
        .check(format!("Delete {}", name), {
            let resource = resource.clone();
            move |ctx| {
                let path = item_path(ctx, &resource)?;
                let outcome = ctx.probe_authed(ProbeRequest::delete(path));
                let verdict = expect_any_status(&outcome, &[200, 204])?;
                ctx.session().forget(&resource.name);
                Ok(verdict)
            }
        })
}

fn create(ctx: &CheckContext, resource: &ResourceConfig) -> anyhow::Result<CheckVerdict> {
    let body = ctx.personalize(&resource.create);
    let outcome = ctx.probe_authed(ProbeRequest::post(resource.path.as_str()).json(body));
    let response = outcome.json()?;

    match find_text(response, ID_POINTERS) {
        Some(id) => {
            let detail = format!("{}; id {}", outcome.detail(), id);
            ctx.session().remember(resource.name.as_str(), id);
            Ok(CheckVerdict::pass(detail))
        }
        None => Ok(CheckVerdict::fail(format!(
            "{}; no id in response",
            outcome.detail()
        ))),
    }
}

fn update_persisted(ctx: &CheckContext, resource: &ResourceConfig) -> anyhow::Result<CheckVerdict> {
    let path = item_path(ctx, resource)?;
    let outcome = ctx.probe_authed(ProbeRequest::get(path));
    let body = outcome.json()?;
    let record = body.get("data").unwrap_or(body);

    let expected = ctx.personalize(&resource.update);
    let mismatched: Vec<&str> = expected
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter(|(key, value)| record.get(key.as_str()) != Some(*value))
                .map(|(key, _)| key.as_str())
                .collect()
        })
        .unwrap_or_default();

    Ok(if mismatched.is_empty() {
        CheckVerdict::pass("updated fields read back")
    } else {
        CheckVerdict::fail(format!("fields not updated: {}", mismatched.join(", ")))
    })
}

fn item_path(ctx: &CheckContext, resource: &ResourceConfig) -> anyhow::Result<String> {
    let id = ctx
        .session()
        .recall(&resource.name)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("no {} id; create did not succeed", resource.name))?;
    Ok(format!("{}/{}", resource.path.trim_end_matches('/'), id))
}
