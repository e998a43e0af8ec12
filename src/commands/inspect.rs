// ABOUTME: Read-only commands: get, list, and events.
// ABOUTME: Never mutate lifecycle state.

use storefleet::error::Result;
use storefleet::orchestrator::{LifecycleError, Orchestrator};
use storefleet::output::Output;
use storefleet::repo::StoreQuery;
use storefleet::types::StoreId;

use super::render;

pub async fn get(
    orchestrator: &Orchestrator,
    id: &StoreId,
    with_release: bool,
    output: Output,
) -> Result<()> {
    let details = orchestrator
        .get_store(id)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(format!("store {id}")))?;

    let mut lines = render::store_lines(&details.store, details.latest_job.as_ref());

    if with_release {
        let release = orchestrator.release_status(id).await?;
        let summary = release
            .as_ref()
            .and_then(|r| r.pointer("/info/status"))
            .and_then(|s| s.as_str())
            .unwrap_or("absent");
        lines.push(format!("  release:  {summary}"));

        let value = serde_json::json!({ "store": details, "release": release });
        output.record(&lines, &value);
    } else {
        output.record(&lines, &details);
    }

    Ok(())
}

pub async fn list(orchestrator: &Orchestrator, query: StoreQuery, output: Output) -> Result<()> {
    let page = orchestrator.list_stores(query).await?;
    output.record(&render::page_lines(&page), &page);
    Ok(())
}

pub async fn events(orchestrator: &Orchestrator, id: &StoreId, output: Output) -> Result<()> {
    let events = orchestrator.store_events(id).await?;
    output.record(&render::event_lines(&events), &events);
    Ok(())
}
