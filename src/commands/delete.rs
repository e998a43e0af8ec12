// ABOUTME: Delete command implementation.
// ABOUTME: Accepts the deletion and waits for teardown to settle.

use storefleet::error::{Error, Result};
use storefleet::orchestrator::Orchestrator;
use storefleet::output::Output;
use storefleet::types::StoreId;

use super::render;

pub async fn delete(orchestrator: &Orchestrator, id: &StoreId, mut output: Output) -> Result<()> {
    output.start_timer();
    orchestrator.delete(id).await?;
    output.progress(&format!("Deleting store {id}..."));

    let outcome = orchestrator
        .wait_idle()
        .await
        .into_iter()
        .find(|o| &o.store_id == id);

    if let Some(details) = orchestrator.get_store(id).await? {
        let lines = render::store_lines(&details.store, details.latest_job.as_ref());
        output.record(&lines, &details);
    }

    match outcome.map(|o| o.result) {
        Some(Err(e)) => Err(Error::Lifecycle(e)),
        _ => {
            output.success(&format!("Store {id} deleted"));
            Ok(())
        }
    }
}
