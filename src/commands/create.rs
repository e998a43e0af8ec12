// ABOUTME: Create command implementation.
// ABOUTME: Validates the request, records the store, and waits for provisioning to settle.

use storefleet::error::{Error, Result};
use storefleet::orchestrator::{CreateStoreRequest, LifecycleError, Orchestrator};
use storefleet::output::Output;
use storefleet::types::{StoreEngine, StoreName, StorePlan};

use super::render;

pub struct CreateArgs {
    pub name: String,
    pub engine: StoreEngine,
    pub plan: StorePlan,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub actor: Option<String>,
}

pub async fn create(orchestrator: &Orchestrator, args: CreateArgs, mut output: Output) -> Result<()> {
    // Reject malformed names before anything else happens
    let name = StoreName::new(&args.name).map_err(LifecycleError::from)?;

    output.start_timer();
    let actor = args.actor.unwrap_or_else(default_actor);

    let request = CreateStoreRequest {
        name: name.to_string(),
        display_name: args.display_name,
        description: args.description,
        engine: args.engine,
        plan: args.plan,
    };
    let store = orchestrator.create(request, Some(&actor)).await?;

    output.progress(&format!("Accepted store {} ({})", store.name, store.id));
    output.progress("  → Provisioning...");

    let outcome = orchestrator
        .wait_idle()
        .await
        .into_iter()
        .find(|o| o.store_id == store.id);

    let details = orchestrator.get_store(&store.id).await?;
    if let Some(details) = &details {
        let lines = render::store_lines(&details.store, details.latest_job.as_ref());
        output.record(&lines, details);
    }

    match outcome.map(|o| o.result) {
        Some(Err(e)) => Err(Error::Lifecycle(e)),
        Some(Ok(running)) => {
            output.success(&format!("Store {} is running", running.name));
            Ok(())
        }
        None => {
            output.warning("provisioning task did not report an outcome");
            Ok(())
        }
    }
}

fn default_actor() -> String {
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    let host = gethostname::gethostname();
    format!("{user}@{}", host.to_string_lossy())
}
