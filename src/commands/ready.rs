// ABOUTME: Operational commands: readiness check and restart reconciliation.
// ABOUTME: `ready` fails when either the driver or the state file is unusable.

use chrono::Utc;
use storefleet::error::{Error, Result};
use storefleet::orchestrator::Orchestrator;
use storefleet::output::Output;

pub async fn ready(orchestrator: &Orchestrator, output: Output) -> Result<()> {
    let report = orchestrator.readiness().await;
    let status = |ok: bool| if ok { "ok" } else { "unavailable" };
    let lines = vec![
        format!("driver:  {}", status(report.driver)),
        format!("storage: {}", status(report.storage)),
    ];
    output.record(&lines, &report);

    if report.is_ready() {
        Ok(())
    } else {
        let mut failing = Vec::new();
        if !report.driver {
            failing.push("driver");
        }
        if !report.storage {
            failing.push("storage");
        }
        Err(Error::NotReady(failing.join(", ")))
    }
}

pub async fn reconcile(orchestrator: &Orchestrator, mut output: Output) -> Result<()> {
    output.start_timer();
    let report = orchestrator.reconcile(Utc::now()).await?;

    if !report.resumed.is_empty() {
        output.progress(&format!(
            "  → Resumed {} pending provisioning job(s)",
            report.resumed.len()
        ));
        for outcome in orchestrator.wait_idle().await {
            if let Err(e) = outcome.result {
                output.warning(&format!("store {}: {e}", outcome.store_id));
            }
        }
    }

    let lines = vec![format!(
        "Reconciled: {} completed, {} failed, {} resumed, {} skipped",
        report.completed.len(),
        report.failed.len(),
        report.resumed.len(),
        report.skipped.len()
    )];
    output.record(&lines, &report);
    Ok(())
}
