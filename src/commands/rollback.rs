// ABOUTME: Rollback command implementation.
// ABOUTME: Switches production traffic back to the inactive color without rebuilding.

use super::{compose_for, emit_warnings};
use swatch::config::Settings;
use swatch::deploy::DeploymentController;
use swatch::diagnostics::{Diagnostics, Warning};
use swatch::error::Result;
use swatch::output::Output;

/// Roll production back to the inactive color.
pub async fn rollback(settings: Settings, force: bool, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let orchestrator = compose_for(&settings, &output);
    let controller = DeploymentController::new(settings, &orchestrator).force_unlock(force);

    let active = controller.store().get_active();
    output.progress(&format!(
        "Rolling back from {} to {}...",
        active,
        active.complement()
    ));

    let record = controller.rollback().await?;
    diag.absorb(controller.take_warnings());

    // Traffic has moved; a failed listing must not look like a failed rollback.
    match controller.status().await {
        Ok(report) => diag.reconcile(&report),
        Err(e) => diag.warn(Warning::status_unavailable(format!(
            "rollback complete but status listing failed: {e}"
        ))),
    }
    emit_warnings(&diag, &output);

    output.success(&format!(
        "Rollback complete! {} is active (revision {})",
        record.color, record.revision
    ));
    Ok(())
}
