// ABOUTME: Status command implementation.
// ABOUTME: Prints persisted state and running services without changing anything.

use super::{compose_for, emit_warnings};
use swatch::config::Settings;
use swatch::deploy::DeploymentController;
use swatch::diagnostics::Diagnostics;
use swatch::error::Result;
use swatch::output::Output;

/// Show the environment's status.
pub async fn status(settings: Settings, output: Output) -> Result<()> {
    let mut diag = Diagnostics::default();

    let orchestrator = compose_for(&settings, &output);
    let controller = DeploymentController::new(settings, &orchestrator);

    let report = controller.status().await?;
    diag.reconcile(&report);

    output.report(&report);
    emit_warnings(&diag, &output);
    Ok(())
}
