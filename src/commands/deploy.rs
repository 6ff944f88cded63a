// ABOUTME: Deploy command implementation.
// ABOUTME: Staging rebuilds in place; production deploys the inactive color and switches.

use super::{compose_for, emit_warnings};
use swatch::config::Settings;
use swatch::deploy::{
    AutoApprove, ConfirmRequest, ConfirmationPolicy, DeployError, DeploymentController,
    ProductionOutcome, TerminalPrompt,
};
use swatch::diagnostics::{Diagnostics, Warning};
use swatch::error::Result;
use swatch::output::Output;
use swatch::types::Environment;

/// Flags that shape a deployment.
#[derive(Debug, Default)]
pub struct DeployOptions {
    pub color: Option<String>,
    pub yes: bool,
    pub force: bool,
}

/// Unattended approval that still announces interruptions of live traffic.
struct Announced<'o> {
    output: &'o Output,
}

impl ConfirmationPolicy for Announced<'_> {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        if request.interrupts_traffic() {
            self.output
                .warning(&format!("--yes given; {}", request.describe()));
        }
        AutoApprove.confirm(request)
    }
}

/// Deploy the selected environment.
pub async fn deploy(settings: Settings, options: DeployOptions, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let orchestrator = compose_for(&settings, &output);
    let controller = DeploymentController::new(settings, &orchestrator).force_unlock(options.force);

    match controller.settings().environment {
        Environment::Staging => {
            if options.color.is_some() {
                return Err(DeployError::validation(
                    "--color is only valid for the prod environment",
                )
                .into());
            }

            output.progress("Deploying staging...");
            let report = controller.deploy_staging().await?;
            diag.reconcile(&report);
            output.report(&report);
            emit_warnings(&diag, &output);
            output.success("Staging deployment complete!");
        }
        Environment::Production => {
            let mut policy: Box<dyn ConfirmationPolicy + '_> = if options.yes {
                Box::new(Announced { output: &output })
            } else {
                Box::new(TerminalPrompt::stdio())
            };

            output.progress("Deploying production...");
            let outcome = controller
                .deploy_production(options.color.as_deref(), policy.as_mut())
                .await?;
            diag.absorb(controller.take_warnings());

            match outcome {
                ProductionOutcome::Switched { record, previous } => {
                    output.progress(&format!("  → Traffic moved from {previous}"));
                    emit_warnings(&diag, &output);
                    output.success(&format!(
                        "Production now serving {} (revision {})",
                        record.color, record.revision
                    ));
                }
                ProductionOutcome::Declined { target, active } => {
                    diag.warn(Warning::unswitched(format!(
                        "{target} is deployed and healthy but {active} still receives traffic"
                    )));
                    emit_warnings(&diag, &output);
                    if let Some(command) = outcome.manual_switch_command() {
                        output.success(&format!(
                            "Traffic not switched; run `{command}` to switch to {target}"
                        ));
                    }
                }
                ProductionOutcome::Aborted { target } => {
                    emit_warnings(&diag, &output);
                    output.success(&format!("Redeploy of active color {target} aborted"));
                }
            }
        }
    }

    Ok(())
}
