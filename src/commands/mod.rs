// ABOUTME: Command module aggregator for the swatch CLI.
// ABOUTME: Re-exports deploy, rollback, and status command handlers.

mod deploy;
mod rollback;
mod status;

pub use deploy::{DeployOptions, deploy};
pub use rollback::rollback;
pub use status::status;

use swatch::config::Settings;
use swatch::diagnostics::Diagnostics;
use swatch::orchestrator::Compose;
use swatch::output::{Output, OutputMode};

/// Compose backend for `settings`; build output is shown only in normal mode.
fn compose_for(settings: &Settings, output: &Output) -> Compose {
    Compose::for_settings(settings).inherit_output(output.mode() == OutputMode::Normal)
}

/// Emit collected warnings.
fn emit_warnings(diag: &Diagnostics, output: &Output) {
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
}
