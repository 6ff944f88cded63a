// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports the controller, rollout states, switch tokens, and confirmation policies.

mod confirm;
mod controller;
mod error;
mod rollout;
mod state;
mod status;
mod switch;
mod transitions;

pub use confirm::{AutoApprove, ConfirmRequest, ConfirmationPolicy, Decline, TerminalPrompt};
pub use controller::{DeploymentController, MANUAL_SWITCH_COMMAND, ProductionOutcome};
pub use error::{DeployError, DeployErrorKind};
pub use rollout::Rollout;
pub use state::{Built, Done, Idle, Phase, Prepared, RolloutState, Started, Verified};
pub use status::{ServiceState, SlotRole, SlotStatus, StatusReport};
pub use switch::PendingSwitch;
