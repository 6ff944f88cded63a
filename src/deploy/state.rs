// ABOUTME: Rollout state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid phase ordering at compile time.

use serde::Serialize;
use std::fmt;

/// Named phases of a deployment, used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Preparing,
    Building,
    Deploying,
    HealthChecking,
    AwaitingConfirmation,
    Switching,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Preparing => "preparing",
            Phase::Building => "building",
            Phase::Deploying => "deploying",
            Phase::HealthChecking => "health checking",
            Phase::AwaitingConfirmation => "awaiting confirmation",
            Phase::Switching => "switching",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Links a marker type to the phase it represents.
pub trait RolloutState {
    const PHASE: Phase;
}

/// Nothing done yet.
/// Available actions: `prepare()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// Pointer file written.
/// Available actions: `build()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Prepared;

/// Images built for the target slot.
/// Available actions: `start()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Built;

/// Target slot containers replaced and started.
/// Available actions: `verify()`, `settle()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Started;

/// Health gate passed; waiting for confirmation.
/// Available actions: `plan()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Verified;

/// Single-slot deployment finished.
#[derive(Debug, Clone, Copy, Default)]
pub struct Done;

impl RolloutState for Idle {
    const PHASE: Phase = Phase::Idle;
}

impl RolloutState for Prepared {
    const PHASE: Phase = Phase::Preparing;
}

impl RolloutState for Built {
    const PHASE: Phase = Phase::Building;
}

impl RolloutState for Started {
    const PHASE: Phase = Phase::Deploying;
}

impl RolloutState for Verified {
    const PHASE: Phase = Phase::AwaitingConfirmation;
}

impl RolloutState for Done {
    const PHASE: Phase = Phase::Done;
}
