// ABOUTME: Confirmation policies gating risky deployment steps.
// ABOUTME: Interactive terminal prompts and fixed policies for unattended runs.

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::types::Color;

/// A decision the operator has to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmRequest {
    /// Deploying over the color that currently serves traffic.
    RedeployActive { color: Color },
    /// Moving traffic to a freshly verified color.
    SwitchTraffic { from: Color, to: Color },
}

impl ConfirmRequest {
    /// Whether approving the request takes down the color serving traffic.
    pub fn interrupts_traffic(&self) -> bool {
        matches!(self, ConfirmRequest::RedeployActive { .. })
    }

    /// The step being approved, without the question.
    pub fn describe(&self) -> String {
        match self {
            ConfirmRequest::RedeployActive { color } => {
                format!("{color} is the active color; redeploying it interrupts live traffic")
            }
            ConfirmRequest::SwitchTraffic { from, to } => {
                format!("{to} is healthy; traffic moves from {from} to {to}")
            }
        }
    }
}

impl fmt::Display for ConfirmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmRequest::RedeployActive { .. } => write!(f, "{}. Continue?", self.describe()),
            ConfirmRequest::SwitchTraffic { from, to } => {
                write!(f, "{to} is healthy. Switch traffic from {from} to {to}?")
            }
        }
    }
}

/// Decides whether a gated step may proceed.
pub trait ConfirmationPolicy {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}

/// Approves every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ConfirmationPolicy for AutoApprove {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        tracing::info!("Auto-approved: {}", request);
        true
    }
}

/// Declines every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl ConfirmationPolicy for Decline {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        tracing::info!("Declined: {}", request);
        false
    }
}

/// Asks on a terminal and waits for `y`/`yes`. End of input declines.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmationPolicy for TerminalPrompt<R, W> {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        if write!(self.output, "{request} [y/N] ")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}
