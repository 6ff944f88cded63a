// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a command but should be shown to users.

use crate::deploy::StatusReport;

/// Collects non-fatal warnings during deployment operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Record every mismatch a status report found.
    pub fn reconcile(&mut self, report: &StatusReport) {
        for message in &report.warnings {
            self.warn(Warning::reconciliation(message.clone()));
        }
    }

    /// Record warnings raised by a lower layer.
    pub fn absorb(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.warn(warning);
        }
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a warning about persisted state disagreeing with running services.
    pub fn reconciliation(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Reconciliation,
            message: message.into(),
        }
    }

    /// Create a warning about a deployed color left without traffic.
    pub fn unswitched(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Unswitched,
            message: message.into(),
        }
    }

    /// Create a warning about a state lock that could not be removed.
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            message: message.into(),
        }
    }

    /// Create a warning about a status listing that failed after a successful change.
    pub fn status_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StatusUnavailable,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Persisted active color and running services disagree.
    Reconciliation,
    /// A verified color was deployed but traffic was not switched to it.
    Unswitched,
    /// The state lock file was left behind.
    LockRelease,
    /// A change succeeded but the follow-up status listing did not.
    StatusUnavailable,
}
