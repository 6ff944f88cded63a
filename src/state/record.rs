// ABOUTME: On-disk format of the active-color record.
// ABOUTME: First line is the bare color, an optional second line carries the revision.

use crate::types::Color;
use serde::Serialize;

const REVISION_PREFIX: &str = "revision=";

/// The persisted active color and how many switches produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateRecord {
    pub color: Color,
    pub revision: u64,
}

impl Default for StateRecord {
    fn default() -> Self {
        StateRecord {
            color: Color::Blue,
            revision: 0,
        }
    }
}

impl StateRecord {
    /// The record following this one with `color` active.
    pub fn next(&self, color: Color) -> StateRecord {
        StateRecord {
            color,
            revision: self.revision + 1,
        }
    }

    /// Parse file content. Returns `None` when the color line is not recognised.
    pub fn parse(content: &str) -> Option<StateRecord> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        let color = lines.next()?.parse().ok()?;
        let revision = lines
            .next()
            .and_then(|line| line.strip_prefix(REVISION_PREFIX))
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(0);
        Some(StateRecord { color, revision })
    }

    pub fn render(&self) -> String {
        format!("{}\n{}{}\n", self.color, REVISION_PREFIX, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_color_has_revision_zero() {
        assert_eq!(
            StateRecord::parse("green\n"),
            Some(StateRecord {
                color: Color::Green,
                revision: 0
            })
        );
    }

    #[test]
    fn parses_rendered_record() {
        let record = StateRecord {
            color: Color::Green,
            revision: 7,
        };
        assert_eq!(record.render(), "green\nrevision=7\n");
        assert_eq!(StateRecord::parse(&record.render()), Some(record));
    }

    #[test]
    fn unknown_color_is_rejected() {
        assert_eq!(StateRecord::parse("purple\nrevision=2\n"), None);
        assert_eq!(StateRecord::parse(""), None);
    }

    #[test]
    fn next_bumps_revision() {
        let next = StateRecord::default().next(Color::Green);
        assert_eq!(next.color, Color::Green);
        assert_eq!(next.revision, 1);
    }
}
