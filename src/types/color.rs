// ABOUTME: Deployment slot colors for blue-green switching.
// ABOUTME: Parsing is case-insensitive, display is canonical lowercase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the two parallel runtime slots of a production service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Active when nothing has been persisted yet.
    #[default]
    Blue,
    Green,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color '{0}' (expected blue or green)")]
pub struct ParseColorError(pub String);

impl Color {
    pub const ALL: [Color; 2] = [Color::Blue, Color::Green];

    /// The other slot.
    pub fn complement(self) -> Color {
        match self {
            Color::Blue => Color::Green,
            Color::Green => Color::Blue,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Green => "green",
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" => Ok(Color::Blue),
            "green" => Ok(Color::Green),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
