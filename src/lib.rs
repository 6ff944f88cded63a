// ABOUTME: Library root for swatch - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod orchestrator;
pub mod output;
pub mod pointer;
pub mod router;
pub mod state;
pub mod types;
