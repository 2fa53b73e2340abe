//! bitsmon - block version signaling monitor
//!
//! Polls a node's tip, keeps a version tally over the trailing signaling
//! window and prints per-version and per-bit shares as blocks arrive.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod ui;

pub use cli::Args;
pub use config::Config;
pub use daemon::{Daemon, TickOutcome};
pub use error::{MonitorError, Result};
