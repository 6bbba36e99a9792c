//! # Wicket Library
//!
//! This library exposes the Wicket CLI modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod logging;

// Re-export wicket_core for convenience
pub use wicket_core;
