//! # Formats Module
//!
//! Serialization of memo tables.
//!
//! This module contains:
//! - The portable [`CacheSnapshot`] type
//! - The binary snapshot envelope (header + postcard payload)
//!
//! Note: File I/O stays in the app layer (apps/wicket).
//! This module only handles format conversion (pure transformations).

mod snapshot;

pub use snapshot::*;
