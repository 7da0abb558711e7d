//! Attribute value model shared with the ORM layer.
//!
//! # Responsibility
//! - Define the dirty-tracking `DateTime` attribute value.
//! - Define the owner boundary (`DirtyTracker`) and the weak binding to it.
//!
//! # Invariants
//! - Values never keep their owning record alive.
//! - A value reports to at most one (owner, attribute) pair at a time.

pub mod binding;
pub mod datetime;
