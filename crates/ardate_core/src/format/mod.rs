//! Friendly format names and the process-wide registry.
//!
//! # Responsibility
//! - Own the name → pattern mapping used by `DateTime::format`.
//! - Expose process-wide helpers over the global registry.
//!
//! # Invariants
//! - Patterns are `jiff` strftime patterns; validity is decided only when
//!   a value is actually formatted.
//! - Mutations through the helpers below are visible to every `DateTime`
//!   built on the global registry, including existing instances.

pub mod registry;

pub use registry::{
    FormatRegistry, SharedFormats, BUILTIN_FORMATS, CANONICAL_PATTERN, DEFAULT_FORMAT_KEY,
};

/// Resolves a name or raw pattern against the global registry.
pub fn resolve_format(name_or_pattern: Option<&str>) -> String {
    SharedFormats::global().resolve(name_or_pattern)
}

/// Registers or overrides one global friendly name.
pub fn register_format(name: impl Into<String>, pattern: impl Into<String>) -> Option<String> {
    SharedFormats::global().register(name, pattern)
}

/// Sets the global default format key (or raw pattern).
pub fn set_default_format(name_or_pattern: impl Into<String>) {
    SharedFormats::global().set_default(name_or_pattern);
}

/// Returns the global default format key.
pub fn default_format() -> String {
    SharedFormats::global().default_format()
}
