//! Friendly-name format registry and its shared handle.
//!
//! # Responsibility
//! - Map friendly format names (`db`, `short`, `rfc2822`, ...) to engine
//!   strftime patterns.
//! - Hold the default format key consulted when no format is requested.
//!
//! # Invariants
//! - Resolution never fails: unknown names pass through as raw patterns.
//! - Every `DateTime` sharing a handle observes registry changes immediately.

use log::debug;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default format key installed at initialization.
pub const DEFAULT_FORMAT_KEY: &str = "rfc2822";

/// ISO 8601 with a numeric `+HH:MM` offset, used for interchange.
pub const CANONICAL_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Built-in friendly names and their engine patterns.
pub const BUILTIN_FORMATS: &[(&str, &str)] = &[
    ("db", "%Y-%m-%d %H:%M:%S"),
    ("number", "%Y%m%d%H%M%S"),
    ("time", "%H:%M"),
    ("short", "%d %b %H:%M"),
    ("long", "%B %d, %Y %H:%M"),
    ("atom", CANONICAL_PATTERN),
    ("cookie", "%A, %d-%b-%Y %H:%M:%S %Z"),
    ("iso8601", "%Y-%m-%dT%H:%M:%S%z"),
    ("rfc822", "%a, %d %b %y %H:%M:%S %z"),
    ("rfc850", "%A, %d-%b-%y %H:%M:%S %Z"),
    ("rfc1036", "%a, %d %b %y %H:%M:%S %z"),
    ("rfc1123", "%a, %d %b %Y %H:%M:%S %z"),
    ("rfc2822", "%a, %d %b %Y %H:%M:%S %z"),
    ("rfc3339", CANONICAL_PATTERN),
    ("rss", "%a, %d %b %Y %H:%M:%S %z"),
    ("w3c", CANONICAL_PATTERN),
];

static GLOBAL_FORMATS: Lazy<SharedFormats> = Lazy::new(SharedFormats::default);

/// Mapping from friendly format name to engine pattern, plus the default key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRegistry {
    formats: BTreeMap<String, String>,
    default_format: String,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Creates a registry holding the built-in formats and `rfc2822` as default.
    pub fn new() -> Self {
        let formats = BUILTIN_FORMATS
            .iter()
            .map(|(name, pattern)| ((*name).to_string(), (*pattern).to_string()))
            .collect();
        Self {
            formats,
            default_format: DEFAULT_FORMAT_KEY.to_string(),
        }
    }

    /// Resolves a friendly name or raw pattern into an engine pattern.
    ///
    /// `None` or an empty string resolves the current default key. A known
    /// key returns its pattern, anything else is returned unchanged.
    pub fn resolve(&self, name_or_pattern: Option<&str>) -> String {
        let requested = match name_or_pattern {
            Some(value) if !value.is_empty() => value,
            _ => self.default_format.as_str(),
        };
        match self.formats.get(requested) {
            Some(pattern) => pattern.clone(),
            None => requested.to_string(),
        }
    }

    /// Registers or overrides one friendly name.
    ///
    /// Returns the pattern previously stored under `name`, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Option<String> {
        let name = name.into();
        let pattern = pattern.into();
        debug!("event=format_register module=format name={name} pattern={pattern}");
        self.formats.insert(name, pattern)
    }

    /// Removes one friendly name. Built-ins may be removed too.
    pub fn unregister(&mut self, name: &str) -> Option<String> {
        self.formats.remove(name)
    }

    /// Sets the default key (or raw pattern) used when no format is given.
    pub fn set_default(&mut self, name_or_pattern: impl Into<String>) {
        let value = name_or_pattern.into();
        debug!("event=format_default module=format value={value}");
        self.default_format = value;
    }

    pub fn default_format(&self) -> &str {
        &self.default_format
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.formats.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Returns registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.formats.keys().cloned().collect()
    }

    /// Restores built-in formats and the default key.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Shared handle to a [`FormatRegistry`].
///
/// `SharedFormats::global()` is the process-wide registry every `DateTime`
/// uses unless constructed with an isolated handle. Cloning the handle shares
/// the same registry.
#[derive(Debug, Clone, Default)]
pub struct SharedFormats {
    inner: Arc<RwLock<FormatRegistry>>,
}

impl SharedFormats {
    /// Wraps a registry in a new, isolated handle.
    pub fn new(registry: FormatRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Returns the process-wide handle.
    pub fn global() -> SharedFormats {
        GLOBAL_FORMATS.clone()
    }

    /// Whether both handles point at the same registry.
    pub fn ptr_eq(&self, other: &SharedFormats) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, FormatRegistry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, FormatRegistry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn resolve(&self, name_or_pattern: Option<&str>) -> String {
        self.read().resolve(name_or_pattern)
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Option<String> {
        self.write().register(name, pattern)
    }

    pub fn set_default(&self, name_or_pattern: impl Into<String>) {
        self.write().set_default(name_or_pattern);
    }

    pub fn default_format(&self) -> String {
        self.read().default_format().to_string()
    }
}
