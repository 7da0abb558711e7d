//! Dirty-tracking date/time attribute values for the ORM layer.
//! Every date or datetime column is materialized as a [`DateTime`] that
//! tells its owning record when it has been mutated in place.

pub mod db;
pub mod format;
pub mod logging;
pub mod model;

pub use db::hydrate_attribute;
pub use format::{
    default_format, register_format, resolve_format, set_default_format, FormatRegistry,
    SharedFormats,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::binding::{DirtyBinding, DirtyTracker};
pub use model::datetime::{DateTime, DateTimeError, DateTimeResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
