//! SQLite storage boundary for date/time attributes.
//!
//! # Responsibility
//! - Encode `DateTime` values into SQLite column values and back.
//! - Offer a hydration helper that binds the decoded value to its owner.
//!
//! # Invariants
//! - Values are written with the `db` registry entry, in the system zone,
//!   which is also the zone TEXT columns are read back in.
//! - Decoded values start unattached unless hydrated through
//!   [`hydrate_attribute`].
//!
//! Persistence policy (which columns, when to write) belongs to the caller.

mod sql_value;

pub use sql_value::{hydrate_attribute, STORAGE_FORMAT_KEY};
