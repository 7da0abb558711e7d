//! Touches the process-wide registry; kept to a single test so nothing else
//! in this binary observes the mutations.

use ardate_core::format::DEFAULT_FORMAT_KEY;
use ardate_core::{
    default_format, register_format, resolve_format, set_default_format, DateTime, SharedFormats,
};
use jiff::tz::{self, TimeZone};

#[test]
fn global_registry_changes_are_process_wide() {
    let zone = TimeZone::fixed(tz::offset(-5));
    let existing = DateTime::new("2010-01-02 03:04:05", Some(zone.clone())).unwrap();
    assert!(existing.formats().ptr_eq(&SharedFormats::global()));
    assert_eq!(default_format(), DEFAULT_FORMAT_KEY);

    set_default_format("short");
    let created_later = DateTime::new("2010-01-02 03:04:05", Some(zone)).unwrap();
    assert_eq!(existing.to_string(), "02 Jan 03:04");
    assert_eq!(created_later.format(None).unwrap(), "02 Jan 03:04");

    assert_eq!(register_format("stamp", "%Y%m%d"), None);
    assert_eq!(resolve_format(Some("stamp")), "%Y%m%d");
    assert_eq!(existing.format(Some("stamp")).unwrap(), "20100102");
    assert_eq!(resolve_format(Some("unregistered")), "unregistered");

    SharedFormats::global().write().reset();
    assert_eq!(default_format(), DEFAULT_FORMAT_KEY);
    assert_eq!(existing.to_string(), "Sat, 02 Jan 2010 03:04:05 -0500");
}
