use ardate_core::{DateTime, FormatRegistry, SharedFormats};
use jiff::tz::{self, TimeZone};
use serde_json::json;

fn sample() -> DateTime {
    DateTime::new("2010-01-02 03:04:05", Some(TimeZone::fixed(tz::offset(-5)))).unwrap()
}

#[test]
fn serializes_as_canonical_string_regardless_of_default() {
    let formats = SharedFormats::new(FormatRegistry::new());
    formats.set_default("short");
    let value = sample().with_formats(formats);

    let encoded = serde_json::to_value(&value).unwrap();
    assert_eq!(encoded, json!("2010-01-02T03:04:05-05:00"));
}

#[test]
fn deserializes_canonical_string_into_unattached_value() {
    let decoded: DateTime = serde_json::from_value(json!("2010-01-02T03:04:05-05:00")).unwrap();

    assert_eq!(decoded.timestamp(), sample().timestamp());
    assert_eq!(decoded.offset(), tz::offset(-5));
    assert!(!decoded.is_attached());
}

#[test]
fn deserialize_rejects_garbage() {
    let result = serde_json::from_value::<DateTime>(json!("yesterday-ish"));
    assert!(result.is_err());
}

#[test]
fn serializes_inside_records() {
    #[derive(serde::Serialize)]
    struct Post {
        title: &'static str,
        published_at: DateTime,
    }

    let post = Post {
        title: "hello",
        published_at: sample(),
    };
    let encoded = serde_json::to_value(&post).unwrap();
    assert_eq!(encoded["published_at"], "2010-01-02T03:04:05-05:00");
}
