use ardate_core::{hydrate_attribute, DateTime, DirtyTracker};
use jiff::tz::{self, TimeZone};
use jiff::Span;
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Record {
    dirty: RefCell<Vec<String>>,
}

impl DirtyTracker for Record {
    fn flag_dirty(&self, attribute: &str) {
        self.dirty.borrow_mut().push(attribute.to_string());
    }
}

fn open_posts() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE posts (
            id INTEGER PRIMARY KEY,
            published_at TEXT,
            edited_at
        );",
    )
    .unwrap();
    conn
}

#[test]
fn writes_db_format_text() {
    let conn = open_posts();
    let value =
        DateTime::new("2010-01-02 03:04:05", Some(TimeZone::fixed(tz::offset(-5)))).unwrap();

    conn.execute(
        "INSERT INTO posts (id, published_at) VALUES (1, ?1);",
        params![value],
    )
    .unwrap();

    let stored: String = conn
        .query_row("SELECT published_at FROM posts WHERE id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    let expected = value
        .as_zoned()
        .with_time_zone(TimeZone::system())
        .strftime("%Y-%m-%d %H:%M:%S")
        .to_string();
    assert_eq!(stored, expected);
}

#[test]
fn stored_value_reads_back_as_same_instant() {
    let conn = open_posts();
    let value =
        DateTime::new("2010-01-02 03:04:05", Some(TimeZone::fixed(tz::offset(13)))).unwrap();

    conn.execute(
        "INSERT INTO posts (id, published_at) VALUES (1, ?1);",
        params![value],
    )
    .unwrap();

    let restored: DateTime = conn
        .query_row("SELECT published_at FROM posts WHERE id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(restored.timestamp(), value.timestamp());
    assert_eq!(restored.unix_seconds(), 1_262_354_645);
}

#[test]
fn hydrated_value_reports_mutation_to_owner() {
    let conn = open_posts();
    conn.execute(
        "INSERT INTO posts (id, published_at) VALUES (1, '2010-01-02 03:04:05');",
        [],
    )
    .unwrap();
    let record = Rc::new(Record::default());

    let mut value = conn
        .query_row("SELECT published_at FROM posts WHERE id = 1;", [], |row| {
            hydrate_attribute(row, "published_at", &record)
        })
        .unwrap()
        .expect("column is not null");

    assert_eq!(value.format(Some("db")).unwrap(), "2010-01-02 03:04:05");
    assert_eq!(value.owner_attribute(), Some("published_at"));
    assert!(record.dirty.borrow().is_empty());

    value.add_interval(Span::new().days(1)).unwrap();
    assert_eq!(*record.dirty.borrow(), vec!["published_at".to_string()]);
}

#[test]
fn null_column_hydrates_to_none() {
    let conn = open_posts();
    conn.execute("INSERT INTO posts (id) VALUES (1);", []).unwrap();
    let record = Rc::new(Record::default());

    let value = conn
        .query_row("SELECT published_at FROM posts WHERE id = 1;", [], |row| {
            hydrate_attribute(row, "published_at", &record)
        })
        .unwrap();
    assert!(value.is_none());
}

#[test]
fn integer_and_real_columns_decode_as_instants() {
    let conn = open_posts();
    conn.execute(
        "INSERT INTO posts (id, edited_at) VALUES (1, 86400), (2, 2440588.5);",
        [],
    )
    .unwrap();

    let from_integer: DateTime = conn
        .query_row("SELECT edited_at FROM posts WHERE id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    let from_real: DateTime = conn
        .query_row("SELECT edited_at FROM posts WHERE id = 2;", [], |row| {
            row.get(0)
        })
        .unwrap();

    assert_eq!(from_integer.unix_seconds(), 86_400);
    assert_eq!(from_real.unix_seconds(), 86_400);
    assert!(!from_integer.is_attached());
}

#[test]
fn unparseable_text_is_a_conversion_error() {
    let conn = open_posts();
    conn.execute(
        "INSERT INTO posts (id, published_at) VALUES (1, 'last tuesday');",
        [],
    )
    .unwrap();

    let result: rusqlite::Result<DateTime> =
        conn.query_row("SELECT published_at FROM posts WHERE id = 1;", [], |row| {
            row.get(0)
        });
    assert!(result.is_err());
}
