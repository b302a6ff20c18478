//! SQLite implementation of [`ActivityStore`].

use super::columns::{decode_date, decode_time, decode_when_type, encode_date, encode_time};
use super::{
    ensure_connection_ready, map_insert_error, ActivityRecord, ActivityStore, StoreResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    date,
    location,
    when_type,
    specific,
    what
FROM activities";

/// Activity store bound to one connection or transaction.
pub struct SqliteActivityStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityStore<'conn> {
    /// Constructs a store after checking the connection schema.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Constructs a store on a connection already checked by the caller.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ActivityStore for SqliteActivityStore<'_> {
    fn all_activities(&self) -> StoreResult<Vec<ActivityRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} ORDER BY date ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn insert_activity(&self, record: &ActivityRecord) -> StoreResult<usize> {
        self.conn
            .execute(
                "INSERT INTO activities (
                    id,
                    date,
                    location,
                    when_type,
                    specific,
                    what
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    record.id.as_str(),
                    encode_date(record.date),
                    record.location.as_deref(),
                    record.when_type.as_str(),
                    record.specific.map(encode_time),
                    record.what.as_str(),
                ],
            )
            .map_err(|err| map_insert_error(err, "activities", record.id.clone()))
    }

    fn update_activity(&self, record: &ActivityRecord) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE activities
             SET
                date = ?2,
                location = ?3,
                when_type = ?4,
                specific = ?5,
                what = ?6
             WHERE id = ?1;",
            params![
                record.id.as_str(),
                encode_date(record.date),
                record.location.as_deref(),
                record.when_type.as_str(),
                record.specific.map(encode_time),
                record.what.as_str(),
            ],
        )?;
        Ok(changed)
    }

    fn delete_activity(&self, record: &ActivityRecord) -> StoreResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [record.id.as_str()])?;
        Ok(changed)
    }

    fn delete_activities_for_date(&self, date: NaiveDate) -> StoreResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE date = ?1;", [encode_date(date)])?;
        Ok(changed)
    }
}

fn parse_activity_row(row: &Row<'_>) -> StoreResult<ActivityRecord> {
    let date_text: String = row.get("date")?;
    let when_text: String = row.get("when_type")?;
    let specific = match row.get::<_, Option<String>>("specific")? {
        Some(value) => Some(decode_time(&value, "activities.specific")?),
        None => None,
    };

    Ok(ActivityRecord {
        id: row.get("id")?,
        date: decode_date(&date_text, "activities.date")?,
        location: row.get("location")?,
        when_type: decode_when_type(&when_text, "activities.when_type")?,
        specific,
        what: row.get("what")?,
    })
}
