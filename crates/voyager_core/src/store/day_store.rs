//! SQLite implementation of [`DayStore`].

use super::columns::{decode_date, decode_locations, encode_date, encode_locations};
use super::{ensure_connection_ready, map_insert_error, DayRecord, DayStore, StoreResult};
use rusqlite::{params, Connection, Row};

const DAY_SELECT_SQL: &str = "SELECT
    date,
    locations,
    image_uri
FROM days";

/// Day store bound to one connection or transaction.
pub struct SqliteDayStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDayStore<'conn> {
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

impl DayStore for SqliteDayStore<'_> {
    fn all_days(&self) -> StoreResult<Vec<DayRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DAY_SELECT_SQL} ORDER BY date ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut days = Vec::new();
        while let Some(row) = rows.next()? {
            days.push(parse_day_row(row)?);
        }
        Ok(days)
    }

    fn insert_day(&self, record: &DayRecord) -> StoreResult<usize> {
        let date = encode_date(record.date);
        self.conn
            .execute(
                "INSERT INTO days (date, locations, image_uri) VALUES (?1, ?2, ?3);",
                params![
                    date.as_str(),
                    record.locations.as_deref().map(encode_locations),
                    record.image_uri.as_deref(),
                ],
            )
            .map_err(|err| map_insert_error(err, "days", date.clone()))
    }

    fn update_day(&self, record: &DayRecord) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE days
             SET
                locations = ?2,
                image_uri = ?3
             WHERE date = ?1;",
            params![
                encode_date(record.date),
                record.locations.as_deref().map(encode_locations),
                record.image_uri.as_deref(),
            ],
        )?;
        Ok(changed)
    }

    fn delete_day(&self, record: &DayRecord) -> StoreResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM days WHERE date = ?1;", [encode_date(record.date)])?;
        Ok(changed)
    }
}

fn parse_day_row(row: &Row<'_>) -> StoreResult<DayRecord> {
    let date_text: String = row.get("date")?;
    Ok(DayRecord {
        date: decode_date(&date_text, "days.date")?,
        locations: row
            .get::<_, Option<String>>("locations")?
            .map(|value| decode_locations(&value)),
        image_uri: row.get("image_uri")?,
    })
}
