//! Day and activity writes plus the live days feed.

use crate::mapper::{to_activity_record, to_day_record};
use crate::model::activity::{Activity, ActivityId};
use crate::model::clock::{Clock, SystemClock};
use crate::model::day::Day;
use crate::model::validation::ValidationError;
use crate::repo::feed::{assemble_days, spawn_days_feed, AggregateResult, DaysFeed};
use crate::store::{
    ActivityRecord, ActivityStore, DayStore, Gateway, SqliteActivityStore, SqliteDayStore,
    StoreError, Table,
};
use chrono::NaiveDate;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome failures of itinerary writes.
#[derive(Debug)]
pub enum RepoError {
    /// Input failed write-time validation; storage was not touched.
    Validation(ValidationError),
    /// A day with this date already exists.
    DuplicateDay(NaiveDate),
    /// An activity with this id already exists.
    DuplicateActivity(ActivityId),
    /// No day with this date exists.
    DayNotFound(NaiveDate),
    /// No activity with this id exists.
    ActivityNotFound(ActivityId),
    /// Storage-level failure.
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateDay(date) => write!(f, "day already exists: {date}"),
            Self::DuplicateActivity(id) => write!(f, "activity already exists: {id}"),
            Self::DayNotFound(date) => write!(f, "day not found: {date}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(value.into())
    }
}

impl RepoError {
    /// Whether the failure means the target row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DayNotFound(_) | Self::ActivityNotFound(_))
    }
}

/// Itinerary repository over a shared gateway. Cheap to clone.
#[derive(Clone)]
pub struct ItineraryRepository {
    gateway: Gateway,
    clock: Arc<dyn Clock>,
}

impl ItineraryRepository {
    /// Uses the local calendar date for expiry ordering.
    pub fn new(gateway: Gateway) -> Self {
        Self::with_clock(gateway, Arc::new(SystemClock))
    }

    pub fn with_clock(gateway: Gateway, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Subscribes to the live, sorted days view.
    ///
    /// The returned feed already holds the current state; every later change
    /// to either table publishes a recomputed value.
    pub async fn observe_days(&self) -> DaysFeed {
        spawn_days_feed(self.gateway.clone(), Arc::clone(&self.clock)).await
    }

    /// One-shot snapshot with the same assembly as [`Self::observe_days`].
    pub async fn load_days(&self) -> AggregateResult {
        let today = self.clock.today();
        let snapshot = self
            .gateway
            .read(|conn| -> Result<_, StoreError> {
                let days = SqliteDayStore::new(conn).all_days()?;
                let activities = SqliteActivityStore::new(conn).all_activities()?;
                Ok((days, activities))
            })
            .await;
        match snapshot {
            Ok((days, activities)) => {
                AggregateResult::from_days(assemble_days(&days, &activities, today))
            }
            Err(err) => AggregateResult::Error(err.to_string()),
        }
    }

    /// Inserts a day and its attached activities atomically.
    ///
    /// # Errors
    /// - `DuplicateDay` when the date exists; no activity is attempted.
    /// - `DuplicateActivity` when any activity id exists; the day is rolled back.
    pub async fn save_day(&self, day: &Day) -> RepoResult<()> {
        let started_at = Instant::now();
        day.validate()?;
        let date = day.date;
        let record = to_day_record(day);
        let activities = activity_records(day);

        let result = self
            .gateway
            .write(&[Table::Days, Table::Activities], move |conn| -> RepoResult<()> {
                let tx = conn.transaction()?;
                SqliteDayStore::new(&tx)
                    .insert_day(&record)
                    .map_err(|err| day_insert_error(err, date))?;
                let activity_store = SqliteActivityStore::new(&tx);
                for activity in &activities {
                    activity_store
                        .insert_activity(activity)
                        .map_err(activity_insert_error)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await;
        log_write("day_save", &date.to_string(), started_at, &result);
        result
    }

    /// Updates a day and every attached activity atomically.
    ///
    /// Any attached activity that no longer exists fails the whole update.
    pub async fn update_day(&self, day: &Day) -> RepoResult<()> {
        let started_at = Instant::now();
        day.validate()?;
        let date = day.date;
        let record = to_day_record(day);
        let activities = activity_records(day);

        let result = self
            .gateway
            .write(&[Table::Days, Table::Activities], move |conn| -> RepoResult<()> {
                let tx = conn.transaction()?;
                if SqliteDayStore::new(&tx).update_day(&record)? == 0 {
                    return Err(RepoError::DayNotFound(date));
                }
                let activity_store = SqliteActivityStore::new(&tx);
                for activity in &activities {
                    if activity_store.update_activity(activity)? != 1 {
                        return Err(RepoError::ActivityNotFound(activity.id.clone()));
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await;
        log_write("day_update", &date.to_string(), started_at, &result);
        result
    }

    /// Deletes a day together with all of its activities atomically.
    ///
    /// Attached activities must exist; rows for the date that were not
    /// attached are removed as well.
    pub async fn delete_day(&self, day: &Day) -> RepoResult<()> {
        let started_at = Instant::now();
        let date = day.date;
        let record = to_day_record(day);
        let activities = activity_records(day);

        let result = self
            .gateway
            .write(&[Table::Days, Table::Activities], move |conn| -> RepoResult<()> {
                let tx = conn.transaction()?;
                if SqliteDayStore::new(&tx).delete_day(&record)? == 0 {
                    return Err(RepoError::DayNotFound(date));
                }
                let activity_store = SqliteActivityStore::new(&tx);
                for activity in &activities {
                    if activity_store.delete_activity(activity)? != 1 {
                        return Err(RepoError::ActivityNotFound(activity.id.clone()));
                    }
                }
                activity_store.delete_activities_for_date(date)?;
                tx.commit()?;
                Ok(())
            })
            .await;
        log_write("day_delete", &date.to_string(), started_at, &result);
        result
    }

    pub async fn save_activity(&self, activity: &Activity) -> RepoResult<()> {
        let started_at = Instant::now();
        activity.validate()?;
        let record = to_activity_record(activity);

        let result = self
            .gateway
            .write(&[Table::Activities], move |conn| -> RepoResult<()> {
                SqliteActivityStore::new(conn)
                    .insert_activity(&record)
                    .map_err(activity_insert_error)?;
                Ok(())
            })
            .await;
        log_write("activity_save", &activity.id, started_at, &result);
        result
    }

    /// Succeeds only when exactly one row was updated.
    pub async fn update_activity(&self, activity: &Activity) -> RepoResult<()> {
        let started_at = Instant::now();
        activity.validate()?;
        let record = to_activity_record(activity);

        let result = self
            .gateway
            .write(&[Table::Activities], move |conn| -> RepoResult<()> {
                match SqliteActivityStore::new(conn).update_activity(&record)? {
                    1 => Ok(()),
                    _ => Err(RepoError::ActivityNotFound(record.id)),
                }
            })
            .await;
        log_write("activity_update", &activity.id, started_at, &result);
        result
    }

    /// Succeeds only when exactly one row was deleted; a missing row is
    /// `ActivityNotFound`.
    pub async fn delete_activity(&self, activity: &Activity) -> RepoResult<()> {
        let started_at = Instant::now();
        let record = to_activity_record(activity);

        let result = self
            .gateway
            .write(&[Table::Activities], move |conn| -> RepoResult<()> {
                match SqliteActivityStore::new(conn).delete_activity(&record)? {
                    1 => Ok(()),
                    _ => Err(RepoError::ActivityNotFound(record.id)),
                }
            })
            .await;
        log_write("activity_delete", &activity.id, started_at, &result);
        result
    }
}

fn activity_records(day: &Day) -> Vec<ActivityRecord> {
    day.activities
        .iter()
        .flatten()
        .map(to_activity_record)
        .collect()
}

fn day_insert_error(err: StoreError, date: NaiveDate) -> RepoError {
    match err {
        StoreError::Duplicate { .. } => RepoError::DuplicateDay(date),
        other => other.into(),
    }
}

fn activity_insert_error(err: StoreError) -> RepoError {
    match err {
        StoreError::Duplicate { key, .. } => RepoError::DuplicateActivity(key),
        other => other.into(),
    }
}

fn log_write(event: &str, key: &str, started_at: Instant, result: &RepoResult<()>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(()) => info!("event={event} module=repo status=ok key={key} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event={event} module=repo status=error key={key} duration_ms={duration_ms} error={err}"
        ),
    }
}
