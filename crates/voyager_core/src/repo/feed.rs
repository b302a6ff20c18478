//! Live aggregate view over both tables.
//!
//! # Responsibility
//! - Assemble day records and activity records into sorted `Day` values.
//! - Keep recomputing whenever either table reports a change.
//!
//! # Invariants
//! - Activities are bucketed by date in one pass; an activity without a
//!   matching day is dropped, never attached elsewhere.
//! - Days sort by `(expired, date)`; activities by time of day.
//! - The background task ends once every `DaysFeed` clone is dropped.
//! - A failed table read is never reused; the next change re-reads it.

use crate::mapper::{to_activity, to_day};
use crate::model::activity::{sort_by_time, Activity};
use crate::model::clock::Clock;
use crate::model::day::Day;
use crate::store::{ActivityRecord, DayRecord, Gateway, StoreResult, Table};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// One emission of the live days view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateResult {
    /// At least one day, sorted for display.
    Success(Vec<Day>),
    /// No days stored.
    Empty,
    /// Recomputation failed; the feed keeps listening for changes.
    Error(String),
}

impl AggregateResult {
    pub fn from_days(days: Vec<Day>) -> Self {
        if days.is_empty() {
            Self::Empty
        } else {
            Self::Success(days)
        }
    }

    fn from_snapshot(
        days: &StoreResult<Vec<DayRecord>>,
        activities: &StoreResult<Vec<ActivityRecord>>,
        today: NaiveDate,
    ) -> Self {
        match (days, activities) {
            (Ok(days), Ok(activities)) => Self::from_days(assemble_days(days, activities, today)),
            (Err(err), _) | (_, Err(err)) => Self::Error(err.to_string()),
        }
    }
}

/// Attaches activities to their days and orders the result.
///
/// Every day gets `Some(list)`, empty when it has no activities.
pub fn assemble_days(
    days: &[DayRecord],
    activities: &[ActivityRecord],
    today: NaiveDate,
) -> Vec<Day> {
    let mut by_date: HashMap<NaiveDate, Vec<Activity>> = HashMap::new();
    for record in activities {
        by_date
            .entry(record.date)
            .or_default()
            .push(to_activity(record.clone()));
    }

    let mut assembled: Vec<Day> = days
        .iter()
        .map(|record| {
            let mut attached = by_date.remove(&record.date).unwrap_or_default();
            sort_by_time(&mut attached);
            to_day(record.clone(), Some(attached))
        })
        .collect();
    assembled.sort_by_key(|day| (day.is_expired_on(today), day.date));
    assembled
}

/// Subscription handle for the live days view.
///
/// Clones share one background pipeline.
#[derive(Debug, Clone)]
pub struct DaysFeed {
    rx: watch::Receiver<AggregateResult>,
}

impl DaysFeed {
    /// Latest published value.
    pub fn current(&self) -> AggregateResult {
        self.rx.borrow().clone()
    }

    /// Waits for the next value this handle has not seen yet.
    ///
    /// Returns `None` once the pipeline has stopped.
    pub async fn next(&mut self) -> Option<AggregateResult> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until the published value satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&AggregateResult) -> bool,
    ) -> Option<AggregateResult> {
        let value = self.rx.wait_for(|value| predicate(value)).await.ok()?;
        Some(value.clone())
    }
}

/// Starts the pipeline and returns its first emission as a feed.
pub(crate) async fn spawn_days_feed(gateway: Gateway, clock: Arc<dyn Clock>) -> DaysFeed {
    // Subscribe before the first read so a write racing the read is not lost.
    let days_rx = gateway.subscribe(Table::Days);
    let activities_rx = gateway.subscribe(Table::Activities);
    let days = gateway.all_days().await;
    let activities = gateway.all_activities().await;

    let first = AggregateResult::from_snapshot(&days, &activities, clock.today());
    log_emission(&first);
    let (tx, rx) = watch::channel(first);

    let pipeline = FeedPipeline {
        gateway,
        clock,
        tx,
        days_rx,
        activities_rx,
        days,
        activities,
    };
    tokio::spawn(pipeline.run());
    info!("event=days_feed module=repo status=start");
    DaysFeed { rx }
}

struct FeedPipeline {
    gateway: Gateway,
    clock: Arc<dyn Clock>,
    tx: watch::Sender<AggregateResult>,
    days_rx: watch::Receiver<u64>,
    activities_rx: watch::Receiver<u64>,
    days: StoreResult<Vec<DayRecord>>,
    activities: StoreResult<Vec<ActivityRecord>>,
}

impl FeedPipeline {
    async fn run(mut self) {
        loop {
            let mut refresh_days = false;
            let mut refresh_activities = false;
            tokio::select! {
                changed = self.days_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    refresh_days = true;
                }
                changed = self.activities_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    refresh_activities = true;
                }
                () = self.tx.closed() => break,
            }

            // Fold a change on the other table into this recomputation.
            if self.days_rx.has_changed().unwrap_or(false) {
                self.days_rx.borrow_and_update();
                refresh_days = true;
            }
            if self.activities_rx.has_changed().unwrap_or(false) {
                self.activities_rx.borrow_and_update();
                refresh_activities = true;
            }

            // A table whose last read failed is re-read on every change.
            if refresh_days || self.days.is_err() {
                self.days = self.gateway.all_days().await;
            }
            if refresh_activities || self.activities.is_err() {
                self.activities = self.gateway.all_activities().await;
            }

            let next =
                AggregateResult::from_snapshot(&self.days, &self.activities, self.clock.today());
            self.tx.send_if_modified(|current| {
                if *current == next {
                    return false;
                }
                log_emission(&next);
                *current = next;
                true
            });
        }
        info!("event=days_feed module=repo status=stop");
    }
}

fn log_emission(result: &AggregateResult) {
    match result {
        AggregateResult::Success(days) => {
            info!(
                "event=days_feed module=repo status=ok kind=success days={}",
                days.len()
            );
        }
        AggregateResult::Empty => info!("event=days_feed module=repo status=ok kind=empty"),
        AggregateResult::Error(message) => {
            warn!("event=days_feed module=repo status=error error={message}");
        }
    }
}
