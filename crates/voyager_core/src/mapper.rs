//! Record ⇄ domain conversion.
//!
//! Pure and infallible: text encodings are handled by the store's column
//! codec, so both sides here are already typed.

use crate::model::activity::Activity;
use crate::model::day::Day;
use crate::store::{ActivityRecord, DayRecord};

pub fn to_activity_record(activity: &Activity) -> ActivityRecord {
    ActivityRecord {
        id: activity.id.clone(),
        date: activity.date,
        location: activity.location.clone(),
        when_type: activity.when_type,
        specific: activity.specific,
        what: activity.what.clone(),
    }
}

pub fn to_activity(record: ActivityRecord) -> Activity {
    Activity {
        id: record.id,
        date: record.date,
        location: record.location,
        when_type: record.when_type,
        specific: record.specific,
        what: record.what,
    }
}

/// Drops `activities`; they are persisted through the activity store.
pub fn to_day_record(day: &Day) -> DayRecord {
    DayRecord {
        date: day.date,
        locations: day.locations.clone(),
        image_uri: day.image_uri.clone(),
    }
}

/// Rebuilds a day from its record and the caller's already-filtered
/// activities. `None` and `Some(vec![])` are passed through unchanged.
pub fn to_day(record: DayRecord, activities: Option<Vec<Activity>>) -> Day {
    Day {
        date: record.date,
        locations: record.locations,
        image_uri: record.image_uri,
        activities,
    }
}
