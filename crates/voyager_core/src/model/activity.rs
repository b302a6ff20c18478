//! Activity domain model and time-of-day ordering.
//!
//! # Responsibility
//! - Define persisted activities and the undated drafts used while a day is
//!   being created.
//! - Derive the canonical sort time shared by both shapes.
//!
//! # Invariants
//! - Activity ids are `<date>_<uuid v4>` and never reused.
//! - Named periods sort MORNING < AFTERNOON < EVENING < NIGHT.
//! - CUSTOM without a `specific` time sorts at the late-day fallback.

use crate::model::validation::ValidationError;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted activity identifier.
pub type ActivityId = String;

/// Coarse time slot of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WhenType {
    Morning,
    Afternoon,
    Evening,
    Night,
    /// Uses the activity's `specific` time.
    Custom,
}

impl WhenType {
    pub const ALL: [WhenType; 5] = [
        WhenType::Morning,
        WhenType::Afternoon,
        WhenType::Evening,
        WhenType::Night,
        WhenType::Custom,
    ];

    /// Stable storage name of this variant.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Afternoon => "AFTERNOON",
            Self::Evening => "EVENING",
            Self::Night => "NIGHT",
            Self::Custom => "CUSTOM",
        }
    }

    /// Parses a storage name produced by [`WhenType::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
    }
}

/// Computes the ordering key for a slot and optional explicit time.
pub fn sort_time_for(when_type: WhenType, specific: Option<NaiveTime>) -> NaiveTime {
    match when_type {
        WhenType::Morning => clock_time(9, 0),
        WhenType::Afternoon => clock_time(12, 0),
        WhenType::Evening => clock_time(18, 0),
        WhenType::Night => clock_time(21, 0),
        WhenType::Custom => specific.unwrap_or_else(late_day_fallback),
    }
}

/// Sort time of a CUSTOM activity that has no explicit time.
pub fn late_day_fallback() -> NaiveTime {
    clock_time(23, 59)
}

fn clock_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Anything that can be placed on a day's timeline.
pub trait Scheduled {
    fn when_type(&self) -> WhenType;
    fn specific(&self) -> Option<NaiveTime>;

    fn sort_time(&self) -> NaiveTime {
        sort_time_for(self.when_type(), self.specific())
    }
}

/// Stable chronological sort; equal keys keep their relative order.
pub fn sort_by_time<T: Scheduled>(items: &mut [T]) {
    items.sort_by_key(|item| item.sort_time());
}

/// Drops sub-second precision; stored times keep whole seconds only.
pub fn whole_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// Generates a fresh persisted id for an activity on `date`.
pub fn new_activity_id(date: NaiveDate) -> ActivityId {
    format!("{date}_{}", Uuid::new_v4())
}

/// One planned event on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    /// Date of the owning day.
    pub date: NaiveDate,
    pub location: Option<String>,
    pub when_type: WhenType,
    /// Meaningful only when `when_type == WhenType::Custom`. Stored with
    /// whole-second precision; constructors truncate.
    pub specific: Option<NaiveTime>,
    pub what: String,
}

impl Activity {
    /// Creates an activity with a generated id.
    pub fn new(date: NaiveDate, when_type: WhenType, what: impl Into<String>) -> Self {
        Self::with_id(new_activity_id(date), date, when_type, what)
    }

    /// Creates an activity with a caller-provided id.
    pub fn with_id(
        id: impl Into<ActivityId>,
        date: NaiveDate,
        when_type: WhenType,
        what: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            location: None,
            when_type,
            specific: None,
            what: what.into(),
        }
    }

    /// Builds the dated activity for a draft under an existing id.
    pub fn from_draft(draft: &ActivityDraft, id: impl Into<ActivityId>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            location: draft.location.clone(),
            when_type: draft.when_type,
            specific: draft.specific.map(whole_seconds),
            what: draft.what.clone(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn at_time(mut self, specific: NaiveTime) -> Self {
        self.specific = Some(whole_seconds(specific));
        self
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::BlankActivityId);
        }
        if self.what.trim().is_empty() {
            return Err(ValidationError::BlankWhat {
                activity_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

impl Scheduled for Activity {
    fn when_type(&self) -> WhenType {
        self.when_type
    }

    fn specific(&self) -> Option<NaiveTime> {
        self.specific
    }
}

/// Undated activity buffered by the creation flow.
///
/// `key` only identifies the draft inside the flow; the persisted id is
/// assigned when the day is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub key: String,
    pub location: Option<String>,
    pub when_type: WhenType,
    pub specific: Option<NaiveTime>,
    pub what: String,
}

impl ActivityDraft {
    pub fn new(
        location: Option<String>,
        when_type: WhenType,
        specific: Option<NaiveTime>,
        what: impl Into<String>,
    ) -> Self {
        Self {
            key: Uuid::new_v4().to_string(),
            location,
            when_type,
            specific: specific.map(whole_seconds),
            what: what.into(),
        }
    }

    /// Promotes the draft to a dated activity with a fresh id.
    pub fn promote(&self, date: NaiveDate) -> Activity {
        Activity::from_draft(self, new_activity_id(date), date)
    }
}

impl Scheduled for ActivityDraft {
    fn when_type(&self) -> WhenType {
        self.when_type
    }

    fn specific(&self) -> Option<NaiveTime> {
        self.specific
    }
}

#[cfg(test)]
mod tests {
    use super::{
        late_day_fallback, new_activity_id, sort_by_time, sort_time_for, whole_seconds, Activity,
        ActivityDraft, Scheduled, WhenType,
    };
    use chrono::{NaiveDate, NaiveTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 13).expect("valid date")
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    #[test]
    fn named_periods_ignore_specific_time() {
        for when_type in [
            WhenType::Morning,
            WhenType::Afternoon,
            WhenType::Evening,
            WhenType::Night,
        ] {
            assert_eq!(
                sort_time_for(when_type, Some(time(3, 15))),
                sort_time_for(when_type, None)
            );
        }
    }

    #[test]
    fn named_periods_sort_in_fixed_order() {
        let morning = sort_time_for(WhenType::Morning, None);
        let afternoon = sort_time_for(WhenType::Afternoon, None);
        let evening = sort_time_for(WhenType::Evening, None);
        let night = sort_time_for(WhenType::Night, None);
        assert!(morning < afternoon);
        assert!(afternoon < evening);
        assert!(evening < night);
    }

    #[test]
    fn custom_uses_specific_or_late_fallback() {
        assert_eq!(sort_time_for(WhenType::Custom, Some(time(7, 30))), time(7, 30));
        assert_eq!(sort_time_for(WhenType::Custom, None), late_day_fallback());
        assert_eq!(late_day_fallback(), time(23, 59));
    }

    #[test]
    fn when_type_storage_names_round_trip() {
        for when_type in WhenType::ALL {
            assert_eq!(WhenType::parse(when_type.as_str()), Some(when_type));
        }
        assert_eq!(WhenType::parse("morning"), None);
    }

    #[test]
    fn sort_by_time_is_stable_for_equal_keys() {
        let mut items = vec![
            Activity::with_id("b", date(), WhenType::Night, "late"),
            Activity::with_id("c", date(), WhenType::Morning, "first"),
            Activity::with_id("d", date(), WhenType::Morning, "second"),
            Activity::with_id("e", date(), WhenType::Custom, "lunch").at_time(time(12, 30)),
        ];
        sort_by_time(&mut items);
        let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "e", "b"]);
    }

    #[test]
    fn generated_ids_carry_date_prefix_and_differ() {
        let first = new_activity_id(date());
        let second = new_activity_id(date());
        assert!(first.starts_with("2025-10-13_"));
        assert_ne!(first, second);
    }

    #[test]
    fn promoted_draft_keeps_fields_and_gets_dated_id() {
        let draft = ActivityDraft::new(
            Some("Louvre".to_string()),
            WhenType::Custom,
            Some(time(10, 0)),
            "Museum",
        );
        let activity = draft.promote(date());
        assert_eq!(activity.date, date());
        assert_eq!(activity.location.as_deref(), Some("Louvre"));
        assert_eq!(activity.sort_time(), draft.sort_time());
        assert_ne!(activity.id, draft.key);
        assert!(activity.id.starts_with("2025-10-13_"));
    }

    #[test]
    fn validate_rejects_blank_what() {
        let activity = Activity::with_id("x", date(), WhenType::Morning, "   ");
        assert!(activity.validate().is_err());
    }

    #[test]
    fn constructors_drop_sub_second_precision() {
        let precise = NaiveTime::from_hms_milli_opt(19, 30, 5, 750).expect("valid time");
        let expected = NaiveTime::from_hms_opt(19, 30, 5).expect("valid time");

        assert_eq!(whole_seconds(precise), expected);
        let activity = Activity::with_id("x", date(), WhenType::Custom, "Dinner").at_time(precise);
        assert_eq!(activity.specific, Some(expected));
        let draft = ActivityDraft::new(None, WhenType::Custom, Some(precise), "Dinner");
        assert_eq!(draft.specific, Some(expected));
    }
}
