//! Day aggregate root.
//!
//! # Responsibility
//! - Hold one itinerary date with its locations, cover image and activities.
//! - Decide expiry relative to a supplied "today".
//!
//! # Invariants
//! - `date` is the identity key; edits never change it.
//! - Attached activities share the day's `date`.

use crate::model::activity::{sort_by_time, Activity};
use crate::model::clock::{Clock, SystemClock};
use crate::model::validation::{validate_location, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub date: NaiveDate,
    /// Free-text place names; order carries no meaning.
    pub locations: Option<Vec<String>>,
    /// Opaque reference to a locally stored cover image.
    pub image_uri: Option<String>,
    /// `None` when not attached; `Some(vec![])` when attached and empty.
    pub activities: Option<Vec<Activity>>,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            locations: None,
            image_uri: None,
            activities: None,
        }
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = Some(locations.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_image(mut self, image_uri: impl Into<String>) -> Self {
        self.image_uri = Some(image_uri.into());
        self
    }

    pub fn with_activities(mut self, activities: Vec<Activity>) -> Self {
        self.activities = Some(activities);
        self
    }

    /// Whether the day lies strictly before `today`.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.date < today
    }

    /// Whether the day lies strictly before the local calendar date.
    pub fn is_expired(&self) -> bool {
        self.is_expired_on(SystemClock.today())
    }

    /// Orders attached activities by their time-of-day key.
    pub fn sort_activities(&mut self) {
        if let Some(activities) = self.activities.as_mut() {
            sort_by_time(activities);
        }
    }

    /// Checks write-time invariants for the day and every attached activity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for location in self.locations.iter().flatten() {
            validate_location(location)?;
        }
        for activity in self.activities.iter().flatten() {
            activity.validate()?;
            if activity.date != self.date {
                return Err(ValidationError::ActivityDateMismatch {
                    activity_id: activity.id.clone(),
                    activity_date: activity.date,
                    day_date: self.date,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Day;
    use crate::model::activity::{Activity, WhenType};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn expiry_is_strictly_before_today() {
        let today = ymd(2025, 10, 13);
        assert!(Day::new(ymd(2025, 10, 12)).is_expired_on(today));
        assert!(!Day::new(today).is_expired_on(today));
        assert!(!Day::new(ymd(2025, 10, 14)).is_expired_on(today));
    }

    #[test]
    fn validate_rejects_separator_in_location() {
        let day = Day::new(ymd(2025, 10, 13)).with_locations(["Paris, France"]);
        assert!(matches!(
            day.validate(),
            Err(ValidationError::LocationContainsSeparator(_))
        ));
    }

    #[test]
    fn validate_rejects_activity_from_other_date() {
        let day = Day::new(ymd(2025, 10, 13)).with_activities(vec![Activity::new(
            ymd(2025, 10, 14),
            WhenType::Morning,
            "Museum",
        )]);
        assert!(matches!(
            day.validate(),
            Err(ValidationError::ActivityDateMismatch { .. })
        ));
    }

    #[test]
    fn sort_activities_leaves_unattached_list_alone() {
        let mut day = Day::new(ymd(2025, 10, 13));
        day.sort_activities();
        assert_eq!(day.activities, None);
    }
}
