//! Write-time validation failures for days and activities.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Location separator used by the persisted `days.locations` column.
pub const LOCATION_SEPARATOR: char = ',';

/// Reasons a day or activity is rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Activity id is empty after trim.
    BlankActivityId,
    /// Activity description is empty after trim.
    BlankWhat { activity_id: String },
    /// A location entry is empty after trim.
    BlankLocation,
    /// A location contains the column separator and would not round-trip.
    LocationContainsSeparator(String),
    /// An attached activity points at another day.
    ActivityDateMismatch {
        activity_id: String,
        activity_date: NaiveDate,
        day_date: NaiveDate,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankActivityId => write!(f, "activity id must not be blank"),
            Self::BlankWhat { activity_id } => {
                write!(f, "activity `{activity_id}` must describe what happens")
            }
            Self::BlankLocation => write!(f, "location must not be blank"),
            Self::LocationContainsSeparator(location) => write!(
                f,
                "location `{location}` must not contain `{LOCATION_SEPARATOR}`"
            ),
            Self::ActivityDateMismatch {
                activity_id,
                activity_date,
                day_date,
            } => write!(
                f,
                "activity `{activity_id}` is dated {activity_date} but attached to {day_date}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks one free-text location entry.
pub fn validate_location(location: &str) -> Result<(), ValidationError> {
    if location.trim().is_empty() {
        return Err(ValidationError::BlankLocation);
    }
    if location.contains(LOCATION_SEPARATOR) {
        return Err(ValidationError::LocationContainsSeparator(
            location.to_string(),
        ));
    }
    Ok(())
}
