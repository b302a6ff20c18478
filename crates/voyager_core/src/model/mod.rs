//! Itinerary domain model.
//!
//! # Responsibility
//! - Define the in-memory shapes of days, activities and activity drafts.
//! - Own the derived time-of-day ordering used across every layer.
//!
//! # Invariants
//! - A day's `date` is its identity and never changes after creation.
//! - `Activity::specific` is only consulted when `when_type == Custom`.
//! - `activities: None` means "not attached", `Some(vec![])` means "none exist".

pub mod activity;
pub mod clock;
pub mod day;
pub mod validation;
