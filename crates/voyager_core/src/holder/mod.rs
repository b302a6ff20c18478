//! Observable UI state holders.
//!
//! # Responsibility
//! - Own the transient state of one screen and republish repository results
//!   as plain values a presentation layer can render.
//! - Turn every repository failure into a short status message.
//!
//! # Invariants
//! - Published state lives in `tokio::sync::watch` channels; subscribers
//!   always see the latest value.
//! - Background tasks owned by a holder are aborted when it is dropped.
//! - Back navigation is blocked for exactly the duration of an edit write.

use crate::model::day::Day;
use crate::repo::AggregateResult;
use serde::Serialize;

mod add_day_holder;
mod days_holder;
mod edit_day_holder;
pub mod messages;

pub use add_day_holder::AddDayHolder;
pub use days_holder::DaysHolder;
pub use edit_day_holder::{EditDayHolder, EditError, EditResult};

/// Read-flow state of the days list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "payload", rename_all = "snake_case")]
pub enum DayState {
    #[default]
    Initial,
    Loading,
    Empty,
    Success(Vec<Day>),
    Error(String),
}

impl From<AggregateResult> for DayState {
    fn from(value: AggregateResult) -> Self {
        match value {
            AggregateResult::Success(days) => Self::Success(days),
            AggregateResult::Empty => Self::Empty,
            AggregateResult::Error(message) if message.trim().is_empty() => {
                Self::Error(messages::RETRIEVE_FAILURE.to_string())
            }
            AggregateResult::Error(message) => Self::Error(message),
        }
    }
}

/// Write-flow state of the creation screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "payload", rename_all = "snake_case")]
pub enum SaveState {
    #[default]
    Initial,
    Loading,
    Done,
    Error(String),
}
