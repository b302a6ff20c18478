//! Core of the Voyager itinerary planner.
//! Owns persistence, the live days view and the screen state holders.

pub mod config;
pub mod db;
pub mod holder;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod store;

pub use config::CoreConfig;
pub use holder::{AddDayHolder, DayState, DaysHolder, EditDayHolder, EditError, SaveState};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::activity::{Activity, ActivityDraft, ActivityId, WhenType};
pub use model::clock::{Clock, FixedClock, SystemClock};
pub use model::day::Day;
pub use model::validation::ValidationError;
pub use repo::{AggregateResult, DaysFeed, ItineraryRepository, RepoError, RepoResult};
pub use store::{Gateway, StoreError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
