//! Itinerary repository.
//!
//! # Responsibility
//! - Merge the `days` and `activities` tables into one live, sorted view.
//! - Expose day and activity writes with semantic outcomes.
//!
//! # Invariants
//! - Composite day writes (day row + its activities) commit or roll back as
//!   one SQLite transaction.
//! - Zero rows affected on update/delete is always a `*NotFound` error.
//! - Aggregation failures are published on the feed, never thrown, and the
//!   feed keeps running afterwards.

pub mod feed;
pub mod itinerary_repo;

pub use feed::{assemble_days, AggregateResult, DaysFeed};
pub use itinerary_repo::{ItineraryRepository, RepoError, RepoResult};
