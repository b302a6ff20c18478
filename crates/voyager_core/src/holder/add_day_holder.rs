//! Creation-flow holder.
//!
//! Drafts stay in memory until `save_day` commits them together with the new
//! day. Every edit publishes a fresh list sorted by time of day.

use super::messages;
use super::SaveState;
use crate::model::activity::{sort_by_time, whole_seconds, ActivityDraft, WhenType};
use crate::model::day::Day;
use crate::repo::{ItineraryRepository, RepoResult};
use chrono::{NaiveDate, NaiveTime};
use log::info;
use tokio::sync::watch;

pub struct AddDayHolder {
    repo: ItineraryRepository,
    drafts: watch::Sender<Vec<ActivityDraft>>,
    save_state: watch::Sender<SaveState>,
    block_back: watch::Sender<bool>,
}

impl AddDayHolder {
    pub fn new(repo: ItineraryRepository) -> Self {
        let (drafts, _) = watch::channel(Vec::new());
        let (save_state, _) = watch::channel(SaveState::Initial);
        let (block_back, _) = watch::channel(false);
        Self {
            repo,
            drafts,
            save_state,
            block_back,
        }
    }

    pub fn activities(&self) -> Vec<ActivityDraft> {
        self.drafts.borrow().clone()
    }

    pub fn subscribe_activities(&self) -> watch::Receiver<Vec<ActivityDraft>> {
        self.drafts.subscribe()
    }

    pub fn save_state(&self) -> SaveState {
        self.save_state.borrow().clone()
    }

    pub fn subscribe_save_state(&self) -> watch::Receiver<SaveState> {
        self.save_state.subscribe()
    }

    pub fn is_back_blocked(&self) -> bool {
        *self.block_back.borrow()
    }

    pub fn subscribe_block_back(&self) -> watch::Receiver<bool> {
        self.block_back.subscribe()
    }

    /// Buffers a new draft and returns its key.
    pub fn add_activity(
        &self,
        location: Option<String>,
        when_type: WhenType,
        specific: Option<NaiveTime>,
        what: impl Into<String>,
    ) -> String {
        let draft = ActivityDraft::new(location, when_type, specific, what);
        let key = draft.key.clone();
        self.replace_drafts(|current| {
            let mut next = current.to_vec();
            next.push(draft);
            next
        });
        key
    }

    /// Replaces the draft stored under `key`, keeping the key stable.
    ///
    /// An unknown key buffers the edit as a new draft under that key.
    pub fn edit_activity(
        &self,
        key: &str,
        location: Option<String>,
        when_type: WhenType,
        specific: Option<NaiveTime>,
        what: impl Into<String>,
    ) {
        let edited = ActivityDraft {
            key: key.to_string(),
            location,
            when_type,
            specific: specific.map(whole_seconds),
            what: what.into(),
        };
        self.replace_drafts(|current| {
            let mut next: Vec<ActivityDraft> = current
                .iter()
                .filter(|draft| draft.key != key)
                .cloned()
                .collect();
            next.push(edited);
            next
        });
    }

    /// Drops the draft stored under `key`; returns whether one was removed.
    pub fn remove_activity(&self, key: &str) -> bool {
        let mut removed = false;
        self.replace_drafts(|current| {
            let next: Vec<ActivityDraft> = current
                .iter()
                .filter(|draft| draft.key != key)
                .cloned()
                .collect();
            removed = next.len() != current.len();
            next
        });
        removed
    }

    /// Commits the day with every buffered draft promoted to a dated activity.
    ///
    /// Empty `locations` are stored as absent. Back navigation stays blocked
    /// until the write settles.
    pub async fn save_day(
        &self,
        date: NaiveDate,
        locations: Vec<String>,
        image_uri: Option<String>,
    ) -> RepoResult<()> {
        self.block_back.send_replace(true);
        self.save_state.send_replace(SaveState::Loading);

        let activities = self
            .drafts
            .borrow()
            .iter()
            .map(|draft| draft.promote(date))
            .collect();
        let day = Day {
            date,
            locations: (!locations.is_empty()).then_some(locations),
            image_uri,
            activities: Some(activities),
        };

        let result = self.repo.save_day(&day).await;
        let state = match &result {
            Ok(()) => SaveState::Done,
            Err(_) => SaveState::Error(messages::SAVE_FAILURE.to_string()),
        };
        info!(
            "event=add_day_commit module=holder status={} date={date}",
            if result.is_ok() { "ok" } else { "error" }
        );

        self.block_back.send_replace(false);
        self.save_state.send_replace(state);
        result
    }

    fn replace_drafts(&self, edit: impl FnOnce(&[ActivityDraft]) -> Vec<ActivityDraft>) {
        self.drafts.send_modify(|current| {
            let mut next = edit(current);
            sort_by_time(&mut next);
            *current = next;
        });
    }
}
