//! Detail/edit-flow holder for a single day.

use super::messages;
use crate::model::activity::{new_activity_id, whole_seconds, Activity, ActivityDraft, WhenType};
use crate::model::day::Day;
use crate::repo::{ItineraryRepository, RepoError};
use chrono::NaiveTime;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::watch;

pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug)]
pub enum EditError {
    /// An intent ran before any day was loaded.
    NoDayLoaded,
    Repo(RepoError),
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDayLoaded => write!(f, "no day loaded in the edit flow"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoDayLoaded => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for EditError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Holds the day being edited and applies edits through the repository.
///
/// On success the published day is replaced with the edited copy; on failure
/// it is left untouched.
pub struct EditDayHolder {
    repo: ItineraryRepository,
    day: watch::Sender<Option<Day>>,
    toast: watch::Sender<Option<String>>,
    block_back: watch::Sender<bool>,
}

impl EditDayHolder {
    pub fn new(repo: ItineraryRepository) -> Self {
        let (day, _) = watch::channel(None);
        let (toast, _) = watch::channel(None);
        let (block_back, _) = watch::channel(false);
        Self {
            repo,
            day,
            toast,
            block_back,
        }
    }

    pub fn day(&self) -> Option<Day> {
        self.day.borrow().clone()
    }

    pub fn subscribe_day(&self) -> watch::Receiver<Option<Day>> {
        self.day.subscribe()
    }

    pub fn toast(&self) -> Option<String> {
        self.toast.borrow().clone()
    }

    pub fn subscribe_toast(&self) -> watch::Receiver<Option<String>> {
        self.toast.subscribe()
    }

    pub fn is_back_blocked(&self) -> bool {
        *self.block_back.borrow()
    }

    pub fn subscribe_block_back(&self) -> watch::Receiver<bool> {
        self.block_back.subscribe()
    }

    /// Replaces the current day.
    ///
    /// Returns `false` when `day` equals the current one. With `notify` off
    /// the value is stored without waking subscribers.
    pub fn set_day(&self, day: Day, notify: bool) -> bool {
        let mut changed = false;
        self.day.send_if_modified(|current| {
            if current.as_ref() == Some(&day) {
                return false;
            }
            *current = Some(day);
            changed = true;
            notify
        });
        changed
    }

    /// Persists a new activity on the current day.
    pub async fn save_activity(
        &self,
        location: Option<String>,
        when_type: WhenType,
        specific: Option<NaiveTime>,
        what: impl Into<String>,
    ) -> EditResult<()> {
        let Some(mut edited) = self.begin() else {
            return Err(EditError::NoDayLoaded);
        };
        let activity = Activity {
            id: new_activity_id(edited.date),
            date: edited.date,
            location,
            when_type,
            specific: specific.map(whole_seconds),
            what: what.into(),
        };
        let result = self.repo.save_activity(&activity).await;
        edited.activities.get_or_insert_with(Vec::new).push(activity);
        self.finish(result, edited, messages::SAVE_SUCCESS, messages::SAVE_FAILURE)
    }

    /// Rewrites the activity `id` from an edited draft.
    pub async fn update_activity(&self, draft: &ActivityDraft, id: &str) -> EditResult<()> {
        let Some(mut edited) = self.begin() else {
            return Err(EditError::NoDayLoaded);
        };
        let activity = Activity::from_draft(draft, id, edited.date);
        let result = self.repo.update_activity(&activity).await;
        let activities = edited.activities.get_or_insert_with(Vec::new);
        activities.retain(|existing| existing.id != activity.id);
        activities.push(activity);
        self.finish(result, edited, messages::UPDATE_SUCCESS, messages::SAVE_FAILURE)
    }

    pub async fn delete_activity(&self, activity: &Activity) -> EditResult<()> {
        let Some(mut edited) = self.begin() else {
            return Err(EditError::NoDayLoaded);
        };
        let result = self.repo.delete_activity(activity).await;
        if let Some(activities) = edited.activities.as_mut() {
            activities.retain(|existing| existing.id != activity.id);
        }
        self.finish(
            result,
            edited,
            messages::ACTIVITY_DELETE_SUCCESS,
            messages::DELETE_FAILURE,
        )
    }

    pub async fn add_location(&self, location: impl Into<String>) -> EditResult<()> {
        let Some(mut edited) = self.begin() else {
            return Err(EditError::NoDayLoaded);
        };
        edited
            .locations
            .get_or_insert_with(Vec::new)
            .push(location.into());
        let result = self.repo.update_day(&edited).await;
        self.finish(result, edited, messages::UPDATE_SUCCESS, messages::SAVE_FAILURE)
    }

    /// Removes the first occurrence of `location`.
    pub async fn remove_location(&self, location: &str) -> EditResult<()> {
        let Some(mut edited) = self.begin() else {
            return Err(EditError::NoDayLoaded);
        };
        if let Some(locations) = edited.locations.as_mut() {
            if let Some(index) = locations.iter().position(|existing| existing == location) {
                locations.remove(index);
            }
        }
        let result = self.repo.update_day(&edited).await;
        self.finish(result, edited, messages::UPDATE_SUCCESS, messages::SAVE_FAILURE)
    }

    /// Points the day at a new cover image, or clears it with `None`.
    pub async fn change_image(&self, image_uri: Option<String>) -> EditResult<()> {
        let Some(mut edited) = self.begin() else {
            return Err(EditError::NoDayLoaded);
        };
        edited.image_uri = image_uri;
        let result = self.repo.update_day(&edited).await;
        self.finish(result, edited, messages::UPDATE_SUCCESS, messages::SAVE_FAILURE)
    }

    /// Deletes the current day and its activities. The published day is kept
    /// so the screen can still render while navigating away.
    pub async fn delete_day(&self) -> EditResult<()> {
        let Some(day) = self.begin() else {
            return Err(EditError::NoDayLoaded);
        };
        let result = self.repo.delete_day(&day).await;
        self.block_back.send_replace(false);
        self.publish(if result.is_ok() {
            messages::DELETE_SUCCESS
        } else {
            messages::DELETE_FAILURE
        });
        result.map_err(EditError::from)
    }

    /// Starts an edit: returns a copy of the current day and blocks back
    /// navigation, or publishes the corrupted-item message when none is loaded.
    fn begin(&self) -> Option<Day> {
        let Some(day) = self.day() else {
            warn!("event=edit_day module=holder status=error reason=no_day_loaded");
            self.publish(messages::CORRUPTED_ITEM);
            return None;
        };
        self.block_back.send_replace(true);
        self.publish(messages::PROCESSING);
        Some(day)
    }

    /// Settles an edit: republishes `edited` with re-sorted activities when
    /// the write succeeded, then unblocks back navigation.
    fn finish(
        &self,
        result: Result<(), RepoError>,
        mut edited: Day,
        success: &str,
        failure: &str,
    ) -> EditResult<()> {
        let outcome = match result {
            Ok(()) => {
                edited.sort_activities();
                self.set_day(edited, true);
                self.publish(success);
                Ok(())
            }
            Err(err) => {
                warn!("event=edit_day module=holder status=error error={err}");
                self.publish(failure);
                Err(EditError::Repo(err))
            }
        };
        self.block_back.send_replace(false);
        outcome
    }

    fn publish(&self, message: &str) {
        self.toast.send_replace(Some(message.to_string()));
    }
}
