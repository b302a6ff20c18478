//! List-screen holder.

use super::messages;
use super::DayState;
use crate::model::activity::Activity;
use crate::model::day::Day;
use crate::repo::{ItineraryRepository, RepoResult};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Follows the live days view and runs list-level writes.
pub struct DaysHolder {
    repo: ItineraryRepository,
    day_state: Arc<watch::Sender<DayState>>,
    toast: watch::Sender<Option<String>>,
    follower: JoinHandle<()>,
}

impl DaysHolder {
    /// Publishes `Loading` and starts following the repository feed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(repo: ItineraryRepository) -> Self {
        let (day_state, _) = watch::channel(DayState::Initial);
        let day_state = Arc::new(day_state);
        day_state.send_replace(DayState::Loading);
        let (toast, _) = watch::channel(None);

        let follower = tokio::spawn(follow_days(repo.clone(), Arc::clone(&day_state)));
        Self {
            repo,
            day_state,
            toast,
            follower,
        }
    }

    pub fn day_state(&self) -> DayState {
        self.day_state.borrow().clone()
    }

    pub fn subscribe_day_state(&self) -> watch::Receiver<DayState> {
        self.day_state.subscribe()
    }

    /// Latest status message, `None` before the first intent.
    pub fn toast(&self) -> Option<String> {
        self.toast.borrow().clone()
    }

    pub fn subscribe_toast(&self) -> watch::Receiver<Option<String>> {
        self.toast.subscribe()
    }

    pub async fn save_day(&self, day: &Day) -> RepoResult<()> {
        self.publish(messages::PROCESSING);
        let result = self.repo.save_day(day).await;
        self.publish_outcome(&result, messages::SAVE_SUCCESS, messages::SAVE_FAILURE);
        result
    }

    pub async fn update_day(&self, day: &Day) -> RepoResult<()> {
        self.publish(messages::PROCESSING);
        let result = self.repo.update_day(day).await;
        self.publish_outcome(&result, messages::UPDATE_SUCCESS, messages::SAVE_FAILURE);
        result
    }

    pub async fn delete_day(&self, day: &Day) -> RepoResult<()> {
        self.publish(messages::PROCESSING);
        let result = self.repo.delete_day(day).await;
        self.publish_outcome(&result, messages::DELETE_SUCCESS, messages::DELETE_FAILURE);
        result
    }

    pub async fn save_activity(&self, activity: &Activity) -> RepoResult<()> {
        self.publish(messages::PROCESSING);
        let result = self.repo.save_activity(activity).await;
        self.publish_outcome(&result, messages::SAVE_SUCCESS, messages::SAVE_FAILURE);
        result
    }

    pub async fn update_activity(&self, activity: &Activity) -> RepoResult<()> {
        self.publish(messages::PROCESSING);
        let result = self.repo.update_activity(activity).await;
        self.publish_outcome(&result, messages::UPDATE_SUCCESS, messages::SAVE_FAILURE);
        result
    }

    pub async fn delete_activity(&self, activity: &Activity) -> RepoResult<()> {
        self.publish(messages::PROCESSING);
        let result = self.repo.delete_activity(activity).await;
        self.publish_outcome(&result, messages::DELETE_SUCCESS, messages::DELETE_FAILURE);
        result
    }

    fn publish(&self, message: &str) {
        self.toast.send_replace(Some(message.to_string()));
    }

    fn publish_outcome(&self, result: &RepoResult<()>, success: &str, failure: &str) {
        self.publish(if result.is_ok() { success } else { failure });
    }
}

impl Drop for DaysHolder {
    fn drop(&mut self) {
        self.follower.abort();
    }
}

async fn follow_days(repo: ItineraryRepository, day_state: Arc<watch::Sender<DayState>>) {
    let mut feed = repo.observe_days().await;
    let mut latest = feed.current();
    loop {
        day_state.send_replace(DayState::from(latest));
        debug!("event=days_holder module=holder status=ok kind=state_published");
        match feed.next().await {
            Some(next) => latest = next,
            None => break,
        }
    }
    info!("event=days_holder module=holder status=stop");
}
