use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use voyager_core::holder::messages;
use voyager_core::store::Table;
use voyager_core::{
    Activity, ActivityDraft, AddDayHolder, AggregateResult, Day, DayState, DaysHolder,
    EditDayHolder, EditError, FixedClock, Gateway, ItineraryRepository, RepoError, SaveState,
    WhenType,
};

const STATE_TIMEOUT: Duration = Duration::from_secs(5);

fn ymd(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

fn repo() -> ItineraryRepository {
    let gateway = Gateway::open_in_memory().expect("in-memory database should open");
    ItineraryRepository::with_clock(gateway, Arc::new(FixedClock(ymd(10, 1))))
}

async fn wait_for_state(holder: &DaysHolder, predicate: impl FnMut(&DayState) -> bool) -> DayState {
    let mut rx = holder.subscribe_day_state();
    let state = tokio::time::timeout(STATE_TIMEOUT, rx.wait_for(predicate))
        .await
        .expect("state should be published in time")
        .expect("holder should still be alive");
    state.clone()
}

async fn stored_day(repo: &ItineraryRepository) -> Day {
    match repo.load_days().await {
        AggregateResult::Success(mut days) => days.remove(0),
        other => panic!("expected one stored day, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn days_holder_follows_the_repository() {
    let repo = repo();
    let holder = DaysHolder::new(repo.clone());
    assert!(matches!(
        holder.day_state(),
        DayState::Loading | DayState::Empty
    ));
    wait_for_state(&holder, |state| *state == DayState::Empty).await;

    let day = Day::new(ymd(10, 13)).with_locations(["Rome"]);
    holder.save_day(&day).await.expect("save_day should succeed");
    assert_eq!(holder.toast().as_deref(), Some(messages::SAVE_SUCCESS));

    let state = wait_for_state(&holder, |state| matches!(state, DayState::Success(_))).await;
    assert_eq!(
        state,
        DayState::Success(vec![day.clone().with_activities(Vec::new())])
    );

    holder.delete_day(&day).await.expect("delete_day should succeed");
    assert_eq!(holder.toast().as_deref(), Some(messages::DELETE_SUCCESS));
    wait_for_state(&holder, |state| *state == DayState::Empty).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn days_holder_reports_failures_as_messages() {
    let holder = DaysHolder::new(repo());
    let ghost = Activity::with_id("ghost", ymd(10, 13), WhenType::Morning, "Nothing");

    let err = holder.delete_activity(&ghost).await.expect_err("delete_activity should fail");
    assert!(matches!(err, RepoError::ActivityNotFound(_)));
    assert_eq!(holder.toast().as_deref(), Some(messages::DELETE_FAILURE));

    holder.update_activity(&ghost).await.expect_err("update_activity should fail");
    assert_eq!(holder.toast().as_deref(), Some(messages::SAVE_FAILURE));
}

#[tokio::test]
async fn add_day_holder_commits_drafts_in_time_order() {
    let repo = repo();
    let holder = AddDayHolder::new(repo.clone());
    holder.add_activity(None, WhenType::Evening, None, "Dinner");
    holder.add_activity(Some("Colosseum".into()), WhenType::Morning, None, "Tour");

    holder
        .save_day(ymd(10, 13), Vec::new(), Some("file:///rome.jpg".into()))
        .await
        .expect("save_day should succeed");

    assert_eq!(holder.save_state(), SaveState::Done);
    assert!(!holder.is_back_blocked());
    let day = stored_day(&repo).await;
    assert_eq!(day.locations, None);
    assert_eq!(day.image_uri.as_deref(), Some("file:///rome.jpg"));
    let activities = day.activities.expect("activities should be attached");
    let whats: Vec<&str> = activities.iter().map(|activity| activity.what.as_str()).collect();
    assert_eq!(whats, vec!["Tour", "Dinner"]);
    assert!(activities
        .iter()
        .all(|activity| activity.id.starts_with("2025-10-13_")));
}

#[tokio::test]
async fn add_day_holder_publishes_error_on_duplicate_date() {
    let repo = repo();
    repo.save_day(&Day::new(ymd(10, 13))).await.expect("save_day should succeed");
    let holder = AddDayHolder::new(repo);

    let err = holder
        .save_day(ymd(10, 13), vec!["Rome".into()], None)
        .await
        .expect_err("save_day should fail");

    assert!(matches!(err, RepoError::DuplicateDay(_)));
    assert_eq!(
        holder.save_state(),
        SaveState::Error(messages::SAVE_FAILURE.to_string())
    );
    assert!(!holder.is_back_blocked());
}

#[tokio::test]
async fn edit_holder_without_day_reports_corrupted_item() {
    let holder = EditDayHolder::new(repo());

    let err = holder.add_location("Rome").await.expect_err("add_location should fail");

    assert!(matches!(err, EditError::NoDayLoaded));
    assert_eq!(holder.toast().as_deref(), Some(messages::CORRUPTED_ITEM));
    assert!(!holder.is_back_blocked());
}

#[tokio::test]
async fn edit_holder_set_day_only_notifies_on_change() {
    let holder = EditDayHolder::new(repo());
    let mut rx = holder.subscribe_day();
    let day = Day::new(ymd(10, 13));

    assert!(holder.set_day(day.clone(), true));
    assert!(rx.has_changed().expect("day sender should be alive"));
    rx.borrow_and_update();

    assert!(!holder.set_day(day.clone(), true));
    assert!(!rx.has_changed().expect("day sender should be alive"));

    let edited = day.with_locations(["Rome"]);
    assert!(holder.set_day(edited.clone(), false));
    assert!(!rx.has_changed().expect("day sender should be alive"));
    assert_eq!(holder.day(), Some(edited));
}

#[tokio::test]
async fn edit_holder_activity_edits_keep_day_sorted() {
    let repo = repo();
    let date = ymd(10, 13);
    repo.save_day(&Day::new(date).with_activities(Vec::new()))
        .await
        .expect("save_day should succeed");
    let holder = EditDayHolder::new(repo.clone());
    holder.set_day(stored_day(&repo).await, false);

    holder
        .save_activity(None, WhenType::Night, None, "Concert")
        .await
        .expect("save_activity should succeed");
    assert_eq!(holder.toast().as_deref(), Some(messages::SAVE_SUCCESS));
    holder
        .save_activity(
            Some("Trastevere".into()),
            WhenType::Custom,
            NaiveTime::from_hms_opt(8, 0, 0),
            "Coffee",
        )
        .await
        .expect("save_activity should succeed");

    let concert_id = holder
        .day()
        .and_then(|day| day.activities)
        .expect("activities should be attached")[1]
        .id
        .clone();
    let draft = ActivityDraft::new(None, WhenType::Afternoon, None, "Matinee");
    holder.update_activity(&draft, &concert_id).await.expect("update_activity should succeed");
    assert_eq!(holder.toast().as_deref(), Some(messages::UPDATE_SUCCESS));

    let day = holder.day().expect("day should be loaded");
    let whats: Vec<String> = day
        .activities
        .iter()
        .flatten()
        .map(|activity| activity.what.clone())
        .collect();
    assert_eq!(whats, vec!["Coffee", "Matinee"]);
    assert_eq!(stored_day(&repo).await, day);

    let coffee = day.activities.as_ref().expect("activities should be attached")[0].clone();
    holder.delete_activity(&coffee).await.expect("delete_activity should succeed");
    assert_eq!(
        holder.toast().as_deref(),
        Some(messages::ACTIVITY_DELETE_SUCCESS)
    );
    let remaining = holder
        .day()
        .and_then(|day| day.activities)
        .expect("activities should be attached");
    assert_eq!(remaining.len(), 1);
    assert!(!holder.is_back_blocked());
}

#[tokio::test]
async fn edit_holder_updates_locations_and_image() {
    let repo = repo();
    let day = Day::new(ymd(10, 13)).with_locations(["Rome", "Vatican", "Rome"]);
    repo.save_day(&day).await.expect("save_day should succeed");
    let holder = EditDayHolder::new(repo.clone());
    holder.set_day(day, true);

    holder.add_location("Tivoli").await.expect("add_location should succeed");
    holder.remove_location("Rome").await.expect("remove_location should succeed");
    holder
        .change_image(Some("file:///tivoli.jpg".into()))
        .await
        .expect("change_image should succeed");

    let expected_locations = Some(vec![
        "Vatican".to_string(),
        "Rome".to_string(),
        "Tivoli".to_string(),
    ]);
    let published = holder.day().expect("day should be loaded");
    assert_eq!(published.locations, expected_locations);
    assert_eq!(published.image_uri.as_deref(), Some("file:///tivoli.jpg"));

    let stored = stored_day(&repo).await;
    assert_eq!(stored.locations, expected_locations);
    assert_eq!(stored.image_uri.as_deref(), Some("file:///tivoli.jpg"));
}

#[tokio::test]
async fn edit_holder_failed_update_keeps_published_day() {
    let repo = repo();
    let holder = EditDayHolder::new(repo);
    let unsaved = Day::new(ymd(10, 13));
    holder.set_day(unsaved.clone(), true);

    let err = holder
        .change_image(Some("file:///x.jpg".into()))
        .await
        .expect_err("change_image should fail");

    assert!(matches!(err, EditError::Repo(RepoError::DayNotFound(_))));
    assert_eq!(holder.toast().as_deref(), Some(messages::SAVE_FAILURE));
    assert_eq!(holder.day(), Some(unsaved));
}

#[tokio::test]
async fn edit_holder_delete_day_removes_it() {
    let repo = repo();
    let date = ymd(10, 13);
    let day = Day::new(date).with_activities(vec![Activity::new(date, WhenType::Morning, "Tour")]);
    repo.save_day(&day).await.expect("save_day should succeed");
    let holder = EditDayHolder::new(repo.clone());
    holder.set_day(day, true);

    holder.delete_day().await.expect("delete_day should succeed");

    assert_eq!(holder.toast().as_deref(), Some(messages::DELETE_SUCCESS));
    assert_eq!(repo.load_days().await, AggregateResult::Empty);
}

#[tokio::test(flavor = "multi_thread")]
async fn dropping_days_holder_stops_its_feed() {
    let repo = repo();
    let gateway = repo.gateway().clone();
    let holder = DaysHolder::new(repo);
    wait_for_state(&holder, |state| *state == DayState::Empty).await;
    assert_eq!(gateway.listener_count(Table::Days), 1);

    drop(holder);

    tokio::time::timeout(STATE_TIMEOUT, async {
        while gateway.listener_count(Table::Days) != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("feed should stop after the holder is dropped");
    assert_eq!(gateway.listener_count(Table::Activities), 0);
}

#[tokio::test]
async fn edit_holder_removes_location_with_surrounding_spaces() {
    let repo = repo();
    let day = Day::new(ymd(10, 13)).with_locations([" Paris", "Lyon"]);
    repo.save_day(&day).await.expect("save_day should succeed");
    let holder = EditDayHolder::new(repo.clone());
    holder.set_day(stored_day(&repo).await, true);

    holder
        .remove_location(" Paris")
        .await
        .expect("remove_location should succeed");

    let expected = Some(vec!["Lyon".to_string()]);
    assert_eq!(holder.day().expect("day should be loaded").locations, expected);
    assert_eq!(stored_day(&repo).await.locations, expected);
}
