use pretty_assertions::assert_eq;
use tasknest::auth;
use tasknest::db::MemoryStore;
use tasknest::error::AppError;
use tasknest::lists;
use tasknest::models::{ActivityAction, ChecklistInput};
use tasknest::tasks;
use uuid::Uuid;

const EMAIL: &str = "felix@felixisaac.dev";
const PASSWORD: &str = "strong p@ssW0rd";
const IP: &str = "234.23.12.2.4";

fn assert_bad_request(err: &AppError, message: &str) {
    match err {
        AppError::BadRequest(msg) => assert_eq!(msg, message),
        other => panic!("Expected 400 {:?}, got {:?}", message, other),
    }
}

fn assert_unauthorized(err: &AppError, message: &str) {
    match err {
        AppError::Unauthorized(msg) => assert_eq!(msg, message),
        other => panic!("Expected 401 {:?}, got {:?}", message, other),
    }
}

fn checklist(title: &str) -> ChecklistInput {
    serde_json::from_value(serde_json::json!({ "title": title })).unwrap()
}

/// Registers a user, creates a list with one task, and returns the session
/// cookie plus both IDs.
async fn store_with_task() -> (MemoryStore, String, Uuid, Uuid) {
    let store = MemoryStore::new();
    auth::create_user(&store, "Felix", EMAIL, PASSWORD)
        .await
        .expect("Failed to register test user");
    let cookie = auth::login_user(&store, EMAIL, PASSWORD, IP)
        .await
        .expect("Failed to log test user in");

    lists::create_list(&store, &cookie, IP, "Test list", None)
        .await
        .expect("Failed to create test list");
    let user = auth::get_user_by_cookie(&store, &cookie, IP).await.unwrap();
    let list_id = user.lists[0];

    tasks::create_task(&store, &cookie, IP, "Go to dentist appointment", &list_id)
        .await
        .expect("Failed to create test task");
    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    let task_id = list.tasks[0].id;

    (store, cookie, list_id, task_id)
}

#[actix_rt::test]
async fn test_create_task() {
    let (store, cookie, list_id, _) = store_with_task().await;

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert_eq!(list.tasks.len(), 1);
    assert_eq!(list.tasks[0].title, "Go to dentist appointment");
    // New tasks carry their seeded CREATE entry.
    assert_eq!(list.tasks[0].activity.len(), 1);
    assert_eq!(list.tasks[0].activity[0].action, ActivityAction::Create);

    let err = tasks::create_task(&store, &cookie, IP, "", &list_id).await.unwrap_err();
    assert_bad_request(&err, "Missing task title");

    let err = tasks::create_task(&store, "invalid-cookie", IP, "Title", &list_id)
        .await
        .unwrap_err();
    assert_unauthorized(&err, "Invalid encrypted code");

    let err = tasks::create_task(&store, &cookie, "invalid-ip", "Title", &list_id)
        .await
        .unwrap_err();
    assert_unauthorized(&err, "Invalid email or password");
}

#[actix_rt::test]
async fn test_verify_task_owner() {
    let (store, cookie, _, task_id) = store_with_task().await;

    let ownership = tasks::verify_task_owner(&store, &cookie, IP, &task_id)
        .await
        .unwrap();
    assert!(ownership.owner);
    assert_eq!(ownership.list.tasks[0].id, task_id);

    let err = tasks::verify_task_owner(&store, &cookie, IP, &Uuid::new_v4())
        .await
        .unwrap_err();
    assert_bad_request(&err, "Task or list does not exist");

    let err = tasks::verify_task_owner(&store, "invalid-cookie", IP, &task_id)
        .await
        .unwrap_err();
    assert_unauthorized(&err, "Invalid encrypted code");
}

#[actix_rt::test]
async fn test_update_task_title_and_description() {
    let (store, cookie, list_id, task_id) = store_with_task().await;

    let response = tasks::update_task_title(&store, &cookie, IP, "Cancel appointment", &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Updated task title");

    let response =
        tasks::change_task_description(&store, &cookie, IP, "It got better", &task_id)
            .await
            .unwrap();
    assert_eq!(response.message, "Updated task description");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    let task = &list.tasks[0];
    assert_eq!(task.title, "Cancel appointment");
    assert_eq!(task.description.as_deref(), Some("It got better"));
    // Seeded CREATE plus the two updates, in order.
    assert_eq!(task.activity.len(), 3);
    assert_eq!(
        task.activity[1].detail,
        "Task title from Go to dentist appointment to Cancel appointment"
    );

    let err = tasks::update_task_title(&store, &cookie, IP, "", &task_id).await.unwrap_err();
    assert_bad_request(&err, "Missing new task title");

    let err = tasks::change_task_description(&store, &cookie, IP, "", &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing new task description");
}

#[actix_rt::test]
async fn test_task_attachments() {
    let (store, cookie, list_id, task_id) = store_with_task().await;

    let response =
        tasks::add_task_attachments(&store, &cookie, IP, &["https://example.com/".into()], &task_id)
            .await
            .unwrap();
    assert_eq!(response.message, "Added task attachment");

    let response = tasks::add_task_attachments(
        &store,
        &cookie,
        IP,
        &[
            "https://example.com/a.png".into(),
            "https://example.com/b.png".into(),
        ],
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Added task attachments");

    let err = tasks::add_task_attachments(&store, &cookie, IP, &[], &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing task attachments");

    let err = tasks::add_task_attachments(
        &store,
        &cookie,
        IP,
        &["https://example.com/ok.png".into(), "not-a-url".into()],
        &task_id,
    )
    .await
    .unwrap_err();
    assert_bad_request(&err, "One of the attachments has an invalid URL");

    // Update in place.
    let response = tasks::update_task_attachment(
        &store,
        &cookie,
        IP,
        Some(0),
        "https://example.com/updated.png",
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Updated attachment");

    let err = tasks::update_task_attachment(
        &store,
        &cookie,
        IP,
        Some(9),
        "https://example.com/nope.png",
        &task_id,
    )
    .await
    .unwrap_err();
    assert_bad_request(&err, "Attachment not found");

    let err = tasks::update_task_attachment(&store, &cookie, IP, Some(0), "invalid-url", &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Invalid attachment URL");

    // Remove the first; the updated URL should be gone.
    let response = tasks::remove_task_attachment(&store, &cookie, IP, Some(0), &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Removed attachment");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    let task = &list.tasks[0];
    assert_eq!(task.attachments.len(), 2);
    assert_eq!(task.attachments[0], "https://example.com/a.png");

    let err = tasks::remove_task_attachment(&store, &cookie, IP, Some(9), &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Attachment not found");

    let err = tasks::remove_task_attachment(&store, &cookie, IP, None, &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing task index");
}

#[actix_rt::test]
async fn test_task_checklists() {
    let (store, cookie, list_id, task_id) = store_with_task().await;

    let response =
        tasks::add_task_checklists(&store, &cookie, IP, &[checklist("Preparation")], &task_id)
            .await
            .unwrap();
    assert_eq!(response.message, "Created checklist");

    let err = tasks::add_task_checklists(&store, &cookie, IP, &[], &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklists");

    let err = tasks::add_task_checklists(&store, &cookie, IP, &[checklist("")], &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist title");

    let response = tasks::update_task_checklist_title(
        &store,
        &cookie,
        IP,
        Some(0),
        "Pre-appointment prep",
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Updated checklist title");

    let err =
        tasks::update_task_checklist_title(&store, &cookie, IP, Some(5), "Nope", &task_id)
            .await
            .unwrap_err();
    assert_bad_request(&err, "Missing checklist");

    let err = tasks::update_task_checklist_title(&store, &cookie, IP, None, "Nope", &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist ID or new checklist title");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert_eq!(list.tasks[0].checklist.len(), 1);
    assert_eq!(list.tasks[0].checklist[0].title, "Pre-appointment prep");
}

#[actix_rt::test]
async fn test_checklist_due_and_reminder_dates() {
    let (store, cookie, list_id, task_id) = store_with_task().await;
    tasks::add_task_checklists(&store, &cookie, IP, &[checklist("Preparation")], &task_id)
        .await
        .unwrap();

    let response = tasks::due_task_checklist(
        &store,
        &cookie,
        IP,
        Some(0),
        "2026-09-01T09:00:00Z",
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Updated checklist due date");

    let err = tasks::due_task_checklist(&store, &cookie, IP, Some(0), "next tuesday", &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Invalid date");

    let err = tasks::due_task_checklist(&store, &cookie, IP, None, "2026-09-01T09:00:00Z", &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist due date or checklist ID");

    let response = tasks::remind_task_checklist(
        &store,
        &cookie,
        IP,
        Some(0),
        "2026-08-31T09:00:00Z",
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Updated reminder due date");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert!(list.tasks[0].checklist[0].due.is_some());
    assert!(list.tasks[0].checklist[0].reminder.is_some());

    let response = tasks::remove_task_checklist_due(&store, &cookie, IP, Some(0), &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Removed checklist due date");

    let response = tasks::remove_task_checklist_reminder(&store, &cookie, IP, Some(0), &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Removed checklist reminder date");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert!(list.tasks[0].checklist[0].due.is_none());
    assert!(list.tasks[0].checklist[0].reminder.is_none());
}

#[actix_rt::test]
async fn test_checklist_steps() {
    let (store, cookie, list_id, task_id) = store_with_task().await;
    tasks::add_task_checklists(&store, &cookie, IP, &[checklist("Preparation")], &task_id)
        .await
        .unwrap();

    let response = tasks::add_checklist_steps(
        &store,
        &cookie,
        IP,
        &["Check emails".into(), "Pack bag".into()],
        Some(0),
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Added steps to checklist");

    let err = tasks::add_checklist_steps(&store, &cookie, IP, &["Step".into()], None, &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist ID");

    let err = tasks::add_checklist_steps(&store, &cookie, IP, &["Step".into()], Some(4), &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist");

    let response = tasks::update_checklist_step(
        &store,
        &cookie,
        IP,
        "Check emails twice",
        Some(0),
        Some(0),
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Updated checklist step");

    let err = tasks::update_checklist_step(&store, &cookie, IP, "Nope", Some(7), Some(0), &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist step");

    let response = tasks::remove_checklist_step(&store, &cookie, IP, Some(1), Some(0), &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Removed checklist step");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    let steps = &list.tasks[0].checklist[0].steps;
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].step, "Check emails twice");
    assert!(!steps[0].completed);
}

#[actix_rt::test]
async fn test_toggle_checklist_step_round_trip() {
    let (store, cookie, _, task_id) = store_with_task().await;
    tasks::add_task_checklists(&store, &cookie, IP, &[checklist("Preparation")], &task_id)
        .await
        .unwrap();
    tasks::add_checklist_steps(&store, &cookie, IP, &["Check emails".into()], Some(0), &task_id)
        .await
        .unwrap();

    let response =
        tasks::toggle_complete_checklist_step(&store, &cookie, IP, Some(0), Some(0), &task_id)
            .await
            .unwrap();
    assert_eq!(response.message, "Checklist step completed");

    let response =
        tasks::toggle_complete_checklist_step(&store, &cookie, IP, Some(0), Some(0), &task_id)
            .await
            .unwrap();
    assert_eq!(response.message, "Checklist step uncompleted");

    let err = tasks::toggle_complete_checklist_step(&store, &cookie, IP, Some(3), Some(0), &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist step");
}

#[actix_rt::test]
async fn test_toggle_complete_task_is_involutive() {
    let (store, cookie, list_id, task_id) = store_with_task().await;

    let response = tasks::toggle_complete_task(&store, &cookie, IP, &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Task completed");

    let response = tasks::toggle_complete_task(&store, &cookie, IP, &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Task uncompleted");

    // Two toggles return the task to its original state.
    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert!(!list.tasks[0].completed);
}

#[actix_rt::test]
async fn test_update_task_cover() {
    let (store, cookie, list_id, task_id) = store_with_task().await;

    let response = tasks::update_task_cover(
        &store,
        &cookie,
        IP,
        "https://example.com/cover.jpg",
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.message, "Updated task cover");

    let err = tasks::update_task_cover(&store, &cookie, IP, "invalid-url", &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Invalid URL");

    let err = tasks::update_task_cover(&store, &cookie, IP, "", &task_id).await.unwrap_err();
    assert_bad_request(&err, "Missing task cover");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert_eq!(
        list.tasks[0].cover.as_deref(),
        Some("https://example.com/cover.jpg")
    );
}

#[actix_rt::test]
async fn test_remove_checklist_and_task() {
    let (store, cookie, list_id, task_id) = store_with_task().await;
    tasks::add_task_checklists(&store, &cookie, IP, &[checklist("Preparation")], &task_id)
        .await
        .unwrap();

    let err = tasks::remove_task_checklist(&store, &cookie, IP, Some(4), &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Missing checklist");

    let response = tasks::remove_task_checklist(&store, &cookie, IP, Some(0), &task_id)
        .await
        .unwrap();
    assert_eq!(response.message, "Removed task checklist");

    let response = tasks::remove_task(&store, &cookie, IP, &task_id).await.unwrap();
    assert_eq!(response.message, "Removed task");

    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert!(list.tasks.is_empty());

    // The embedding list is no longer findable through the task.
    let err = tasks::verify_task_owner(&store, &cookie, IP, &task_id)
        .await
        .unwrap_err();
    assert_bad_request(&err, "Task or list does not exist");
}

#[actix_rt::test]
async fn test_non_owner_is_rejected_on_every_task_operation() {
    let (store, _owner_cookie, _, task_id) = store_with_task().await;

    auth::create_user(&store, "Mallory", "mallory@felixisaac.dev", PASSWORD)
        .await
        .unwrap();
    let intruder = auth::login_user(&store, "mallory@felixisaac.dev", PASSWORD, IP)
        .await
        .unwrap();

    // Perfectly valid inputs everywhere; only the session differs.
    let err = tasks::update_task_title(&store, &intruder, IP, "Stolen", &task_id)
        .await
        .unwrap_err();
    assert_unauthorized(&err, "Unauthorized to perform this action");

    let err = tasks::add_task_attachments(
        &store,
        &intruder,
        IP,
        &["https://example.com/x.png".into()],
        &task_id,
    )
    .await
    .unwrap_err();
    assert_unauthorized(&err, "Unauthorized to perform this action");

    let err = tasks::add_task_checklists(&store, &intruder, IP, &[checklist("Theirs")], &task_id)
        .await
        .unwrap_err();
    assert_unauthorized(&err, "Unauthorized to perform this action");

    let err = tasks::toggle_complete_task(&store, &intruder, IP, &task_id)
        .await
        .unwrap_err();
    assert_unauthorized(&err, "Unauthorized to perform this action");

    let err = tasks::remove_task(&store, &intruder, IP, &task_id).await.unwrap_err();
    assert_unauthorized(&err, "Unauthorized to perform this action");

    // And the ownership check itself reports a clean non-owner.
    let ownership = tasks::verify_task_owner(&store, &intruder, IP, &task_id)
        .await
        .unwrap();
    assert!(!ownership.owner);
}

/// The full journey a first-time user takes, end to end.
#[test_log::test(actix_rt::test)]
async fn test_first_session_end_to_end() {
    let store = MemoryStore::new();

    let response = auth::create_user(&store, "Felix", "felix@x.dev", "Strong#Pass1")
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let cookie = auth::login_user(&store, "felix@x.dev", "Strong#Pass1", IP)
        .await
        .unwrap();

    let response = lists::create_list(&store, &cookie, IP, "My Day", Some(""))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    let user = auth::get_user_by_cookie(&store, &cookie, IP).await.unwrap();
    assert_eq!(user.lists.len(), 1);
    let list_id = user.lists[0];

    let response = tasks::create_task(&store, &cookie, IP, "Go to dentist", &list_id)
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    let list = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap().data;
    assert_eq!(list.tasks.len(), 1);
    let task_id = list.tasks[0].id;

    let response = tasks::add_task_checklists(&store, &cookie, IP, &[checklist("Prep")], &task_id)
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let response = tasks::add_checklist_steps(
        &store,
        &cookie,
        IP,
        &["Check emails".into()],
        Some(0),
        &task_id,
    )
    .await
    .unwrap();
    assert_eq!(response.status, 200);

    let response =
        tasks::toggle_complete_checklist_step(&store, &cookie, IP, Some(0), Some(0), &task_id)
            .await
            .unwrap();
    assert_eq!(response.message, "Checklist step completed");

    let response =
        tasks::toggle_complete_checklist_step(&store, &cookie, IP, Some(0), Some(0), &task_id)
            .await
            .unwrap();
    assert_eq!(response.message, "Checklist step uncompleted");

    let response = lists::remove_list(&store, &cookie, IP, &list_id).await.unwrap();
    assert_eq!(response.status, 200);

    let err = lists::get_list(&store, &cookie, IP, &list_id).await.unwrap_err();
    assert_bad_request(&err, "List does not exist");
}
