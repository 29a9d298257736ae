//!
//! # Task Operations
//!
//! Ownership authorization for tasks plus every task-level mutation:
//! title/description/cover, attachments, checklists, checklist steps, and
//! the completion toggles. Each mutation follows the same template —
//! validate inputs, resolve ownership from the session, mutate the list
//! aggregate in memory, append an activity entry, write the whole
//! aggregate back.
//!
//! Attachments, checklists and steps are addressed by index. An index that
//! does not resolve fails with its sub-resource's not-found message before
//! anything is touched. Because the aggregate is rewritten whole,
//! concurrent writers to the same list are last-writer-wins.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth;
use crate::db::Store;
use crate::error::{AppError, OpResponse};
use crate::lists::{self, unauthorized};
use crate::models::{ActivityAction, Checklist, ChecklistInput, List, Step, Task, User};
use crate::validation;

/// Result of a task ownership check: the resolved user, the list embedding
/// the task, and whether they match. Like the list variant, a legitimate
/// non-owner is reported, not raised.
#[derive(Debug)]
pub struct TaskOwnership {
    pub user: User,
    pub list: List,
    pub owner: bool,
}

fn missing_checklist() -> AppError {
    AppError::BadRequest("Missing checklist".into())
}

fn missing_checklist_step() -> AppError {
    AppError::BadRequest("Missing checklist step".into())
}

fn task_not_found() -> AppError {
    AppError::BadRequest("Task or list does not exist".into())
}

async fn persist(store: &dyn Store, mut list: List) -> Result<(), AppError> {
    list.touch();
    store.save_list(&list).await
}

/// Resolves the session to a user, finds the list embedding `task_id`, and
/// compares that list's owner against the user.
pub async fn verify_task_owner(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    task_id: &Uuid,
) -> Result<TaskOwnership, AppError> {
    let user = auth::get_user_by_cookie(store, cookie, ip).await?;

    let list = store
        .find_list_by_task(task_id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(TaskOwnership {
        owner: list.user == user.id,
        user,
        list,
    })
}

/// Loads the owned list embedding `task_id`, failing with 401 for a
/// non-owner. Every mutation below starts here.
async fn owned_list(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    task_id: &Uuid,
) -> Result<List, AppError> {
    let ownership = verify_task_owner(store, cookie, ip, task_id).await?;

    if !ownership.owner {
        return Err(unauthorized());
    }

    Ok(ownership.list)
}

/// Creates a task in a list the session's user owns. The new task carries
/// a seeded CREATE activity entry.
pub async fn create_task(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    title: &str,
    list_id: &Uuid,
) -> Result<OpResponse, AppError> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Missing task title".into()));
    }

    // get_list gates both existence and ownership.
    let mut list = lists::get_list(store, cookie, ip, list_id).await?.data;

    list.tasks.push(Task::new(title));
    persist(store, list).await?;

    Ok(OpResponse::ok("Created task"))
}

pub async fn update_task_title(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    new_title: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    if new_title.trim().is_empty() {
        return Err(AppError::BadRequest("Missing new task title".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;

    let old_title = std::mem::replace(&mut task.title, new_title.to_string());
    task.log(
        ActivityAction::Update,
        format!("Task title from {} to {}", old_title, new_title),
    );

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated task title"))
}

pub async fn change_task_description(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    new_description: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    if new_description.trim().is_empty() {
        return Err(AppError::BadRequest("Missing new task description".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;

    let old_description = task.description.take().unwrap_or_default();
    task.description = Some(new_description.to_string());
    task.log(
        ActivityAction::Update,
        format!(
            "Task description from {} to {}",
            old_description, new_description
        ),
    );

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated task description"))
}

/// Appends attachment URLs to a task. All of them must pass the URL shape
/// check before any is saved.
pub async fn add_task_attachments(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    attachments: &[String],
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    if attachments.is_empty() {
        return Err(AppError::BadRequest("Missing task attachments".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;

    if attachments.iter().any(|url| !validation::is_valid_url(url)) {
        return Err(AppError::BadRequest(
            "One of the attachments has an invalid URL".into(),
        ));
    }

    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    for url in attachments {
        task.attachments.push(url.clone());
        task.log(ActivityAction::Create, format!("Task attachment {}", url));
    }

    let message = if attachments.len() > 1 {
        "Added task attachments"
    } else {
        "Added task attachment"
    };

    persist(store, list).await?;
    Ok(OpResponse::ok(message))
}

pub async fn update_task_attachment(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    attachment_index: Option<usize>,
    attachment: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    if attachment.trim().is_empty() {
        return Err(AppError::BadRequest("Missing task attachment".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;

    if !validation::is_valid_url(attachment) {
        return Err(AppError::BadRequest("Invalid attachment URL".into()));
    }

    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let index = attachment_index
        .filter(|index| *index < task.attachments.len())
        .ok_or_else(|| AppError::BadRequest("Attachment not found".into()))?;

    let old_attachment = std::mem::replace(&mut task.attachments[index], attachment.to_string());
    task.log(
        ActivityAction::Update,
        format!("Task attachment from {} to {}", old_attachment, attachment),
    );

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated attachment"))
}

pub async fn remove_task_attachment(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    attachment_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = attachment_index else {
        return Err(AppError::BadRequest("Missing task index".into()));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;

    if index >= task.attachments.len() {
        return Err(AppError::BadRequest("Attachment not found".into()));
    }

    let removed = task.attachments.remove(index);
    task.log(ActivityAction::Delete, format!("Task attachment {}", removed));

    persist(store, list).await?;
    Ok(OpResponse::ok("Removed attachment"))
}

/// Appends checklists to a task. Every checklist needs a title; steps are
/// added through the step operations afterwards.
pub async fn add_task_checklists(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    checklists: &[ChecklistInput],
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    if checklists.is_empty() {
        return Err(AppError::BadRequest("Missing checklists".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;

    if checklists.iter().any(|input| input.title.trim().is_empty()) {
        return Err(AppError::BadRequest("Missing checklist title".into()));
    }

    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    for input in checklists {
        task.log(ActivityAction::Create, format!("Checklist {}", input.title));
        task.checklist.push(Checklist {
            title: input.title.clone(),
            due: input.due,
            reminder: input.reminder,
            steps: Vec::new(),
        });
    }

    persist(store, list).await?;
    Ok(OpResponse::ok("Created checklist"))
}

pub async fn update_task_checklist_title(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    checklist_index: Option<usize>,
    new_title: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = checklist_index.filter(|_| !new_title.trim().is_empty()) else {
        return Err(AppError::BadRequest(
            "Missing checklist ID or new checklist title".into(),
        ));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task.checklist.get_mut(index).ok_or_else(missing_checklist)?;

    let old_title = std::mem::replace(&mut checklist.title, new_title.to_string());
    task.log(
        ActivityAction::Update,
        format!("Checklist title from {} to {}", old_title, new_title),
    );

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated checklist title"))
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, AppError> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|_| AppError::BadRequest("Invalid date".into()))
}

pub async fn due_task_checklist(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    checklist_index: Option<usize>,
    due: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = checklist_index.filter(|_| !due.trim().is_empty()) else {
        return Err(AppError::BadRequest(
            "Missing checklist due date or checklist ID".into(),
        ));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task.checklist.get_mut(index).ok_or_else(missing_checklist)?;

    checklist.due = Some(parse_date(due)?);
    task.log(ActivityAction::Update, "Due date");

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated checklist due date"))
}

pub async fn remove_task_checklist_due(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    checklist_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = checklist_index else {
        return Err(AppError::BadRequest("Missing checklist ID".into()));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task.checklist.get_mut(index).ok_or_else(missing_checklist)?;

    checklist.due = None;
    task.log(ActivityAction::Delete, "Checklist due date");

    persist(store, list).await?;
    Ok(OpResponse::ok("Removed checklist due date"))
}

pub async fn remind_task_checklist(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    checklist_index: Option<usize>,
    reminder: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = checklist_index.filter(|_| !reminder.trim().is_empty()) else {
        return Err(AppError::BadRequest(
            "Missing checklist reminder date or checklist ID".into(),
        ));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task.checklist.get_mut(index).ok_or_else(missing_checklist)?;

    checklist.reminder = Some(parse_date(reminder)?);
    task.log(ActivityAction::Update, "Reminder date");

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated reminder due date"))
}

pub async fn remove_task_checklist_reminder(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    checklist_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = checklist_index else {
        return Err(AppError::BadRequest("Missing checklist ID".into()));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task.checklist.get_mut(index).ok_or_else(missing_checklist)?;

    checklist.reminder = None;
    task.log(ActivityAction::Delete, "Checklist reminder date");

    persist(store, list).await?;
    Ok(OpResponse::ok("Removed checklist reminder date"))
}

pub async fn add_checklist_steps(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    steps: &[String],
    checklist_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = checklist_index else {
        return Err(AppError::BadRequest("Missing checklist ID".into()));
    };

    if steps.is_empty() {
        return Err(AppError::BadRequest("Missing checklist steps".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task.checklist.get_mut(index).ok_or_else(missing_checklist)?;

    checklist.steps.extend(steps.iter().map(|step| Step {
        step: step.clone(),
        completed: false,
    }));
    task.log(ActivityAction::Create, "Checklist step");

    persist(store, list).await?;
    Ok(OpResponse::ok("Added steps to checklist"))
}

pub async fn update_checklist_step(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    new_step: &str,
    step_index: Option<usize>,
    checklist_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let (Some(checklist_index), Some(step_index)) = (checklist_index, step_index) else {
        return Err(AppError::BadRequest("Missing checklist ID".into()));
    };

    if new_step.trim().is_empty() {
        return Err(AppError::BadRequest("Missing new checklist step".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task
        .checklist
        .get_mut(checklist_index)
        .ok_or_else(missing_checklist)?;
    let step = checklist
        .steps
        .get_mut(step_index)
        .ok_or_else(missing_checklist_step)?;

    step.step = new_step.to_string();
    task.log(ActivityAction::Update, "Checklist step");

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated checklist step"))
}

pub async fn remove_checklist_step(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    step_index: Option<usize>,
    checklist_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let (Some(checklist_index), Some(step_index)) = (checklist_index, step_index) else {
        return Err(AppError::BadRequest("Missing checklist ID".into()));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task
        .checklist
        .get_mut(checklist_index)
        .ok_or_else(missing_checklist)?;

    if step_index >= checklist.steps.len() {
        return Err(missing_checklist_step());
    }

    checklist.steps.remove(step_index);
    task.log(ActivityAction::Delete, "Checklist step");

    persist(store, list).await?;
    Ok(OpResponse::ok("Removed checklist step"))
}

/// Flips a step's completed flag; the reported message follows the
/// resulting state.
pub async fn toggle_complete_checklist_step(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    step_index: Option<usize>,
    checklist_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let (Some(checklist_index), Some(step_index)) = (checklist_index, step_index) else {
        return Err(AppError::BadRequest("Missing checklist ID".into()));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;
    let checklist = task
        .checklist
        .get_mut(checklist_index)
        .ok_or_else(missing_checklist)?;
    let step = checklist
        .steps
        .get_mut(step_index)
        .ok_or_else(missing_checklist_step)?;

    step.completed = !step.completed;
    let message = if step.completed {
        "Checklist step completed"
    } else {
        "Checklist step uncompleted"
    };
    task.log(ActivityAction::Update, message);

    persist(store, list).await?;
    Ok(OpResponse::ok(message))
}

pub async fn update_task_cover(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    cover: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    if cover.trim().is_empty() {
        return Err(AppError::BadRequest("Missing task cover".into()));
    }

    if !validation::is_valid_url(cover) {
        return Err(AppError::BadRequest("Invalid URL".into()));
    }

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;

    task.cover = Some(cover.to_string());
    task.log(ActivityAction::Update, "Task cover");

    persist(store, list).await?;
    Ok(OpResponse::ok("Updated task cover"))
}

/// Flips the task's completed flag; the reported message follows the
/// resulting state.
pub async fn toggle_complete_task(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;

    task.completed = !task.completed;
    let message = if task.completed {
        "Task completed"
    } else {
        "Task uncompleted"
    };
    task.log(ActivityAction::Update, message);

    persist(store, list).await?;
    Ok(OpResponse::ok(message))
}

pub async fn remove_task_checklist(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    checklist_index: Option<usize>,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let Some(index) = checklist_index else {
        return Err(AppError::BadRequest(
            "Missing checklist index or task ID".into(),
        ));
    };

    let mut list = owned_list(store, cookie, ip, task_id).await?;
    let task = list.task_mut(task_id).ok_or_else(task_not_found)?;

    if index >= task.checklist.len() {
        return Err(missing_checklist());
    }

    task.checklist.remove(index);
    task.log(ActivityAction::Delete, "Task checklist");

    persist(store, list).await?;
    Ok(OpResponse::ok("Removed task checklist"))
}

pub async fn remove_task(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    task_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let mut list = owned_list(store, cookie, ip, task_id).await?;

    list.tasks.retain(|task| task.id != *task_id);
    persist(store, list).await?;

    Ok(OpResponse::ok("Removed task"))
}
