//!
//! Task route handlers. The PATCH route multiplexes every task-level
//! mutation behind an `action` path segment, mirroring the list update
//! route; DELETE picks its target from the body (a whole task when no
//! sub-resource is named).

use actix_web::{delete, patch, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ChecklistInput;
use crate::routes::lists::require_session;
use crate::routes::{client_ip, AppState, SESSION_COOKIE};
use crate::tasks;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPatch {
    index: Option<usize>,
    #[serde(default)]
    attachment: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPatch {
    index: Option<usize>,
    #[serde(default)]
    new_title: String,
    #[serde(default)]
    due: String,
    #[serde(default)]
    reminder: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPatch {
    checklist: Option<usize>,
    step: Option<usize>,
    #[serde(default)]
    new_step: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    new_title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    cover: String,
    #[serde(default)]
    attachments: Vec<String>,
    #[serde(default)]
    attachment: AttachmentPatch,
    #[serde(default)]
    checklists: Vec<ChecklistInput>,
    #[serde(default)]
    checklist: ChecklistPatch,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    step: StepPatch,
}

/// Selects what a DELETE removes. With no sub-resource named, the whole
/// task goes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromTaskRequest {
    attachment: Option<usize>,
    checklist: Option<usize>,
    due: Option<usize>,
    reminder: Option<usize>,
    step: Option<StepPatch>,
}

#[post("/{list_id}")]
pub async fn create_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    list_id: web::Path<Uuid>,
    body: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let session = require_session!(req);

    let response = tasks::create_task(
        state.store.as_ref(),
        session.value(),
        &client_ip(&req),
        &body.title,
        &list_id.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[patch("/{task_id}/{action}")]
pub async fn update_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, String)>,
    body: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let session = require_session!(req);
    let (task_id, action) = path.into_inner();
    let store = state.store.as_ref();
    let cookie = session.value();
    let ip = client_ip(&req);
    let body = body.into_inner();

    let response = match action.to_lowercase().as_str() {
        "title" => tasks::update_task_title(store, cookie, &ip, &body.new_title, &task_id).await?,
        "description" => {
            tasks::change_task_description(store, cookie, &ip, &body.description, &task_id).await?
        }
        "cover" => tasks::update_task_cover(store, cookie, &ip, &body.cover, &task_id).await?,
        "complete" => tasks::toggle_complete_task(store, cookie, &ip, &task_id).await?,
        "attachments" => {
            tasks::add_task_attachments(store, cookie, &ip, &body.attachments, &task_id).await?
        }
        "attachment" => {
            tasks::update_task_attachment(
                store,
                cookie,
                &ip,
                body.attachment.index,
                &body.attachment.attachment,
                &task_id,
            )
            .await?
        }
        "checklists" => {
            tasks::add_task_checklists(store, cookie, &ip, &body.checklists, &task_id).await?
        }
        "checklist-title" => {
            tasks::update_task_checklist_title(
                store,
                cookie,
                &ip,
                body.checklist.index,
                &body.checklist.new_title,
                &task_id,
            )
            .await?
        }
        "due" => {
            tasks::due_task_checklist(
                store,
                cookie,
                &ip,
                body.checklist.index,
                &body.checklist.due,
                &task_id,
            )
            .await?
        }
        "reminder" => {
            tasks::remind_task_checklist(
                store,
                cookie,
                &ip,
                body.checklist.index,
                &body.checklist.reminder,
                &task_id,
            )
            .await?
        }
        "steps" => {
            tasks::add_checklist_steps(
                store,
                cookie,
                &ip,
                &body.steps,
                body.checklist.index,
                &task_id,
            )
            .await?
        }
        "step" => {
            tasks::update_checklist_step(
                store,
                cookie,
                &ip,
                &body.step.new_step,
                body.step.step,
                body.step.checklist,
                &task_id,
            )
            .await?
        }
        "step-complete" => {
            tasks::toggle_complete_checklist_step(
                store,
                cookie,
                &ip,
                body.step.step,
                body.step.checklist,
                &task_id,
            )
            .await?
        }
        _ => return Err(AppError::NotFound("Not Found".into())),
    };

    Ok(HttpResponse::Ok().json(response))
}

#[delete("/{task_id}")]
pub async fn remove_from_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    task_id: web::Path<Uuid>,
    body: Option<web::Json<RemoveFromTaskRequest>>,
) -> Result<impl Responder, AppError> {
    let session = require_session!(req);
    let task_id = task_id.into_inner();
    let store = state.store.as_ref();
    let cookie = session.value();
    let ip = client_ip(&req);
    // No body at all means "remove the whole task".
    let body = body.map(web::Json::into_inner).unwrap_or_default();

    let response = if let Some(step) = body.step {
        tasks::remove_checklist_step(store, cookie, &ip, step.step, step.checklist, &task_id)
            .await?
    } else if body.attachment.is_some() {
        tasks::remove_task_attachment(store, cookie, &ip, body.attachment, &task_id).await?
    } else if body.due.is_some() {
        tasks::remove_task_checklist_due(store, cookie, &ip, body.due, &task_id).await?
    } else if body.reminder.is_some() {
        tasks::remove_task_checklist_reminder(store, cookie, &ip, body.reminder, &task_id).await?
    } else if body.checklist.is_some() {
        tasks::remove_task_checklist(store, cookie, &ip, body.checklist, &task_id).await?
    } else {
        tasks::remove_task(store, cookie, &ip, &task_id).await?
    };

    Ok(HttpResponse::Ok().json(response))
}
