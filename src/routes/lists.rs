//!
//! List route handlers: thin wrappers over `lists` operations. Every
//! handler requires the session cookie; a missing cookie short-circuits to
//! a bare 401 before any operation runs.

use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::lists;
use crate::routes::{client_ip, AppState, SESSION_COOKIE};

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    #[serde(default)]
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    #[serde(default)]
    new_name: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "iconURL")]
    icon_url: String,
}

macro_rules! require_session {
    ($req:expr) => {
        match $req.cookie(SESSION_COOKIE) {
            Some(cookie) => cookie,
            None => return Ok(HttpResponse::Unauthorized().json(json!({}))),
        }
    };
}

pub(crate) use require_session;

#[post("")]
pub async fn create_list(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateListRequest>,
) -> Result<impl Responder, AppError> {
    let session = require_session!(req);

    let response = lists::create_list(
        state.store.as_ref(),
        session.value(),
        &client_ip(&req),
        &body.name,
        body.description.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[get("/{id}")]
pub async fn get_list(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let session = require_session!(req);

    let response = lists::get_list(
        state.store.as_ref(),
        session.value(),
        &client_ip(&req),
        &id.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Dispatches `name` / `description` / `icon` updates; any other action is
/// an unknown route.
#[patch("/update/{id}/{action}")]
pub async fn update_list(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(Uuid, String)>,
    body: web::Json<UpdateListRequest>,
) -> Result<impl Responder, AppError> {
    let session = require_session!(req);
    let (list_id, action) = path.into_inner();
    let store = state.store.as_ref();
    let ip = client_ip(&req);

    let response = match action.to_lowercase().as_str() {
        "name" => lists::change_name(store, session.value(), &ip, &list_id, &body.new_name).await?,
        "description" => {
            lists::update_description(store, session.value(), &ip, &list_id, &body.description)
                .await?
        }
        "icon" => lists::update_icon(store, session.value(), &ip, &list_id, &body.icon_url).await?,
        _ => return Err(AppError::NotFound("Not Found".into())),
    };

    Ok(HttpResponse::Ok().json(response))
}

#[delete("/{id}")]
pub async fn remove_list(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let session = require_session!(req);

    let response = lists::remove_list(
        state.store.as_ref(),
        session.value(),
        &client_ip(&req),
        &id.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}
