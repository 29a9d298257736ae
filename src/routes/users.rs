//!
//! Account route handlers. Each handler extracts the session cookie and
//! client IP where needed, calls exactly one operation from `auth`, and
//! mirrors its `{status, body}` back. Login additionally sets the session
//! cookie; logout clears it.

use actix_web::cookie::{time::Duration, Cookie};
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth;
use crate::error::{AppError, OpResponse};
use crate::routes::{client_ip, AppState, SESSION_COOKIE};

const SESSION_TTL_DAYS: i64 = 14;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUsernameRequest {
    #[serde(default)]
    new_username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    code: Option<String>,
    #[serde(default)]
    new_email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    password: String,
    #[serde(default)]
    new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveUserRequest {
    #[serde(default)]
    password: String,
}

/// Returns the caller's own account record, resolved from the session
/// cookie. Missing cookie → bare 401, matching every other protected route.
#[get("")]
pub async fn get_user(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let session = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie,
        None => return Ok(HttpResponse::Unauthorized().json(json!({}))),
    };

    let response = auth::get_user(state.store.as_ref(), session.value(), &client_ip(&req)).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Register a new account.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let response = auth::create_user(
        state.store.as_ref(),
        &body.username,
        &body.email,
        &body.password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Authenticate and set the session cookie.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let token = auth::login_user(
        state.store.as_ref(),
        &body.email,
        &body.password,
        &client_ip(&req),
    )
    .await?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(Duration::days(SESSION_TTL_DAYS))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(OpResponse::ok("Logging in")))
}

/// Clear the session cookie. Sessions are self-contained, so there is
/// nothing server-side to invalidate.
#[get("/logout")]
pub async fn logout() -> impl Responder {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(OpResponse::ok("Logging out"))
}

#[patch("/change/username/{id}")]
pub async fn change_username(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<ChangeUsernameRequest>,
) -> Result<impl Responder, AppError> {
    let response = auth::change_username(
        state.store.as_ref(),
        &id.into_inner(),
        &body.new_username,
        &body.password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Two-in-one, as the flow is two-step: a body carrying `code` confirms a
/// pending change; otherwise a new confirmation code is issued for
/// `newEmail`.
#[patch("/change/email/{id}")]
pub async fn change_email(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<ChangeEmailRequest>,
) -> Result<impl Responder, AppError> {
    if let Some(code) = &body.code {
        let response =
            auth::verify_email_change(state.store.as_ref(), code, &body.password).await?;
        return Ok(HttpResponse::Ok().json(response));
    }

    let response = auth::change_email(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.domain_name,
        &id.into_inner(),
        &body.new_email,
        &body.password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[patch("/change/password/{id}")]
pub async fn change_password(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    let response = auth::change_password(
        state.store.as_ref(),
        &id.into_inner(),
        &body.password,
        &body.new_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[delete("/{id}")]
pub async fn remove_user(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<RemoveUserRequest>,
) -> Result<impl Responder, AppError> {
    let response =
        auth::remove_user(state.store.as_ref(), &id.into_inner(), &body.password).await?;

    Ok(HttpResponse::Ok().json(response))
}
