//!
//! # List Operations
//!
//! Ownership authorization for lists plus every list-level mutation.
//! Ownership is re-derived from the session cookie on every call — there
//! is no trusted-client notion of a "current list", so a caller can never
//! smuggle in another user's list ID.

use serde::Serialize;
use uuid::Uuid;

use crate::auth;
use crate::db::Store;
use crate::error::{AppError, OpResponse};
use crate::models::{List, User};
use crate::validation;

/// Result of an ownership check. A legitimate non-owner is NOT an error —
/// callers must inspect `owner` and map `false` to 401 themselves.
#[derive(Debug)]
pub struct ListOwnership {
    pub user: User,
    pub owner: bool,
}

/// Success envelope for `get_list`, carrying the full aggregate.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub error: bool,
    pub status: u16,
    pub data: List,
}

pub(crate) fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized to perform this action".into())
}

/// Resolves the session to a user and reports whether that user owns
/// `list_id` (i.e. carries it in their owned-list collection).
pub async fn verify_list_owner(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    list_id: &Uuid,
) -> Result<ListOwnership, AppError> {
    let user = auth::get_user_by_cookie(store, cookie, ip).await?;

    Ok(ListOwnership {
        owner: user.lists.contains(list_id),
        user,
    })
}

/// Creates a list owned by the session's user and records the new ID on
/// both sides of the relationship.
pub async fn create_list(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    name: &str,
    description: Option<&str>,
) -> Result<OpResponse, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Missing list name".into()));
    }

    let mut user = auth::get_user_by_cookie(store, cookie, ip).await?;

    let list = List::new(name, description, user.id);
    store.insert_list(&list).await?;

    user.lists.push(list.id);
    store.save_user(&user).await?;

    Ok(OpResponse::ok("Created list"))
}

/// Fetches a list the session's user owns. Existence is checked first so a
/// deleted list reads as gone rather than as someone else's.
pub async fn get_list(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    list_id: &Uuid,
) -> Result<ListResponse, AppError> {
    let list = store
        .find_list_by_id(list_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("List does not exist".into()))?;

    if !verify_list_owner(store, cookie, ip, list_id).await?.owner {
        return Err(unauthorized());
    }

    Ok(ListResponse {
        error: false,
        status: 200,
        data: list,
    })
}

pub async fn change_name(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    list_id: &Uuid,
    new_name: &str,
) -> Result<OpResponse, AppError> {
    if new_name.trim().is_empty() {
        return Err(AppError::BadRequest("Missing new list name".into()));
    }

    let mut list = store
        .find_list_by_id(list_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("List does not exist".into()))?;

    if !verify_list_owner(store, cookie, ip, list_id).await?.owner {
        return Err(unauthorized());
    }

    list.name = new_name.to_string();
    list.touch();
    store.save_list(&list).await?;

    Ok(OpResponse::ok("Changed list name"))
}

pub async fn update_description(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    list_id: &Uuid,
    description: &str,
) -> Result<OpResponse, AppError> {
    if description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing updated list description".into(),
        ));
    }

    let mut list = store
        .find_list_by_id(list_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("List does not exist".into()))?;

    if !verify_list_owner(store, cookie, ip, list_id).await?.owner {
        return Err(unauthorized());
    }

    list.description = Some(description.to_string());
    list.touch();
    store.save_list(&list).await?;

    Ok(OpResponse::ok("Updated list description"))
}

pub async fn update_icon(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    list_id: &Uuid,
    icon_url: &str,
) -> Result<OpResponse, AppError> {
    if icon_url.trim().is_empty() {
        return Err(AppError::BadRequest("Missing icon URL".into()));
    }

    if !validation::is_valid_url(icon_url) {
        return Err(AppError::BadRequest("Invalid URL".into()));
    }

    let mut list = store
        .find_list_by_id(list_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("List does not exist".into()))?;

    if !verify_list_owner(store, cookie, ip, list_id).await?.owner {
        return Err(unauthorized());
    }

    list.icon = Some(icon_url.to_string());
    list.touch();
    store.save_list(&list).await?;

    Ok(OpResponse::ok("Changed icon URL"))
}

/// Removes a list and its embedded tasks, and drops the ID from the
/// owner's collection. Only the list owner may do this.
pub async fn remove_list(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
    list_id: &Uuid,
) -> Result<OpResponse, AppError> {
    let list = store
        .find_list_by_id(list_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("List does not exist".into()))?;

    let ownership = verify_list_owner(store, cookie, ip, &list.id).await?;

    if !ownership.owner {
        return Err(unauthorized());
    }

    store.delete_list(list_id).await?;

    let mut user = ownership.user;
    user.lists.retain(|id| id != list_id);
    store.save_user(&user).await?;

    Ok(OpResponse::ok("Removed list"))
}
