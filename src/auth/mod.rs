//!
//! # Credential & Session Manager
//!
//! Account lifecycle and session handling: registration, login, cookie
//! validation and resolution, the two-step email-change flow, and the
//! re-authenticated mutations (username, password, account removal).
//!
//! Every operation takes its collaborators (`Store`, `Mailer`) by
//! reference; nothing here holds state between requests. Failure wording
//! is deliberately flat: every credential-class failure reads
//! "Invalid email or password" whether the account exists or not.

pub mod password;
pub mod token;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::crypto;
use crate::db::Store;
use crate::error::{AppError, OpResponse};
use crate::mail::{Mail, Mailer};
use crate::models::{User, UserView};
use crate::validation;

pub use password::{hash_password, verify_password};

const USERNAME_RULE: &str =
    "Username length cannot be more than 32 or less than 3 or cannot include ':'";
const PASSWORD_RULE: &str = "Password too insecure, must have a length of more than eight and include one special character, uppercase, lowercase, and a digit without including ':'.";
const NEW_PASSWORD_RULE: &str = "New password too insecure, must have a length of more than eight and include one special character, uppercase, lowercase, and a digit without including ':'.";

/// Response to a successful `change_email` call: the confirmation code is
/// returned alongside being mailed to the current address.
#[derive(Debug, Serialize)]
pub struct EmailChangeResponse {
    pub error: bool,
    pub status: u16,
    pub message: String,
    pub code: String,
}

/// Response carrying the caller's own account record.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub error: bool,
    pub status: u16,
    pub data: UserView,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".into())
}

/// Registers a new account. Each field is validated with its own rule and
/// its own message; the email is stored encrypted and the password as the
/// identity-salted digest hash. A duplicate email surfaces from the
/// store's unique constraint.
pub async fn create_user(
    store: &dyn Store,
    username: &str,
    email: &str,
    password: &str,
) -> Result<OpResponse, AppError> {
    if !validation::is_valid_username(username) {
        return Err(AppError::BadRequest(USERNAME_RULE.into()));
    }

    if !validation::is_valid_email(email) {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }

    if !validation::is_valid_password(password) {
        return Err(AppError::BadRequest(PASSWORD_RULE.into()));
    }

    let stored_email = crypto::encrypt(email);
    let password_hash = password::hash_password(username, &stored_email, password)?;
    let user = User::new(username, stored_email, password_hash);

    store.insert_user(&user).await?;

    Ok(OpResponse::ok("Successfully created user"))
}

/// Authenticates by email and password and mints a session cookie bound to
/// the client IP. A missing account, a wrong password and a missing IP all
/// fail identically, to avoid leaking account existence.
pub async fn login_user(
    store: &dyn Store,
    email: &str,
    password: &str,
    ip: &str,
) -> Result<String, AppError> {
    let user = store
        .find_user_by_email(&crypto::encrypt(email))
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&user, password) || ip.is_empty() {
        return Err(invalid_credentials());
    }

    token::mint_session(&user.email, ip)
}

/// Resolves a session cookie to the full user record.
///
/// Structural failures (absent/undecryptable/unsplittable token) report
/// "Invalid encrypted code"; a wrong IP or a vanished account reports the
/// flat credential failure.
pub async fn get_user_by_cookie(
    store: &dyn Store,
    cookie: &str,
    ip: &str,
) -> Result<User, AppError> {
    let capsule = token::parse_session(cookie)
        .ok_or_else(|| AppError::Unauthorized("Invalid encrypted code".into()))?;

    if !token::verify_ip(&capsule, ip) {
        return Err(invalid_credentials());
    }

    store
        .find_user_by_email(&capsule.stored_email)
        .await?
        .ok_or_else(invalid_credentials)
}

/// Fail-closed boolean form of [`get_user_by_cookie`]. Any failure,
/// including a store error, reads as "not a valid session".
pub async fn validate_cookie(store: &dyn Store, cookie: &str, ip: &str) -> bool {
    get_user_by_cookie(store, cookie, ip).await.is_ok()
}

/// Returns the caller's own account, resolved from the session cookie.
pub async fn get_user(store: &dyn Store, cookie: &str, ip: &str) -> Result<UserResponse, AppError> {
    let user = get_user_by_cookie(store, cookie, ip).await?;

    Ok(UserResponse {
        error: false,
        status: 200,
        data: UserView::from(&user),
    })
}

/// Changes the username after re-authenticating with the current password.
/// The password hash is salted with the username, so it is recomputed even
/// though the password itself is unchanged.
pub async fn change_username(
    store: &dyn Store,
    id: &Uuid,
    new_username: &str,
    password: &str,
) -> Result<OpResponse, AppError> {
    if !validation::is_valid_username(new_username) {
        return Err(AppError::BadRequest(USERNAME_RULE.into()));
    }

    let mut user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&user, password) {
        return Err(invalid_credentials());
    }

    user.username = new_username.to_string();
    user.authorization.password = password::hash_password(new_username, &user.email, password)?;
    user.updated_at = Utc::now();
    store.save_user(&user).await?;

    Ok(OpResponse::ok("Changed username"))
}

/// First half of the email-change flow. Does NOT change the email —
/// it re-authenticates, then issues a time-boxed confirmation code and
/// mails it to the *current* address. The change only commits through
/// [`verify_email_change`].
pub async fn change_email(
    store: &dyn Store,
    mailer: &dyn Mailer,
    domain_name: &str,
    id: &Uuid,
    new_email: &str,
    password: &str,
) -> Result<EmailChangeResponse, AppError> {
    if !validation::is_valid_email(new_email) {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }

    let user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&user, password) {
        return Err(invalid_credentials());
    }

    // Deterministic encryption makes this a plain equality check.
    if crypto::encrypt(new_email) == user.email {
        return Err(AppError::BadRequest("Cannot be the same email".into()));
    }

    let current_email = crypto::decrypt(&user.email)
        .ok_or_else(|| AppError::InternalServerError("Stored email is unreadable".into()))?;

    let code = token::mint_email_change_code(
        &current_email,
        new_email,
        &user.authorization.password,
        Utc::now(),
    );

    // Best-effort dispatch: a failed send is logged inside the mailer and
    // never fails the operation.
    mailer
        .send(Mail {
            from: format!("no-reply@{}", domain_name),
            to: current_email,
            subject: "Confirm your email change".into(),
            text: format!(
                "A change of your account email to {} was requested. Confirm it within 10 minutes: https://{}/confirm-email?code={}",
                new_email, domain_name, code
            ),
        })
        .await;

    Ok(EmailChangeResponse {
        error: false,
        status: 200,
        message: "Sent email confirmation".into(),
        code,
    })
}

/// Second half of the email-change flow: verifies a confirmation code plus
/// the account password and commits the new address.
///
/// Codes are not registered server-side; a code stays syntactically valid
/// until its embedded timestamp expires, and becomes unusable after a
/// successful change only because the embedded current email no longer
/// matches any account.
pub async fn verify_email_change(
    store: &dyn Store,
    code: &str,
    password: &str,
) -> Result<OpResponse, AppError> {
    let parsed = token::parse_email_change_code(code)
        .ok_or_else(|| AppError::Unauthorized("Invalid encrypted code".into()))?;

    let invalid = || AppError::Unauthorized("Invalid code or password".into());

    if parsed.expired(Utc::now()) {
        return Err(invalid());
    }

    let mut user = store
        .find_user_by_email(&crypto::encrypt(&parsed.current_email))
        .await?
        .ok_or_else(invalid)?;

    // The code was fingerprinted against the credential at issue time; a
    // password change since then kills it.
    if parsed.fingerprint != user.authorization.password {
        return Err(invalid());
    }

    if !password::verify_password(&user, password) {
        return Err(invalid());
    }

    user.email = crypto::encrypt(&parsed.new_email);
    user.authorization.password = password::hash_password(&user.username, &user.email, password)?;
    user.updated_at = Utc::now();
    store.save_user(&user).await?;

    Ok(OpResponse::ok("Changed email"))
}

/// Changes the password after re-authenticating with the current one.
pub async fn change_password(
    store: &dyn Store,
    id: &Uuid,
    password: &str,
    new_password: &str,
) -> Result<OpResponse, AppError> {
    if !validation::is_valid_password(new_password) {
        return Err(AppError::BadRequest(NEW_PASSWORD_RULE.into()));
    }

    let mut user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&user, password) {
        return Err(invalid_credentials());
    }

    user.authorization.password = password::hash_password(&user.username, &user.email, new_password)?;
    user.updated_at = Utc::now();
    store.save_user(&user).await?;

    Ok(OpResponse::ok("Changed password"))
}

/// Deletes the account after re-authenticating. Owned lists are not
/// cascaded; they remain as unreachable garbage.
pub async fn remove_user(
    store: &dyn Store,
    id: &Uuid,
    password: &str,
) -> Result<OpResponse, AppError> {
    let user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&user, password) {
        return Err(invalid_credentials());
    }

    store.delete_user(id).await?;

    Ok(OpResponse::ok("Removed user"))
}
