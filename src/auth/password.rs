use crate::crypto;
use crate::error::AppError;
use crate::models::User;
use bcrypt::{hash, verify};

/// Builds the digest that actually gets hashed. The salt material binds the
/// credential to both identity fields:
///
/// `[encrypt(username):username]stored_email password`
///
/// Because username and the stored (encrypted) email are baked in, the
/// stored hash is invalidated whenever either changes — the change flows
/// re-derive it with the verified plaintext password.
fn password_digest(username: &str, stored_email: &str, password: &str) -> String {
    format!(
        "[{}:{}]{}{}",
        crypto::encrypt(username),
        username,
        stored_email,
        password
    )
}

pub fn hash_password(
    username: &str,
    stored_email: &str,
    password: &str,
) -> Result<String, AppError> {
    hash(password_digest(username, stored_email, password), 12)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Recomputes the digest from the user's current identity fields and
/// compares against the stored hash with bcrypt's constant-time
/// comparator. Never errors: a malformed stored hash verifies as `false`.
pub fn verify_password(user: &User, password: &str) -> bool {
    verify(
        password_digest(&user.username, &user.email, password),
        &user.authorization.password,
    )
    .unwrap_or(false)
}
