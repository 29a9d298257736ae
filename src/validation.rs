//!
//! # Validation Utility
//!
//! Stateless predicate checks for the handful of string shapes the service
//! accepts. These are pure functions; the operations in `auth`, `lists`
//! and `tasks` call them and attach their own per-field error messages.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // RFC-5321-shaped structural check. Length caps (local part <= 64,
    // total <= 254) are enforced separately below because the regex crate
    // has no lookahead.
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[-!#$%&'*+/0-9=?A-Z^_`a-z{|}~]+(\.[-!#$%&'*+/0-9=?A-Z^_`a-z{|}~]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$"
    )
    .unwrap();
    static ref URL_REGEX: Regex = Regex::new(r"^https?://.+\..+$").unwrap();
}

/// A username is valid iff its length is in (3, 32] and it does not contain
/// `:` — the delimiter used to join fields inside encrypted tokens, so a
/// username carrying it would corrupt token parsing.
pub fn is_valid_username(username: &str) -> bool {
    let length = username.chars().count();
    3 < length && length <= 32 && !username.contains(':')
}

/// Structural email check: charset/label rules per the regex above, local
/// part at most 64 characters, 254 characters in total.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > 254 {
        return false;
    }

    match email.split_once('@') {
        Some((local, _)) if local.len() <= 64 => EMAIL_REGEX.is_match(email),
        _ => false,
    }
}

/// A password is valid iff it is at least 8 characters and contains at
/// least one digit, one lowercase letter, one uppercase letter, and one
/// non-word character (anything outside `[A-Za-z0-9_]`).
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| !c.is_alphanumeric() && c != '_')
}

/// Shape check for URL-valued fields (attachments, list icons, task
/// covers): `http(s)://host.tld/...`.
pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}
