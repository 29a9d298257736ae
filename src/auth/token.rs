//!
//! Self-contained encrypted capsules: the session cookie and the
//! email-change confirmation code. Neither is persisted — each carries
//! everything verification needs, joined with `:` (which the validation
//! rules keep out of every embedded field) and sealed with the
//! deterministic transform in `crypto`.

use chrono::{DateTime, Duration, Utc};

use crate::crypto;
use crate::error::AppError;

/// bcrypt cost for the client-IP hash inside session capsules. Deliberately
/// low: the hash only binds a short-lived cookie to an address, and it is
/// recomputed on every login.
const IP_HASH_COST: u32 = 6;

/// Hard TTL for email-change confirmation codes.
const EMAIL_CHANGE_TTL_MINUTES: i64 = 10;

/// Parsed contents of a session cookie.
#[derive(Debug)]
pub struct SessionCapsule {
    /// The account's email in its stored (encrypted-at-rest) form — the
    /// direct lookup key for the user document.
    pub stored_email: String,
    /// bcrypt hash of the client IP the session was minted for.
    pub ip_hash: String,
}

/// Mints a session cookie for a user and client IP:
/// `encrypt( encrypt(stored_email) : bcrypt(ip) )`.
///
/// The email side is reversible (it has to resolve a user later); the IP
/// side is one-way by design — verification compares, never decrypts.
pub fn mint_session(stored_email: &str, ip: &str) -> Result<String, AppError> {
    let ip_hash = bcrypt::hash(ip, IP_HASH_COST)?;
    Ok(crypto::encrypt(&format!(
        "{}:{}",
        crypto::encrypt(stored_email),
        ip_hash
    )))
}

/// Unseals a session cookie. Returns `None` when the token is empty, does
/// not decrypt, does not split into its two fields, or the embedded email
/// does not decrypt — the caller treats all of these identically.
pub fn parse_session(token: &str) -> Option<SessionCapsule> {
    if token.is_empty() {
        return None;
    }

    let plaintext = crypto::decrypt(token)?;
    let (sealed_email, ip_hash) = plaintext.split_once(':')?;
    let stored_email = crypto::decrypt(sealed_email)?;

    Some(SessionCapsule {
        stored_email,
        ip_hash: ip_hash.to_string(),
    })
}

/// Checks a client IP against the capsule's embedded hash. An empty IP
/// fails closed.
pub fn verify_ip(capsule: &SessionCapsule, ip: &str) -> bool {
    !ip.is_empty() && bcrypt::verify(ip, &capsule.ip_hash).unwrap_or(false)
}

/// Parsed contents of an email-change confirmation code.
#[derive(Debug)]
pub struct EmailChangeCode {
    pub current_email: String,
    pub new_email: String,
    /// The stored password hash at issue time. A password change between
    /// issue and confirmation makes the code dead on arrival.
    pub fingerprint: String,
    pub issued_at: DateTime<Utc>,
}

impl EmailChangeCode {
    /// TTL is enforced purely by this embedded timestamp; there is no
    /// server-side registry of outstanding codes.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::minutes(EMAIL_CHANGE_TTL_MINUTES)
    }
}

/// Seals an email-change confirmation code:
/// `encrypt( current_email : new_email : fingerprint : issue_millis )`.
pub fn mint_email_change_code(
    current_email: &str,
    new_email: &str,
    fingerprint: &str,
    issued_at: DateTime<Utc>,
) -> String {
    crypto::encrypt(&format!(
        "{}:{}:{}:{}",
        current_email,
        new_email,
        fingerprint,
        issued_at.timestamp_millis()
    ))
}

/// Unseals a confirmation code; `None` for anything that does not decrypt
/// into exactly the four expected fields with a numeric timestamp.
pub fn parse_email_change_code(code: &str) -> Option<EmailChangeCode> {
    let plaintext = crypto::decrypt(code)?;
    let fields: Vec<&str> = plaintext.split(':').collect();
    let [current_email, new_email, fingerprint, millis] = fields.as_slice() else {
        return None;
    };

    let millis: i64 = millis.parse().ok()?;
    let issued_at = DateTime::<Utc>::from_timestamp_millis(millis)?;

    Some(EmailChangeCode {
        current_email: current_email.to_string(),
        new_email: new_email.to_string(),
        fingerprint: fingerprint.to_string(),
        issued_at,
    })
}
