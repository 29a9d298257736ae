use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Linked OAuth provider identities. Present on the document for accounts
/// created through a provider; unused by the password flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthAccounts {
    pub google: Option<String>,
    pub facebook: Option<String>,
    pub github: Option<String>,
}

/// Credential material grouped under one sub-document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    /// bcrypt digest salted with identity fields — see `auth::password`.
    /// Invalidated (and recomputed) whenever username or email changes.
    pub password: String,
    pub two_factor: Option<String>,
    #[serde(default)]
    pub oauth: OAuthAccounts,
}

/// A registered account.
///
/// `email` only ever holds the encrypted form (`crypto::encrypt` of the
/// address); lookups go through the same transform. `lists` holds the IDs
/// of the lists this user owns, kept consistent with each list's `user`
/// field on create/remove.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub authorization: Authorization,
    #[serde(default)]
    pub lists: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user record. `stored_email` must already be encrypted
    /// and `password_hash` already digested — this constructor never sees
    /// plaintext credentials.
    pub fn new(username: &str, stored_email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: stored_email,
            authorization: Authorization {
                password: password_hash,
                two_factor: None,
                oauth: OAuthAccounts::default(),
            },
            lists: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public projection of a user record, as returned by `GET /api/users`.
/// The credential block is never serialized out; the email stays in its
/// stored (encrypted) form.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub lists: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            lists: user.lists.clone(),
            created_at: user.created_at,
        }
    }
}
