//!
//! # Document Store Collaborator
//!
//! Persistence for the two document shapes this service owns: `User` and
//! `List` (tasks and everything below them are embedded in the list
//! document). The core operations are written against the [`Store`] trait
//! and receive an implementation by reference — the connection is
//! constructed once at process start and injected, never reached as a
//! module-level singleton.
//!
//! Two implementations ship: [`MongoStore`] for production and
//! [`MemoryStore`], which backs the test suites the way the original
//! deployment's in-memory database did.

use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Client, Collection, IndexModel};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{List, User};

/// Persistence seam for users and list aggregates.
///
/// Writes are whole-document: `save_list` rewrites the entire aggregate,
/// which is what makes concurrent writers to the same list
/// last-writer-wins.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a new user. Fails with a 400 `AppError` when the email is
    /// already taken — uniqueness is enforced here, not pre-checked by
    /// callers.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;
    async fn save_user(&self, user: &User) -> Result<(), AppError>;
    async fn delete_user(&self, id: &Uuid) -> Result<(), AppError>;
    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError>;
    /// Lookup by the stored (encrypted) email form.
    async fn find_user_by_email(&self, stored_email: &str) -> Result<Option<User>, AppError>;

    async fn insert_list(&self, list: &List) -> Result<(), AppError>;
    async fn save_list(&self, list: &List) -> Result<(), AppError>;
    async fn delete_list(&self, id: &Uuid) -> Result<(), AppError>;
    async fn find_list_by_id(&self, id: &Uuid) -> Result<Option<List>, AppError>;
    /// Finds the list embedding the given task, expected unique.
    async fn find_list_by_task(&self, task_id: &Uuid) -> Result<Option<List>, AppError>;
}

/// MongoDB-backed store.
pub struct MongoStore {
    users: Collection<User>,
    lists: Collection<List>,
}

impl MongoStore {
    /// Connects and ensures the unique index on `users.email` that backs
    /// duplicate-registration detection.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        let users = db.collection::<User>("users");
        let lists = db.collection::<List>("lists");

        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        log::info!("Connected to {} database", database);
        Ok(Self { users, lists })
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert_one(user).await?;
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        self.users
            .replace_one(doc! { "id": user.id.to_string() }, user)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: &Uuid) -> Result<(), AppError> {
        self.users.delete_one(doc! { "id": id.to_string() }).await?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.find_one(doc! { "id": id.to_string() }).await?)
    }

    async fn find_user_by_email(&self, stored_email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_one(doc! { "email": stored_email }).await?)
    }

    async fn insert_list(&self, list: &List) -> Result<(), AppError> {
        self.lists.insert_one(list).await?;
        Ok(())
    }

    async fn save_list(&self, list: &List) -> Result<(), AppError> {
        self.lists
            .replace_one(doc! { "id": list.id.to_string() }, list)
            .await?;
        Ok(())
    }

    async fn delete_list(&self, id: &Uuid) -> Result<(), AppError> {
        self.lists.delete_one(doc! { "id": id.to_string() }).await?;
        Ok(())
    }

    async fn find_list_by_id(&self, id: &Uuid) -> Result<Option<List>, AppError> {
        Ok(self.lists.find_one(doc! { "id": id.to_string() }).await?)
    }

    async fn find_list_by_task(&self, task_id: &Uuid) -> Result<Option<List>, AppError> {
        Ok(self
            .lists
            .find_one(doc! { "tasks.id": task_id.to_string() })
            .await?)
    }
}

/// In-memory store used by the test suites and local development.
/// Mirrors `MongoStore` semantics, including the unique email constraint.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    lists: RwLock<HashMap<Uuid, List>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(AppError::BadRequest("Email already in use".into()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: &Uuid) -> Result<(), AppError> {
        self.users.write().await.remove(id);
        Ok(())
    }

    async fn find_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_user_by_email(&self, stored_email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == stored_email)
            .cloned())
    }

    async fn insert_list(&self, list: &List) -> Result<(), AppError> {
        self.lists.write().await.insert(list.id, list.clone());
        Ok(())
    }

    async fn save_list(&self, list: &List) -> Result<(), AppError> {
        self.lists.write().await.insert(list.id, list.clone());
        Ok(())
    }

    async fn delete_list(&self, id: &Uuid) -> Result<(), AppError> {
        self.lists.write().await.remove(id);
        Ok(())
    }

    async fn find_list_by_id(&self, id: &Uuid) -> Result<Option<List>, AppError> {
        Ok(self.lists.read().await.get(id).cloned())
    }

    async fn find_list_by_task(&self, task_id: &Uuid) -> Result<Option<List>, AppError> {
        Ok(self
            .lists
            .read()
            .await
            .values()
            .find(|list| list.tasks.iter().any(|task| task.id == *task_id))
            .cloned())
    }
}
