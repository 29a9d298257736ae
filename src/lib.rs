//! The `tasknest` library crate.
//!
//! Core business logic for the personal task-management backend: the
//! credential & session manager (`auth`), ownership-gated list and task
//! operations (`lists`, `tasks`), the document models, and the injected
//! store/mailer collaborators. The binary in `main.rs` wires these
//! together behind actix-web routes.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod lists;
pub mod mail;
pub mod models;
pub mod routes;
pub mod tasks;
pub mod validation;
