pub mod health;
pub mod lists;
pub mod tasks;
pub mod users;

use actix_web::{web, HttpRequest};
use std::sync::Arc;

use crate::db::Store;
use crate::mail::Mailer;

/// Application-wide collaborators, constructed once in `main` and injected
/// into every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    /// Interpolated into confirmation-email links.
    pub domain_name: String,
}

/// Name of the session cookie set on login and cleared on logout.
pub const SESSION_COOKIE: &str = "session";

/// Client IP as seen by the connection. Sessions are bound to it at login
/// and verified against it on every request.
pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::get_user)
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::change_username)
            .service(users::change_email)
            .service(users::change_password)
            .service(users::remove_user),
    )
    .service(
        web::scope("/lists")
            .service(lists::create_list)
            .service(lists::get_list)
            .service(lists::update_list)
            .service(lists::remove_list),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::create_task)
            .service(tasks::update_task)
            .service(tasks::remove_from_task),
    );
}
