use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use tasknest::config::Config;
use tasknest::db::MongoStore;
use tasknest::mail::SmtpMailer;
use tasknest::routes::{self, health, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let store = MongoStore::connect(&config.mongodb_uri, &config.database_name)
        .await
        .expect("Failed to connect to database");

    let mailer = SmtpMailer::new(
        &config.smtp_host,
        config.smtp_username.clone(),
        config.smtp_password.clone(),
    )
    .expect("Failed to build SMTP transport");

    let state = AppState {
        store: Arc::new(store),
        mailer: Arc::new(mailer),
        domain_name: config.domain_name.clone(),
    };

    log::info!(
        "Starting server at http://{}:{}",
        config.server_host,
        config.server_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
