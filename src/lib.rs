#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::{establish_connection_pool, run_pending_migrations};
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;

pub mod access;
pub mod db;
pub mod domain;
pub mod dto;
pub mod formatting;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Registers every page and API handler.
///
/// Pages sit behind [`RedirectUnauthorized`]; the sign-in hand-off and the JSON
/// API answer on their own.
#[cfg(feature = "server")]
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    use crate::routes::{admin, agent, api, auth};

    cfg.service(auth::signin)
        .service(auth::callback)
        .service(
            web::scope("/api")
                .service(api::api_v1_work_stats)
                .service(api::api_v1_complete_work)
                .service(api::api_v1_leads)
                .service(api::api_v1_create_lead)
                .service(api::api_v1_lead)
                .service(api::api_v1_users)
                .service(api::api_v1_dashboard_stats)
                .service(api::api_v1_agent_performance),
        )
        .service(
            web::scope("")
                .wrap(RedirectUnauthorized)
                .service(auth::index)
                .service(auth::not_assigned)
                .service(auth::logout)
                .service(agent::show_dashboard)
                .service(agent::show_todays_calls)
                .service(agent::show_leads)
                // registered before `/agent/lead/{lead_id}`
                .service(agent::new_lead)
                .service(agent::create_lead)
                .service(agent::show_lead)
                .service(agent::update_lead)
                .service(agent::add_note)
                .service(agent::add_work)
                .service(agent::show_notifications)
                .service(agent::complete_work)
                .service(admin::show_dashboard)
                .service(admin::show_leads)
                .service(admin::show_notifications),
        );
}

/// Loads templates from `templates_dir` and installs the custom filters.
#[cfg(feature = "server")]
pub fn load_templates(templates_dir: &str) -> Result<Tera, tera::Error> {
    let mut tera = Tera::new(templates_dir)?;
    routes::register_filters(&mut tera);
    Ok(tera)
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let applied = run_pending_migrations(&pool)
        .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;
    log::info!("Database ready, {applied} migration(s) applied");

    let repo = DieselRepository::new(pool);

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = load_templates(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(actix_web::middleware::Compress::default())
            .wrap(actix_web::middleware::Logger::default())
            .configure(configure_routes)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
