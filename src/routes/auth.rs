//! Sign-in hand-off with the external auth service.

use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Deserialize;
use tera::Tera;

use crate::access::home_path;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, current_user, redirect, render_template};
use crate::services::users::resolve_user;

#[get("/auth/signin")]
pub async fn signin(req: HttpRequest, server_config: web::Data<ServerConfig>) -> impl Responder {
    let info = req.connection_info();
    let callback = format!("{}://{}/auth/callback", info.scheme(), info.host());
    redirect(&format!(
        "{}?redirect_uri={callback}",
        server_config.auth_service_url
    ))
}

#[derive(Deserialize)]
struct CallbackParams {
    token: String,
}

#[get("/auth/callback")]
/// Stores the token issued by the auth service in the identity cookie.
pub async fn callback(
    req: HttpRequest,
    params: web::Query<CallbackParams>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let token = params.into_inner().token;
    let claims = match AuthenticatedUser::from_jwt(&token, &server_config.secret) {
        Ok(claims) => claims,
        Err(err) => {
            log::warn!("Rejected token on sign-in callback: {err}");
            return HttpResponse::Unauthorized().body("invalid token");
        }
    };

    let user = match resolve_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(err) => {
            log::error!("Failed to register user on sign in: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(err) = Identity::login(&req.extensions(), token) {
        log::error!("Failed to store identity: {err}");
        return HttpResponse::InternalServerError().finish();
    }

    log::info!("{} signed in as {}", user.email, user.role);
    redirect(home_path(user.role))
}

#[post("/logout")]
pub async fn logout(user: Identity) -> impl Responder {
    user.logout();
    redirect("/")
}

#[get("/")]
pub async fn index(claims: AuthenticatedUser) -> impl Responder {
    redirect(home_path(claims.role))
}

#[get("/na")]
pub async fn not_assigned(
    claims: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let context = base_context(
        &flash_messages,
        &user,
        "na",
        &server_config.auth_service_url,
    );
    render_template(&tera, "main/not_assigned.html", &context)
}
