//! HTTP handlers and the helpers shared between them.

use std::collections::HashMap;

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use chrono::{Local, NaiveDate};
use tera::{Context, Tera, Value};

use crate::domain::user::User;
use crate::formatting::{format_date, format_inr};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::users::resolve_user;

pub mod admin;
pub mod agent;
pub mod api;
pub mod auth;

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Context every page starts from: alerts, the signed-in user and the active
/// navigation entry.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &User,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context
}

/// Calendar date the dashboards are computed for.
///
/// Stored timestamps are converted to local time when read, see
/// [`crate::models::local_time`], so both sides use this calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local record of the signed-in user, or the error page to answer with.
pub fn current_user(
    repo: &DieselRepository,
    claims: &AuthenticatedUser,
) -> Result<User, HttpResponse> {
    resolve_user(repo, claims).map_err(|err| {
        log::error!("Failed to resolve user {}: {err}", claims.email);
        HttpResponse::InternalServerError().finish()
    })
}

/// Response for a page whose data could not be loaded.
pub fn page_error(err: ServiceError, what: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("You do not have access to this page.").send();
            redirect("/na")
        }
        ServiceError::NotFound => {
            FlashMessage::error(format!("{what} not found.")).send();
            redirect("/")
        }
        err => {
            log::error!("Failed to load {what}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Keeps post-action redirects on this site.
///
/// Accepts only an absolute path with no authority part. Browsers read `\`
/// as `/`, so any backslash is refused along with control characters.
pub fn local_path<'a>(candidate: Option<&'a str>, fallback: &'a str) -> &'a str {
    match candidate {
        Some(path) if is_local_path(path) => path,
        _ => fallback,
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c == '\\' || c.is_control())
}

fn inr_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::Number(n) => Ok(Value::String(format_inr(n.as_f64().unwrap_or_default()))),
        other => Err(tera::Error::msg(format!("inr filter expects a number, got {other}"))),
    }
}

fn date_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let Some(text) = value.as_str() else {
        return Ok(Value::String(String::new()));
    };
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(|date| Value::String(format_date(date)))
        .map_err(|err| tera::Error::msg(format!("date filter cannot parse '{text}': {err}")))
}

/// Registers the `inr` and `short_date` filters used by the templates.
pub fn register_filters(tera: &mut Tera) {
    tera.register_filter("inr", inr_filter);
    tera.register_filter("short_date", date_filter);
}
