//! JSON API consumed by the dashboard client. Mounted under `/api`.

use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Utc;
use serde_json::json;

use crate::domain::types::{LeadId, WorkId};
use crate::dto::api::{LeadView, LeadsResponse};
use crate::dto::leads::LeadsQuery;
use crate::forms::leads::{CreateLeadPayload, CreateLeadRequest};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::today;
use crate::services::users::resolve_user;
use crate::services::{
    ServiceError, leads as leads_service, stats as stats_service, users as users_service,
    works as works_service,
};

fn error_body(status: &str, message: impl Into<String>) -> serde_json::Value {
    json!({ "error": status, "message": message.into() })
}

/// Maps a service failure onto an HTTP status with a JSON body.
fn api_error(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            HttpResponse::Forbidden().json(error_body("forbidden", "insufficient role"))
        }
        ServiceError::NotFound => HttpResponse::NotFound().json(error_body("not_found", "not found")),
        ServiceError::Form(message) => {
            HttpResponse::BadRequest().json(error_body("invalid", message))
        }
        ServiceError::TypeConstraint(err) => {
            HttpResponse::BadRequest().json(error_body("invalid", err.to_string()))
        }
        ServiceError::Repository(err) => {
            log::error!("API request failed: {err}");
            HttpResponse::InternalServerError().json(error_body("internal", "internal error"))
        }
    }
}

/// Resolves the caller or returns the error response.
macro_rules! api_user {
    ($repo:expr, $claims:expr) => {
        match resolve_user($repo.get_ref(), &$claims) {
            Ok(user) => user,
            Err(err) => return api_error(err),
        }
    };
}

#[get("/v1/works/stats")]
pub async fn api_v1_work_stats(
    claims: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    match works_service::load_work_stats(repo.get_ref(), &user, today()) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => api_error(err),
    }
}

#[post("/v1/works/{work_id}/complete")]
pub async fn api_v1_complete_work(
    claims: AuthenticatedUser,
    work_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    let work_id = match WorkId::new(work_id.into_inner()) {
        Ok(id) => id,
        Err(_) => return api_error(ServiceError::NotFound),
    };

    match works_service::complete_work(repo.get_ref(), &user, work_id, Utc::now()) {
        Ok(work) => HttpResponse::Ok().json(work),
        Err(err) => api_error(err),
    }
}

#[get("/v1/leads")]
pub async fn api_v1_leads(
    claims: AuthenticatedUser,
    query: web::Query<LeadsQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    let today = today();

    match leads_service::find_leads(repo.get_ref(), &user, &query) {
        Ok((total, leads)) => HttpResponse::Ok().json(LeadsResponse {
            total,
            leads: leads
                .into_iter()
                .map(|lead| LeadView::new(lead, today))
                .collect(),
        }),
        Err(err) => api_error(err),
    }
}

#[post("/v1/leads")]
pub async fn api_v1_create_lead(
    claims: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(request): web::Json<CreateLeadRequest>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    let payload = match CreateLeadPayload::try_from(request) {
        Ok(payload) => payload,
        Err(err) => return api_error(err.into()),
    };

    match leads_service::create_lead(repo.get_ref(), &user, payload) {
        Ok(lead) => HttpResponse::Created().json(LeadView::new(lead, today())),
        Err(err) => api_error(err),
    }
}

#[get("/v1/leads/{lead_id}")]
pub async fn api_v1_lead(
    claims: AuthenticatedUser,
    lead_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    let lead_id = match LeadId::new(lead_id.into_inner()) {
        Ok(id) => id,
        Err(_) => return api_error(ServiceError::NotFound),
    };

    match leads_service::load_lead_response(repo.get_ref(), &user, lead_id, today()) {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(err) => api_error(err),
    }
}

#[get("/v1/users")]
pub async fn api_v1_users(
    claims: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    match users_service::list_users(repo.get_ref(), &user, None) {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(err) => api_error(err),
    }
}

#[get("/v1/stats/dashboard")]
pub async fn api_v1_dashboard_stats(
    claims: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    match stats_service::dashboard_stats(repo.get_ref(), &user, today()) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => api_error(err),
    }
}

#[get("/v1/stats/agents")]
pub async fn api_v1_agent_performance(
    claims: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = api_user!(repo, claims);
    match stats_service::agent_performance(repo.get_ref(), &user, today()) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => api_error(err),
    }
}
