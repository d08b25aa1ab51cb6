//! Admin-only pages.

use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::access::Page;
use crate::domain::lead::LeadStatus;
use crate::dto::leads::LeadsQuery;
use crate::dto::works::{NotificationsPageData, RequestState};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, current_user, page_error, render_template, today};
use crate::services::{
    ensure_role, leads as leads_service, stats as stats_service, users as users_service,
    works as works_service,
};

#[get("/admin")]
/// Team-wide numbers and the agent overview table.
pub async fn show_dashboard(
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

    match stats_service::load_admin_dashboard(repo.get_ref(), &user, today()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                Page::AdminDashboard.nav_key(),
                &server_config.auth_service_url,
            );
            context.insert("data", &data);
            render_template(&tera, "admin/index.html", &context)
        }
        Err(err) => page_error(err, "admin dashboard"),
    }
}

#[get("/admin/leads")]
pub async fn show_leads(
    claims: AuthenticatedUser,
    query: web::Query<LeadsQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(err) = ensure_role(&user, Page::AdminLeads.allowed_roles()) {
        return page_error(err, "leads");
    }

    match leads_service::list_leads(repo.get_ref(), &user, query.into_inner(), today()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                Page::AdminLeads.nav_key(),
                &server_config.auth_service_url,
            );
            context.insert("data", &data);
            context.insert("statuses", LeadStatus::ALL);
            context.insert("base_url", Page::AdminLeads.path());
            render_template(&tera, "admin/leads.html", &context)
        }
        Err(err) => page_error(err, "leads"),
    }
}

#[get("/admin/notifications")]
/// Pending and recently completed works across the team.
pub async fn show_notifications(
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
    let today = today();

    let stats = match works_service::load_team_work_stats(repo.get_ref(), &user, today) {
        Ok(stats) => stats,
        Err(err) => return page_error(err, "team notifications"),
    };
    let members = match users_service::list_users(repo.get_ref(), &user, None) {
        Ok(members) => members,
        Err(err) => return page_error(err, "team notifications"),
    };

    let data = NotificationsPageData::from_stats(&stats, today, &members, |_| RequestState::Idle);
    let mut context = base_context(
        &flash_messages,
        &user,
        Page::AdminNotifications.nav_key(),
        &server_config.auth_service_url,
    );
    context.insert("data", &data);
    context.insert("return_to", Page::AdminNotifications.path());
    render_template(&tera, "admin/notifications.html", &context)
}
