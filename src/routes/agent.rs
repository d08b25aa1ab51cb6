//! Pages used by agents (admins may use them too).

use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use serde::Deserialize;
use tera::Tera;

use crate::access::Page;
use crate::domain::lead::{FollowUpStatus, LeadSource, LeadStatus};
use crate::domain::types::{LeadId, WorkId};
use crate::domain::user::UserRole;
use crate::dto::admin::CommissionSummary;
use crate::dto::leads::LeadsQuery;
use crate::dto::works::{NotificationsPageData, RequestState};
use crate::forms::leads::{CreateLeadForm, CreateLeadPayload, UpdateLeadForm, UpdateLeadPayload};
use crate::forms::notes::AddNoteForm;
use crate::forms::works::{AddWorkForm, AddWorkPayload};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, current_user, local_path, page_error, redirect, render_template, today,
};
use crate::services::{
    ServiceError, leads as leads_service, stats as stats_service, users as users_service,
    works as works_service,
};

fn lead_path(id: LeadId) -> String {
    format!("/agent/lead/{id}")
}

#[get("/agent")]
/// Agent dashboard: headline numbers plus the calls due today.
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
    let today = today();

    let stats = match stats_service::dashboard_stats(repo.get_ref(), &user, today) {
        Ok(stats) => stats,
        Err(err) => return page_error(err, "dashboard"),
    };
    let calls = match leads_service::load_todays_calls(repo.get_ref(), &user, today) {
        Ok(calls) => calls,
        Err(err) => return page_error(err, "today's calls"),
    };

    let mut context = base_context(
        &flash_messages,
        &user,
        Page::TodaysCalls.nav_key(),
        &server_config.auth_service_url,
    );
    context.insert("commission", &CommissionSummary::from(&stats));
    context.insert("stats", &stats);
    context.insert("calls", &calls);

    render_template(&tera, "agent/index.html", &context)
}

#[get("/agent/today")]
pub async fn show_todays_calls(
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

    match leads_service::load_todays_calls(repo.get_ref(), &user, today()) {
        Ok(calls) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                Page::TodaysCalls.nav_key(),
                &server_config.auth_service_url,
            );
            context.insert("calls", &calls);
            render_template(&tera, "agent/today.html", &context)
        }
        Err(err) => page_error(err, "today's calls"),
    }
}

#[get("/agent/leads")]
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

    match leads_service::list_leads(repo.get_ref(), &user, query.into_inner(), today()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                Page::AllLeads.nav_key(),
                &server_config.auth_service_url,
            );
            context.insert("data", &data);
            context.insert("statuses", LeadStatus::ALL);
            context.insert("base_url", Page::AllLeads.path());
            render_template(&tera, "agent/leads.html", &context)
        }
        Err(err) => page_error(err, "leads"),
    }
}

#[get("/agent/lead/new")]
pub async fn new_lead(
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

    let agents = if user.role == UserRole::Admin {
        match users_service::list_users(repo.get_ref(), &user, None) {
            Ok(users) => users,
            Err(err) => return page_error(err, "team members"),
        }
    } else {
        Vec::new()
    };

    let mut context = base_context(
        &flash_messages,
        &user,
        Page::CreateLead.nav_key(),
        &server_config.auth_service_url,
    );
    context.insert("sources", LeadSource::ALL);
    context.insert("agents", &agents);
    context.insert("today", &today());
    render_template(&tera, "agent/new_lead.html", &context)
}

#[post("/agent/lead/new")]
pub async fn create_lead(
    claims: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CreateLeadForm>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let payload = match CreateLeadPayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(format!("Could not create lead: {err}")).send();
            return redirect(Page::CreateLead.path());
        }
    };

    match leads_service::create_lead(repo.get_ref(), &user, payload) {
        Ok(lead) => {
            FlashMessage::success(format!("Lead {} created.", lead.name)).send();
            redirect(&lead_path(lead.id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("You do not have access to this page.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(Page::CreateLead.path())
        }
        Err(err) => {
            log::error!("Failed to create lead: {err}");
            FlashMessage::error("Could not create lead.").send();
            redirect(Page::CreateLead.path())
        }
    }
}

#[get("/agent/lead/{lead_id}")]
pub async fn show_lead(
    claims: AuthenticatedUser,
    lead_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Ok(lead_id) = LeadId::new(lead_id.into_inner()) else {
        return page_error(ServiceError::NotFound, "Lead");
    };

    match leads_service::load_lead(repo.get_ref(), &user, lead_id, today()) {
        Ok(detail) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                Page::LeadDetail.nav_key(),
                &server_config.auth_service_url,
            );
            context.insert("detail", &detail);
            context.insert("statuses", LeadStatus::ALL);
            context.insert("follow_up_statuses", FollowUpStatus::ALL);
            context.insert("today", &today());
            render_template(&tera, "agent/lead.html", &context)
        }
        Err(err) => page_error(err, "Lead"),
    }
}

#[post("/agent/lead/{lead_id}/update")]
pub async fn update_lead(
    claims: AuthenticatedUser,
    lead_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<UpdateLeadForm>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Ok(lead_id) = LeadId::new(lead_id.into_inner()) else {
        return page_error(ServiceError::NotFound, "Lead");
    };
    let back = lead_path(lead_id);

    let payload = match UpdateLeadPayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(format!("Could not update lead: {err}")).send();
            return redirect(&back);
        }
    };

    match leads_service::update_lead(repo.get_ref(), &user, lead_id, payload, today()) {
        Ok(_) => {
            FlashMessage::success("Lead updated.").send();
            redirect(&back)
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&back)
        }
        Err(err @ (ServiceError::Unauthorized | ServiceError::NotFound)) => {
            page_error(err, "Lead")
        }
        Err(err) => {
            log::error!("Failed to update lead {lead_id}: {err}");
            FlashMessage::error("Could not update lead.").send();
            redirect(&back)
        }
    }
}

#[post("/agent/lead/{lead_id}/note")]
pub async fn add_note(
    claims: AuthenticatedUser,
    lead_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddNoteForm>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Ok(lead_id) = LeadId::new(lead_id.into_inner()) else {
        return page_error(ServiceError::NotFound, "Lead");
    };
    let back = lead_path(lead_id);

    match leads_service::add_note(repo.get_ref(), &user, lead_id, form) {
        Ok(_) => {
            FlashMessage::success("Note added.").send();
            redirect(&back)
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&back)
        }
        Err(err @ (ServiceError::Unauthorized | ServiceError::NotFound)) => {
            page_error(err, "Lead")
        }
        Err(err) => {
            log::error!("Failed to add note to lead {lead_id}: {err}");
            FlashMessage::error("Could not add note.").send();
            redirect(&back)
        }
    }
}

#[post("/agent/lead/{lead_id}/work")]
pub async fn add_work(
    claims: AuthenticatedUser,
    lead_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddWorkForm>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Ok(lead_id) = LeadId::new(lead_id.into_inner()) else {
        return page_error(ServiceError::NotFound, "Lead");
    };
    let back = lead_path(lead_id);

    let payload = match AddWorkPayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(format!("Could not schedule work: {err}")).send();
            return redirect(&back);
        }
    };

    match works_service::add_work(repo.get_ref(), &user, lead_id, payload) {
        Ok(work) => {
            FlashMessage::success(format!("Work \"{}\" scheduled.", work.title)).send();
            redirect(&back)
        }
        Err(err @ (ServiceError::Unauthorized | ServiceError::NotFound)) => {
            page_error(err, "Lead")
        }
        Err(err) => {
            log::error!("Failed to add work to lead {lead_id}: {err}");
            FlashMessage::error("Could not schedule work.").send();
            redirect(&back)
        }
    }
}

#[get("/agent/notifications")]
/// Pending and recently completed works of the agent.
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

    match works_service::load_work_stats(repo.get_ref(), &user, today) {
        Ok(stats) => {
            let data = NotificationsPageData::from_stats(&stats, today, &[], |_| RequestState::Idle);
            let mut context = base_context(
                &flash_messages,
                &user,
                Page::Notifications.nav_key(),
                &server_config.auth_service_url,
            );
            context.insert("data", &data);
            context.insert("return_to", Page::Notifications.path());
            render_template(&tera, "agent/notifications.html", &context)
        }
        Err(err) => page_error(err, "notifications"),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteWorkForm {
    /// Page to go back to; defaults to the notifications page.
    pub next: Option<String>,
}

#[post("/agent/works/{work_id}/complete")]
/// Completes a work and sends the browser back to reload the list.
pub async fn complete_work(
    claims: AuthenticatedUser,
    work_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    form: Option<web::Form<CompleteWorkForm>>,
) -> impl Responder {
    let user = match current_user(repo.get_ref(), &claims) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let back = local_path(form.next.as_deref(), Page::Notifications.path()).to_string();

    let Ok(work_id) = WorkId::new(work_id.into_inner()) else {
        FlashMessage::error("Work not found.").send();
        return redirect(&back);
    };

    match works_service::complete_work(repo.get_ref(), &user, work_id, Utc::now()) {
        Ok(work) => {
            FlashMessage::success(format!("\"{}\" marked as completed.", work.title)).send();
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("You cannot complete this work.").send();
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Work not found.").send();
        }
        Err(err) => {
            log::error!("Failed to complete work {work_id}: {err}");
            FlashMessage::error("Failed to complete work. Please try again.").send();
        }
    }
    redirect(&back)
}
