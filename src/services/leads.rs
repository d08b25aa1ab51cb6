use chrono::NaiveDate;

use crate::access::{ADMIN_ROLES, AGENT_ROLES};
use crate::domain::activity_log::{ActivityAction, ActivityDraft, ActivityLog};
use crate::domain::lead::{Lead, UpdateLead};
use crate::domain::note::Note;
use crate::domain::types::{Amount, LeadId};
use crate::domain::user::{User, UserRole};
use crate::dto::api::{LeadDetailResponse, LeadView};
use crate::dto::leads::{LeadDetailData, LeadRow, LeadsPageData, LeadsQuery, TodaysCallsPageData};
use crate::formatting::format_inr;
use crate::forms::leads::{CreateLeadPayload, UpdateLeadPayload};
use crate::forms::notes::AddNoteForm;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityLogReader, LeadListQuery, LeadReader, LeadWriter, NoteReader, NoteWriter, UserReader,
    WorkListQuery, WorkReader,
};
use crate::services::{ServiceError, ServiceResult, ensure_lead_access, ensure_role};

/// Agents are pinned to their own leads; admins may narrow by agent.
fn scoped_query(user: &User, query: &LeadsQuery) -> LeadListQuery {
    let mut list = LeadListQuery::new();
    let assignee = match user.role {
        UserRole::Admin => query.agent_filter(),
        UserRole::Agent => Some(user.id),
    };
    if let Some(id) = assignee {
        list = list.assigned_to(id);
    }
    if let Some(status) = query.status_filter() {
        list = list.status(status);
    }
    if let Some(term) = query.search_term() {
        list = list.search(term);
    }
    list
}

/// One page of leads visible to the user, with the total match count.
pub fn find_leads<R>(
    repo: &R,
    user: &User,
    query: &LeadsQuery,
) -> ServiceResult<(usize, Vec<Lead>)>
where
    R: LeadReader + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    let page = query.page.unwrap_or(1);
    repo.list_leads(scoped_query(user, query).paginate(page, DEFAULT_ITEMS_PER_PAGE))
        .map_err(|err| {
            log::error!("Failed to list leads: {err}");
            ServiceError::from(err)
        })
}

/// Data for the lead tables of both dashboards.
pub fn list_leads<R>(
    repo: &R,
    user: &User,
    query: LeadsQuery,
    today: NaiveDate,
) -> ServiceResult<LeadsPageData>
where
    R: LeadReader + UserReader + ?Sized,
{
    let (total, leads) = find_leads(repo, user, &query)?;

    let agents = match user.role {
        UserRole::Admin => repo
            .list_users(Some(UserRole::Agent))
            .map_err(ServiceError::from)?,
        UserRole::Agent => Vec::new(),
    };
    let names: &[User] = if agents.is_empty() {
        std::slice::from_ref(user)
    } else {
        &agents
    };

    let rows = leads
        .iter()
        .map(|lead| LeadRow::new(lead, today, names))
        .collect();

    Ok(LeadsPageData {
        leads: Paginated::new(rows, query.page.unwrap_or(1), total, DEFAULT_ITEMS_PER_PAGE),
        search_query: query.search_term(),
        status_filter: query.status_filter(),
        agent_filter: query.agent_filter(),
        agents,
    })
}

/// Open leads of the agent whose follow-up is today or already missed.
pub fn load_todays_calls<R>(
    repo: &R,
    user: &User,
    today: NaiveDate,
) -> ServiceResult<TodaysCallsPageData>
where
    R: LeadReader + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    let query = LeadListQuery::new()
        .assigned_to(user.id)
        .open_only()
        .due_on_or_before(today);
    let (_, leads) = repo.list_leads(query).map_err(ServiceError::from)?;

    let me = std::slice::from_ref(user);
    let (overdue, due_today): (Vec<LeadRow>, Vec<LeadRow>) = leads
        .iter()
        .map(|lead| LeadRow::new(lead, today, me))
        .partition(|row| row.is_overdue);

    Ok(TodaysCallsPageData { overdue, due_today })
}

/// Reads a lead the user is allowed to see.
pub fn get_lead<R>(repo: &R, user: &User, lead_id: LeadId) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    let lead = repo
        .get_lead_by_id(lead_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    ensure_lead_access(user, &lead)?;
    Ok(lead)
}

fn load_history<R>(repo: &R, lead_id: LeadId) -> ServiceResult<(Vec<Note>, Vec<ActivityLog>)>
where
    R: NoteReader + ActivityLogReader + ?Sized,
{
    let notes = repo.list_notes(lead_id).map_err(ServiceError::from)?;
    let logs = repo
        .list_activity_logs(lead_id)
        .map_err(ServiceError::from)?;
    Ok((notes, logs))
}

/// Everything shown on the lead detail page.
pub fn load_lead<R>(
    repo: &R,
    user: &User,
    lead_id: LeadId,
    today: NaiveDate,
) -> ServiceResult<LeadDetailData>
where
    R: LeadReader + UserReader + NoteReader + ActivityLogReader + WorkReader + ?Sized,
{
    let lead = get_lead(repo, user, lead_id)?;
    let (notes, logs) = load_history(repo, lead.id)?;
    let works = repo
        .list_works(WorkListQuery::new().lead(lead.id))
        .map_err(ServiceError::from)?;
    let assigned_to = repo
        .get_user_by_id(lead.assigned_to_id)
        .map_err(ServiceError::from)?;

    Ok(LeadDetailData::new(lead, assigned_to, notes, logs, &works, today))
}

/// Lead detail as returned by the JSON API.
pub fn load_lead_response<R>(
    repo: &R,
    user: &User,
    lead_id: LeadId,
    today: NaiveDate,
) -> ServiceResult<LeadDetailResponse>
where
    R: LeadReader + NoteReader + ActivityLogReader + ?Sized,
{
    let lead = get_lead(repo, user, lead_id)?;
    let (notes, activity_logs) = load_history(repo, lead.id)?;

    Ok(LeadDetailResponse {
        lead: LeadView::new(lead, today),
        notes,
        activity_logs,
    })
}

/// Creates a lead.
///
/// Leads created by agents always belong to them. Admins may hand the lead to
/// any existing user and default to themselves.
pub fn create_lead<R>(repo: &R, user: &User, mut payload: CreateLeadPayload) -> ServiceResult<Lead>
where
    R: UserReader + LeadWriter + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    if user.role != UserRole::Admin {
        payload.assigned_to_id = None;
    } else if let Some(assignee) = payload.assigned_to_id {
        let exists = repo
            .get_user_by_id(assignee)
            .map_err(ServiceError::from)?
            .is_some();
        if !exists {
            return Err(ServiceError::Form(
                "The selected agent does not exist.".to_string(),
            ));
        }
    }

    let new_lead = payload.into_new_lead(user.id);
    let audit = [ActivityDraft::new(
        user.id,
        user.name.as_str(),
        ActivityAction::LeadCreated,
        format!("Lead {} created", new_lead.name),
    )];
    repo.create_lead(&new_lead, &audit).map_err(|err| {
        log::error!("Failed to create lead: {err}");
        ServiceError::from(err)
    })
}

fn amount_text(amount: Option<Amount>) -> String {
    amount.map(|a| format_inr(a.get())).unwrap_or_default()
}

/// Audit entries describing what an update changes.
fn change_entries(user: &User, before: &Lead, after: &UpdateLead) -> Vec<ActivityDraft> {
    let entry = |action, description: String| {
        ActivityDraft::new(user.id, user.name.as_str(), action, description)
    };
    let mut entries = Vec::new();

    if before.status != after.status {
        entries.push(
            entry(
                ActivityAction::StatusChanged,
                format!("Status changed from {} to {}", before.status, after.status),
            )
            .change(before.status, after.status),
        );
    }
    if before.follow_up_date != after.follow_up_date {
        entries.push(
            entry(
                ActivityAction::FollowUpChanged,
                format!("Follow-up moved to {}", after.follow_up_date),
            )
            .change(before.follow_up_date, after.follow_up_date),
        );
    }
    if before.expected_deal_value != after.expected_deal_value {
        entries.push(
            entry(
                ActivityAction::DealValueChanged,
                "Expected deal value updated".to_string(),
            )
            .change(
                amount_text(before.expected_deal_value),
                amount_text(after.expected_deal_value),
            ),
        );
    }
    entries
}

/// Applies pipeline edits and records one audit entry per changed field.
pub fn update_lead<R>(
    repo: &R,
    user: &User,
    lead_id: LeadId,
    payload: UpdateLeadPayload,
    today: NaiveDate,
) -> ServiceResult<Lead>
where
    R: LeadReader + LeadWriter + ?Sized,
{
    let before = get_lead(repo, user, lead_id)?;

    let updates = payload.apply_to(&before, today);
    let audit = change_entries(user, &before, &updates);
    repo.update_lead(before.id, &updates, &audit).map_err(|err| {
        log::error!("Failed to update lead {lead_id}: {err}");
        ServiceError::from(err)
    })
}

pub fn add_note<R>(repo: &R, user: &User, lead_id: LeadId, form: AddNoteForm) -> ServiceResult<Note>
where
    R: LeadReader + NoteWriter + ?Sized,
{
    let lead = get_lead(repo, user, lead_id)?;

    let new_note = form.into_new_note(lead.id)?;
    let audit = [ActivityDraft::new(
        user.id,
        user.name.as_str(),
        ActivityAction::NoteAdded,
        "Note added",
    )];
    repo.create_note(&new_note, &audit)
        .map_err(ServiceError::from)
}

/// Leads across the whole team, used by the admin aggregates.
pub fn all_leads<R>(repo: &R, user: &User) -> ServiceResult<Vec<Lead>>
where
    R: LeadReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLES)?;
    let (_, leads) = repo
        .list_leads(LeadListQuery::new())
        .map_err(ServiceError::from)?;
    Ok(leads)
}
