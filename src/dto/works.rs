//! View model of the work notification page.
//!
//! Shared by the server-rendered page and the client-side controller; the
//! only difference is where the per-row request state comes from.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::stats::{WorkLead, WorkStats};
use crate::domain::types::{LeadId, WorkId};
use crate::domain::user::User;
use crate::domain::work::Work;
use crate::formatting::format_date;

/// Progress of a "complete work" request for one row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Failed,
}

/// Human label for a pending work's due date.
pub fn due_label(days_overdue: i64) -> String {
    match days_overdue {
        0 => "Due today".to_string(),
        1 => "1 day overdue".to_string(),
        d if d > 1 => format!("{d} days overdue"),
        -1 => "Due in 1 day".to_string(),
        d => format!("Due in {} days", -d),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkRow {
    pub id: WorkId,
    pub lead_id: LeadId,
    /// Lead contact; `None` when the lead was not loaded with the stats.
    pub lead_name: Option<String>,
    pub lead_phone: Option<String>,
    /// Avatar letter, `?` for an unknown lead.
    pub lead_initial: String,
    /// Owner of the work, filled in on team-wide views.
    pub assigned_to_name: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub due_date_display: String,
    /// Only set for pending works.
    pub days_overdue: Option<i64>,
    pub due_label: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_at_display: String,
    pub request_state: RequestState,
    /// False while a completion request for this row is in flight.
    pub action_enabled: bool,
}

impl WorkRow {
    pub fn new(work: &Work, today: NaiveDate, request_state: RequestState) -> Self {
        let days_overdue = work.days_overdue(today);
        Self {
            id: work.id,
            lead_id: work.lead_id,
            lead_name: None,
            lead_phone: None,
            lead_initial: "?".to_string(),
            assigned_to_name: None,
            title: work.title.to_string(),
            description: work.description.clone(),
            due_date: work.due_date,
            due_date_display: format_date(work.due_date),
            days_overdue,
            due_label: days_overdue.map(due_label),
            completed_at: work.completed_at,
            completed_at_display: work
                .completed_at
                .map(|at| format_date(at.date()))
                .unwrap_or_else(|| "-".to_string()),
            request_state,
            action_enabled: work.is_pending() && request_state != RequestState::Pending,
        }
    }

    #[must_use]
    pub fn with_lead(mut self, lead: Option<&WorkLead>) -> Self {
        if let Some(lead) = lead {
            self.lead_initial = lead
                .name
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_else(|| "?".to_string());
            self.lead_name = Some(lead.name.clone());
            self.lead_phone = Some(lead.phone.clone());
        }
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: Option<&User>) -> Self {
        self.assigned_to_name = owner.map(|user| user.name.to_string());
        self
    }
}

/// Everything the notification page renders.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotificationsPageData {
    pub total_works: usize,
    pub completed_works: usize,
    pub pending_works: usize,
    pub works_due_today: usize,
    /// "In Progress" table, oldest due date first.
    pub pending: Vec<WorkRow>,
    /// "Recently completed" table.
    pub completed: Vec<WorkRow>,
    /// Nothing pending and nothing completed recently.
    pub is_empty: bool,
    /// Rows name their owner; set on team-wide views.
    pub show_owner: bool,
}

impl NotificationsPageData {
    /// Builds the page from `stats`.
    ///
    /// `agents` names the owner of each work; pass an empty slice for a
    /// single agent's own view.
    pub fn from_stats<F>(stats: &WorkStats, today: NaiveDate, agents: &[User], state_of: F) -> Self
    where
        F: Fn(WorkId) -> RequestState,
    {
        let show_owner = !agents.is_empty();
        let row = |work: &Work, state: RequestState| {
            let row = WorkRow::new(work, today, state).with_lead(stats.lead(work.lead_id));
            if show_owner {
                row.with_owner(agents.iter().find(|a| a.id == work.assigned_to_id))
            } else {
                row
            }
        };

        let pending: Vec<WorkRow> = stats
            .pending_works_list
            .iter()
            .map(|work| row(work, state_of(work.id)))
            .collect();
        let completed: Vec<WorkRow> = stats
            .recent_completed_works
            .iter()
            .map(|work| row(work, RequestState::Idle))
            .collect();

        Self {
            total_works: stats.total_works,
            completed_works: stats.completed_works,
            pending_works: stats.pending_works,
            works_due_today: stats.works_due_today,
            is_empty: pending.is_empty() && completed.is_empty(),
            pending,
            completed,
            show_owner,
        }
    }
}
