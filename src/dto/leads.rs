//! DTOs used by the lead list, today's calls and lead detail pages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::activity_log::ActivityLog;
use crate::domain::lead::{FollowUpStatus, Lead, LeadSource, LeadStatus};
use crate::domain::note::Note;
use crate::domain::types::{LeadId, UserId};
use crate::domain::user::User;
use crate::domain::work::Work;
use crate::dto::works::{RequestState, WorkRow};
use crate::formatting::{format_date, format_inr};
use crate::pagination::Paginated;

/// Query parameters accepted by the lead lists.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LeadsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<usize>,
    /// Admin-only filter by assignee.
    pub agent: Option<i32>,
}

impl LeadsQuery {
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Unknown status values are ignored rather than rejected.
    pub fn status_filter(&self) -> Option<LeadStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn agent_filter(&self) -> Option<UserId> {
        self.agent.and_then(|id| UserId::new(id).ok())
    }
}

/// Lead as shown in tables.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeadRow {
    pub id: LeadId,
    pub name: String,
    pub phone: String,
    pub project: Option<String>,
    pub location: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub follow_up_date: NaiveDate,
    pub follow_up_date_display: String,
    pub follow_up_status: FollowUpStatus,
    pub is_overdue: bool,
    pub expected_commission: Option<String>,
    pub assigned_to_name: Option<String>,
}

impl LeadRow {
    pub fn new(lead: &Lead, today: NaiveDate, agents: &[User]) -> Self {
        Self {
            id: lead.id,
            name: lead.name.to_string(),
            phone: lead.phone.to_string(),
            project: lead.project.clone(),
            location: lead.location.clone(),
            source: lead.source,
            status: lead.status,
            follow_up_date: lead.follow_up_date,
            follow_up_date_display: format_date(lead.follow_up_date),
            follow_up_status: lead.follow_up_status,
            is_overdue: lead.is_overdue(today),
            expected_commission: lead.expected_commission().map(format_inr),
            assigned_to_name: agents
                .iter()
                .find(|agent| agent.id == lead.assigned_to_id)
                .map(|agent| agent.name.to_string()),
        }
    }
}

/// Data behind `/agent/leads` and `/admin/leads`.
#[derive(Debug, Serialize)]
pub struct LeadsPageData {
    pub leads: Paginated<LeadRow>,
    pub search_query: Option<String>,
    pub status_filter: Option<LeadStatus>,
    pub agent_filter: Option<UserId>,
    /// Assignee choices; empty for agents.
    pub agents: Vec<User>,
}

/// Data behind `/agent/today`.
#[derive(Debug, Serialize)]
pub struct TodaysCallsPageData {
    /// Follow-ups that slipped past their date, oldest first.
    pub overdue: Vec<LeadRow>,
    pub due_today: Vec<LeadRow>,
}

/// Data behind `/agent/lead/{id}`.
#[derive(Debug, Serialize)]
pub struct LeadDetailData {
    pub lead: Lead,
    pub row: LeadRow,
    pub assigned_to: Option<User>,
    pub notes: Vec<Note>,
    pub activity_logs: Vec<ActivityLog>,
    pub works: Vec<WorkRow>,
}

impl LeadDetailData {
    pub fn new(
        lead: Lead,
        assigned_to: Option<User>,
        notes: Vec<Note>,
        activity_logs: Vec<ActivityLog>,
        works: &[Work],
        today: NaiveDate,
    ) -> Self {
        let agents: Vec<User> = assigned_to.iter().cloned().collect();
        Self {
            row: LeadRow::new(&lead, today, &agents),
            lead,
            assigned_to,
            notes,
            activity_logs,
            works: works
                .iter()
                .map(|work| WorkRow::new(work, today, RequestState::Idle))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::tests::sample_lead;
    use crate::domain::types::{Amount, CommissionRate};
    use crate::domain::user::UserRole;
    use crate::domain::user::tests::sample_user;

    #[test]
    fn row_formats_commission_and_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut lead = sample_lead(LeadStatus::Negotiation, today.pred_opt().unwrap());
        lead.expected_deal_value = Some(Amount::new(10_000_000.0).unwrap());
        lead.commission_percentage = Some(CommissionRate::new(1.5).unwrap());

        let row = LeadRow::new(&lead, today, &[sample_user(1, "Asha", UserRole::Agent)]);

        assert!(row.is_overdue);
        assert_eq!(row.expected_commission.as_deref(), Some("₹1,50,000"));
        assert_eq!(row.assigned_to_name.as_deref(), Some("Asha"));
        assert_eq!(row.follow_up_date_display, "15 Oct 2026");
    }

    #[test]
    fn query_ignores_blank_and_unknown_filters() {
        let query = LeadsQuery {
            search: Some("   ".into()),
            status: Some("WON".into()),
            page: None,
            agent: Some(0),
        };
        assert_eq!(query.search_term(), None);
        assert_eq!(query.status_filter(), None);
        assert_eq!(query.agent_filter(), None);

        let query = LeadsQuery {
            search: Some(" ravi ".into()),
            status: Some("LOST".into()),
            page: Some(2),
            agent: Some(4),
        };
        assert_eq!(query.search_term().as_deref(), Some("ravi"));
        assert_eq!(query.status_filter(), Some(LeadStatus::Lost));
        assert_eq!(query.agent_filter().map(UserId::get), Some(4));
    }
}
