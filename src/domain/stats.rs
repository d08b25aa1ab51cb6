//! Aggregates computed over leads and works for dashboards.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::lead::{CommissionBucket, Lead, LeadStatus};
use crate::domain::types::{LeadId, UserId};
use crate::domain::user::User;
use crate::domain::work::{Work, WorkStatus};

/// Number of completed works listed in [`WorkStats::recent_completed_works`].
pub const RECENT_COMPLETED_LIMIT: usize = 10;

/// Leads whose last contact is at least this many days old are flagged.
pub const STALE_CONTACT_DAYS: u64 = 3;

/// Days covered by [`AgentPerformance::leads_week`], today included.
pub const WEEK_DAYS: u64 = 7;

/// Days covered by [`AgentPerformance::leads_month`], today included.
pub const MONTH_DAYS: u64 = 30;

/// Summary of an agent's follow-up works.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkStats {
    pub total_works: usize,
    pub completed_works: usize,
    pub pending_works: usize,
    pub works_due_today: usize,
    pub recent_completed_works: Vec<Work>,
    pub pending_works_list: Vec<Work>,
    /// Leads of the listed works, so rows can show who to call.
    #[serde(default)]
    pub leads: Vec<WorkLead>,
}

/// Contact details of the lead a work belongs to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkLead {
    pub id: LeadId,
    pub name: String,
    pub phone: String,
}

impl From<&Lead> for WorkLead {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name.to_string(),
            phone: lead.phone.to_string(),
        }
    }
}

impl WorkStats {
    /// Builds the summary from every work assigned to the agent.
    ///
    /// Pending works are ordered by due date (oldest first); completed ones by
    /// completion time (newest first).
    pub fn from_works(works: Vec<Work>, today: NaiveDate) -> Self {
        let total_works = works.len();
        let (mut completed, mut pending): (Vec<Work>, Vec<Work>) = works
            .into_iter()
            .partition(|work| work.status == WorkStatus::Completed);

        pending.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));

        let works_due_today = pending.iter().filter(|w| w.due_date == today).count();
        let completed_works = completed.len();
        completed.truncate(RECENT_COMPLETED_LIMIT);

        Self {
            total_works,
            completed_works,
            pending_works: pending.len(),
            works_due_today,
            recent_completed_works: completed,
            pending_works_list: pending,
            leads: Vec::new(),
        }
    }

    /// Attaches the leads referenced by the listed works; others are skipped.
    #[must_use]
    pub fn with_leads(mut self, leads: &[Lead]) -> Self {
        let wanted: HashSet<LeadId> = self
            .pending_works_list
            .iter()
            .chain(&self.recent_completed_works)
            .map(|work| work.lead_id)
            .collect();
        self.leads = leads
            .iter()
            .filter(|lead| wanted.contains(&lead.id))
            .map(WorkLead::from)
            .collect();
        self
    }

    pub fn lead(&self, id: LeadId) -> Option<&WorkLead> {
        self.leads.iter().find(|lead| lead.id == id)
    }
}

/// Commission totals split by pipeline outcome.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTotals {
    pub closed: f64,
    pub lost: f64,
    pub in_progress: f64,
}

impl CommissionTotals {
    pub fn from_leads<'a>(leads: impl IntoIterator<Item = &'a Lead>) -> Self {
        leads.into_iter().fold(Self::default(), |mut acc, lead| {
            if let Some(commission) = lead.expected_commission() {
                match lead.commission_bucket() {
                    CommissionBucket::Closed => acc.closed += commission,
                    CommissionBucket::Lost => acc.lost += commission,
                    CommissionBucket::InProgress => acc.in_progress += commission,
                }
            }
            acc
        })
    }

    pub fn total(&self) -> f64 {
        self.closed + self.lost + self.in_progress
    }
}

/// Headline numbers shown on the agent and admin dashboards.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: usize,
    pub follow_ups_today: usize,
    pub site_visits_done: usize,
    pub deals_closed: usize,
    pub pending_works: usize,
    pub total_expected_commission: f64,
    pub closed_commission: f64,
    pub lost_commission: f64,
    pub in_progress_commission: f64,
    pub overdue_leads_count: usize,
    pub leads_not_contacted_in_3_days: usize,
    pub leads_created_today: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_agents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_agents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_leads_per_agent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
}

fn is_contact_stale(lead: &Lead, today: NaiveDate) -> bool {
    let last_contact = lead
        .last_contacted_date
        .unwrap_or_else(|| lead.created_at.date());
    match today.checked_sub_days(Days::new(STALE_CONTACT_DAYS)) {
        Some(threshold) => last_contact <= threshold,
        None => false,
    }
}

impl DashboardStats {
    /// Stats over a set of leads (one agent's, or the whole team's).
    pub fn from_leads(leads: &[Lead], pending_works: usize, today: NaiveDate) -> Self {
        let commission = CommissionTotals::from_leads(leads);
        let count = |pred: &dyn Fn(&Lead) -> bool| leads.iter().filter(|l| pred(l)).count();

        Self {
            total_leads: leads.len(),
            follow_ups_today: count(&|l| l.status.is_open() && l.follow_up_date == today),
            site_visits_done: count(&|l| l.status == LeadStatus::SiteVisitDone),
            deals_closed: count(&|l| l.status == LeadStatus::Closed),
            pending_works,
            total_expected_commission: commission.total(),
            closed_commission: commission.closed,
            lost_commission: commission.lost,
            in_progress_commission: commission.in_progress,
            overdue_leads_count: count(&|l| l.is_overdue(today)),
            leads_not_contacted_in_3_days: count(&|l| {
                l.status.is_open() && is_contact_stale(l, today)
            }),
            leads_created_today: count(&|l| l.created_at.date() == today),
            ..Self::default()
        }
    }

    /// Adds team-wide figures for the admin dashboard.
    #[must_use]
    pub fn with_team(mut self, agents: &[User], leads: &[Lead]) -> Self {
        let total_agents = agents.len();
        let active_agents = agents
            .iter()
            .filter(|agent| {
                leads
                    .iter()
                    .any(|l| l.assigned_to_id == agent.id && l.status.is_open())
            })
            .count();

        self.total_agents = Some(total_agents);
        self.active_agents = Some(active_agents);
        self.average_leads_per_agent = (total_agents > 0)
            .then(|| round_to_tenth(self.total_leads as f64 / total_agents as f64));
        self.conversion_rate = (self.total_leads > 0)
            .then(|| round_to_tenth(self.deals_closed as f64 * 100.0 / self.total_leads as f64));
        self
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-agent revenue and pipeline health, as shown in the admin overview.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub agent_id: UserId,
    pub agent_name: String,
    pub agent_email: String,
    pub total_leads_assigned: usize,
    /// Leads created today.
    pub leads_today: usize,
    /// Leads created in the last [`WEEK_DAYS`] days.
    pub leads_week: usize,
    /// Leads created in the last [`MONTH_DAYS`] days.
    pub leads_month: usize,
    pub overdue_leads: usize,
    pub closed_deals: usize,
    pub lost_deals: usize,
    pub commission_closed: f64,
    pub commission_lost: f64,
    pub in_progress_commission: f64,
    pub pending_works: usize,
}

impl AgentPerformance {
    /// Aggregates the leads assigned to `agent`; other leads are ignored.
    pub fn for_agent(agent: &User, leads: &[Lead], works: &[Work], today: NaiveDate) -> Self {
        let own: Vec<&Lead> = leads
            .iter()
            .filter(|lead| lead.assigned_to_id == agent.id)
            .collect();
        let commission = CommissionTotals::from_leads(own.iter().copied());
        let created_within = |days: u64| {
            let since = today.checked_sub_days(Days::new(days - 1));
            own.iter()
                .filter(|l| {
                    let created = l.created_at.date();
                    created <= today && since.is_none_or(|since| created >= since)
                })
                .count()
        };

        Self {
            agent_id: agent.id,
            agent_name: agent.name.to_string(),
            agent_email: agent.email.to_string(),
            total_leads_assigned: own.len(),
            leads_today: created_within(1),
            leads_week: created_within(WEEK_DAYS),
            leads_month: created_within(MONTH_DAYS),
            overdue_leads: own.iter().filter(|l| l.is_overdue(today)).count(),
            closed_deals: own.iter().filter(|l| l.status == LeadStatus::Closed).count(),
            lost_deals: own.iter().filter(|l| l.status == LeadStatus::Lost).count(),
            commission_closed: commission.closed,
            commission_lost: commission.lost,
            in_progress_commission: commission.in_progress,
            pending_works: works
                .iter()
                .filter(|w| w.assigned_to_id == agent.id && w.is_pending())
                .count(),
        }
    }
}

/// Highest lost commission first, then highest closed commission.
pub fn compare_agent_performance(a: &AgentPerformance, b: &AgentPerformance) -> Ordering {
    b.commission_lost
        .total_cmp(&a.commission_lost)
        .then_with(|| b.commission_closed.total_cmp(&a.commission_closed))
        .then_with(|| a.agent_name.cmp(&b.agent_name))
}

pub fn sort_agent_performance(rows: &mut [AgentPerformance]) {
    rows.sort_by(compare_agent_performance);
}
