//! View models of the admin dashboard.

use serde::Serialize;

use crate::domain::stats::{AgentPerformance, DashboardStats};
use crate::domain::types::UserId;
use crate::formatting::format_inr;

/// Colour class of a count badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Alert,
    Neutral,
    Success,
}

impl Badge {
    /// Alert when something needs attention, neutral otherwise.
    pub fn for_problem_count(count: usize) -> Self {
        if count > 0 { Badge::Alert } else { Badge::Neutral }
    }
}

/// One row of the agent overview table.
///
/// Rows keep the order they were given in; the ranking happens in
/// [`crate::domain::stats::sort_agent_performance`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentOverviewRow {
    pub agent_id: UserId,
    pub agent_name: String,
    pub agent_email: String,
    pub initial: String,
    pub total_leads_assigned: usize,
    /// New leads created today, this week and this month.
    pub leads_today: usize,
    pub leads_week: usize,
    pub leads_month: usize,
    pub overdue_leads: usize,
    pub overdue_badge: Badge,
    pub closed_deals: usize,
    pub closed_badge: Badge,
    pub lost_deals: usize,
    pub lost_badge: Badge,
    pub pending_works: usize,
    pub commission_closed: String,
    pub has_closed_commission: bool,
    pub commission_lost: String,
    pub in_progress_commission: String,
    /// Row is highlighted when any commission was lost.
    pub highlight_lost: bool,
    /// Admin lead list filtered to this agent.
    pub detail_url: String,
}

impl From<&AgentPerformance> for AgentOverviewRow {
    fn from(perf: &AgentPerformance) -> Self {
        let initial: String = perf
            .agent_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default();

        Self {
            agent_id: perf.agent_id,
            agent_name: perf.agent_name.clone(),
            agent_email: perf.agent_email.clone(),
            initial,
            total_leads_assigned: perf.total_leads_assigned,
            leads_today: perf.leads_today,
            leads_week: perf.leads_week,
            leads_month: perf.leads_month,
            overdue_leads: perf.overdue_leads,
            overdue_badge: Badge::for_problem_count(perf.overdue_leads),
            closed_deals: perf.closed_deals,
            closed_badge: Badge::Success,
            lost_deals: perf.lost_deals,
            lost_badge: Badge::for_problem_count(perf.lost_deals),
            pending_works: perf.pending_works,
            commission_closed: format_inr(perf.commission_closed),
            has_closed_commission: perf.commission_closed > 0.0,
            commission_lost: format_inr(perf.commission_lost),
            in_progress_commission: format_inr(perf.in_progress_commission),
            highlight_lost: perf.commission_lost > 0.0,
            detail_url: format!("/admin/leads?agent={}", perf.agent_id),
        }
    }
}

pub fn overview_rows(performance: &[AgentPerformance]) -> Vec<AgentOverviewRow> {
    performance.iter().map(AgentOverviewRow::from).collect()
}

/// Headline commission figures, already formatted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommissionSummary {
    pub total: String,
    pub closed: String,
    pub lost: String,
    pub in_progress: String,
}

impl From<&DashboardStats> for CommissionSummary {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total: format_inr(stats.total_expected_commission),
            closed: format_inr(stats.closed_commission),
            lost: format_inr(stats.lost_commission),
            in_progress: format_inr(stats.in_progress_commission),
        }
    }
}

/// Data behind `/admin`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdminDashboardData {
    pub stats: DashboardStats,
    pub commission: CommissionSummary,
    pub agents: Vec<AgentOverviewRow>,
}
