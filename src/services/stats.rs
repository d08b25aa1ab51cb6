use chrono::NaiveDate;

use crate::access::{ADMIN_ROLES, AGENT_ROLES};
use crate::domain::stats::{AgentPerformance, DashboardStats, sort_agent_performance};
use crate::domain::user::{User, UserRole};
use crate::domain::work::WorkStatus;
use crate::dto::admin::{AdminDashboardData, CommissionSummary, overview_rows};
use crate::repository::{LeadListQuery, LeadReader, UserReader, WorkListQuery, WorkReader};
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Headline numbers for the caller: own pipeline for agents, whole team for
/// admins.
pub fn dashboard_stats<R>(repo: &R, user: &User, today: NaiveDate) -> ServiceResult<DashboardStats>
where
    R: LeadReader + WorkReader + UserReader + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    let is_admin = user.role == UserRole::Admin;
    let mut leads_query = LeadListQuery::new();
    let mut works_query = WorkListQuery::new().status(WorkStatus::Pending);
    if !is_admin {
        leads_query = leads_query.assigned_to(user.id);
        works_query = works_query.assigned_to(user.id);
    }

    let (_, leads) = repo.list_leads(leads_query).map_err(|err| {
        log::error!("Failed to load leads for dashboard: {err}");
        ServiceError::from(err)
    })?;
    let pending = repo
        .list_works(works_query)
        .map_err(ServiceError::from)?
        .len();

    let stats = DashboardStats::from_leads(&leads, pending, today);
    if !is_admin {
        return Ok(stats);
    }

    let agents = repo
        .list_users(Some(UserRole::Agent))
        .map_err(ServiceError::from)?;
    Ok(stats.with_team(&agents, &leads))
}

/// Per-agent performance, highest lost commission first.
pub fn agent_performance<R>(
    repo: &R,
    user: &User,
    today: NaiveDate,
) -> ServiceResult<Vec<AgentPerformance>>
where
    R: LeadReader + WorkReader + UserReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLES)?;

    let agents = repo
        .list_users(Some(UserRole::Agent))
        .map_err(ServiceError::from)?;
    let (_, leads) = repo
        .list_leads(LeadListQuery::new())
        .map_err(ServiceError::from)?;
    let works = repo
        .list_works(WorkListQuery::new())
        .map_err(ServiceError::from)?;

    let mut rows: Vec<AgentPerformance> = agents
        .iter()
        .map(|agent| AgentPerformance::for_agent(agent, &leads, &works, today))
        .collect();
    sort_agent_performance(&mut rows);
    Ok(rows)
}

pub fn load_admin_dashboard<R>(
    repo: &R,
    user: &User,
    today: NaiveDate,
) -> ServiceResult<AdminDashboardData>
where
    R: LeadReader + WorkReader + UserReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLES)?;

    let stats = dashboard_stats(repo, user, today)?;
    let performance = agent_performance(repo, user, today)?;

    Ok(AdminDashboardData {
        commission: CommissionSummary::from(&stats),
        agents: overview_rows(&performance),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::{Lead, LeadStatus};
    use crate::domain::lead::tests::sample_lead;
    use crate::domain::types::{Amount, CommissionRate, LeadId, UserId};
    use crate::domain::work::tests::sample_work;
    use crate::services::test_support::{FakeRepository, today, user};

    fn priced(id: i32, agent: i32, status: LeadStatus, value: f64) -> Lead {
        let mut lead = sample_lead(status, today());
        lead.id = LeadId::new(id).unwrap();
        lead.assigned_to_id = UserId::new(agent).unwrap();
        lead.expected_deal_value = Some(Amount::new(value).unwrap());
        lead.commission_percentage = Some(CommissionRate::new(1.0).unwrap());
        lead
    }

    fn team() -> FakeRepository {
        let repo = FakeRepository::with_users(vec![
            user(1, "Asha", UserRole::Agent),
            user(2, "Kiran", UserRole::Agent),
            user(3, "Vikram", UserRole::Admin),
        ]);
        repo.add_lead(priced(1, 1, LeadStatus::Closed, 10_000_000.0));
        repo.add_lead(priced(2, 1, LeadStatus::Negotiation, 5_000_000.0));
        repo.add_lead(priced(3, 2, LeadStatus::Lost, 2_000_000.0));
        repo.add_work(sample_work(1, WorkStatus::Pending, today()));
        repo.add_work(sample_work(2, WorkStatus::Completed, today()));
        repo
    }

    #[test]
    fn agent_dashboard_is_scoped_to_own_leads() {
        let repo = team();
        let asha = user(1, "Asha", UserRole::Agent);

        let stats = dashboard_stats(&repo, &asha, today()).unwrap();

        assert_eq!(stats.total_leads, 2);
        assert_eq!(stats.closed_commission, 100_000.0);
        assert_eq!(stats.lost_commission, 0.0);
        assert_eq!(stats.pending_works, 1);
        assert_eq!(stats.total_agents, None);
    }

    #[test]
    fn admin_dashboard_covers_team() {
        let repo = team();
        let admin = user(3, "Vikram", UserRole::Admin);

        let data = load_admin_dashboard(&repo, &admin, today()).unwrap();

        assert_eq!(data.stats.total_leads, 3);
        assert_eq!(data.stats.total_agents, Some(2));
        assert_eq!(data.stats.active_agents, Some(1));
        assert_eq!(data.commission.lost, "₹20,000");
        let names: Vec<&str> = data.agents.iter().map(|a| a.agent_name.as_str()).collect();
        assert_eq!(names, vec!["Kiran", "Asha"]);
        assert!(data.agents[0].highlight_lost);
    }

    #[test]
    fn performance_is_admin_only() {
        let repo = team();
        let asha = user(1, "Asha", UserRole::Agent);
        assert!(matches!(
            agent_performance(&repo, &asha, today()),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            load_admin_dashboard(&repo, &asha, today()),
            Err(ServiceError::Unauthorized)
        ));
    }
}
