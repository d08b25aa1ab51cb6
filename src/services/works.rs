use chrono::{DateTime, NaiveDate, Utc};

use crate::access::{ADMIN_ROLES, AGENT_ROLES};
use crate::domain::activity_log::{ActivityAction, ActivityDraft};
use crate::domain::stats::WorkStats;
use crate::domain::types::{LeadId, WorkId};
use crate::domain::user::{User, UserRole};
use crate::domain::work::Work;
use crate::forms::works::AddWorkPayload;
use crate::repository::{LeadListQuery, LeadReader, WorkListQuery, WorkReader, WorkWriter};
use crate::services::{ServiceError, ServiceResult, ensure_lead_access, ensure_role};

/// Work summary of the current agent, with the leads the works belong to.
pub fn load_work_stats<R>(repo: &R, user: &User, today: NaiveDate) -> ServiceResult<WorkStats>
where
    R: WorkReader + LeadReader + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    let works = repo
        .list_works(WorkListQuery::new().assigned_to(user.id))
        .map_err(ServiceError::from)?;
    let (_, leads) = repo
        .list_leads(LeadListQuery::new().assigned_to(user.id))
        .map_err(ServiceError::from)?;

    Ok(WorkStats::from_works(works, today).with_leads(&leads))
}

/// Work summary across the whole team.
pub fn load_team_work_stats<R>(repo: &R, user: &User, today: NaiveDate) -> ServiceResult<WorkStats>
where
    R: WorkReader + LeadReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLES)?;

    let works = repo
        .list_works(WorkListQuery::new())
        .map_err(ServiceError::from)?;
    let (_, leads) = repo
        .list_leads(LeadListQuery::new())
        .map_err(ServiceError::from)?;

    Ok(WorkStats::from_works(works, today).with_leads(&leads))
}

/// Marks a work as completed.
///
/// Agents may only complete their own works. Completing a work that is
/// already completed returns it unchanged and writes no audit entry. The
/// completion and its audit entry are stored together.
pub fn complete_work<R>(
    repo: &R,
    user: &User,
    work_id: WorkId,
    now: DateTime<Utc>,
) -> ServiceResult<Work>
where
    R: WorkReader + WorkWriter + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    let work = repo
        .get_work_by_id(work_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if user.role != UserRole::Admin && work.assigned_to_id != user.id {
        return Err(ServiceError::Unauthorized);
    }

    let audit = [ActivityDraft::new(
        user.id,
        user.name.as_str(),
        ActivityAction::WorkCompleted,
        format!("Completed work: {}", work.title),
    )];
    let completed = repo.complete_work(work_id, now, &audit).map_err(|err| {
        log::error!("Failed to complete work {work_id}: {err}");
        ServiceError::from(err)
    })?;

    match completed {
        Some(work) => Ok(work),
        // Completed earlier, possibly by a concurrent request.
        None => repo
            .get_work_by_id(work_id)
            .map_err(ServiceError::from)?
            .ok_or(ServiceError::NotFound),
    }
}

/// Schedules a follow-up work on a lead, assigned to the lead's agent.
pub fn add_work<R>(
    repo: &R,
    user: &User,
    lead_id: LeadId,
    payload: AddWorkPayload,
) -> ServiceResult<Work>
where
    R: LeadReader + WorkWriter + ?Sized,
{
    ensure_role(user, AGENT_ROLES)?;

    let lead = repo
        .get_lead_by_id(lead_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    ensure_lead_access(user, &lead)?;

    let audit = [ActivityDraft::new(
        user.id,
        user.name.as_str(),
        ActivityAction::WorkAdded,
        format!("Scheduled work: {}", payload.title),
    )
    .change("", payload.due_date)];
    let new_work = payload.into_new_work(lead.id, lead.assigned_to_id);

    repo.create_work(&new_work, &audit)
        .map_err(ServiceError::from)
}


#[cfg(all(test, feature = "test-mocks"))]
mod mock_tests {
    use super::*;
    use crate::domain::work::WorkStatus;
    use crate::domain::work::tests::sample_work;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{now, today, user};

    #[test]
    fn completion_and_audit_go_to_one_write() {
        let agent = user(1, "Asha", UserRole::Agent);
        let mut repo = MockRepository::new();
        repo.expect_get_work_by_id()
            .returning(|_| Ok(Some(sample_work(1, WorkStatus::Pending, today()))));
        repo.expect_complete_work()
            .times(1)
            .withf(|_, _, audit| {
                audit.len() == 1 && audit[0].action == ActivityAction::WorkCompleted
            })
            .returning(|_, _, _| Ok(Some(sample_work(1, WorkStatus::Completed, today()))));

        let work = complete_work(&repo, &agent, WorkId::new(1).unwrap(), now().and_utc()).unwrap();

        assert_eq!(work.status, WorkStatus::Completed);
    }

    #[test]
    fn failed_update_surfaces_repository_error() {
        let agent = user(1, "Asha", UserRole::Agent);
        let mut repo = MockRepository::new();
        repo.expect_get_work_by_id()
            .times(1)
            .returning(|_| Ok(Some(sample_work(1, WorkStatus::Pending, today()))));
        repo.expect_complete_work().returning(|_, _, _| {
            Err(RepositoryError::ConnectionError("pool exhausted".into()))
        });

        let result = complete_work(&repo, &agent, WorkId::new(1).unwrap(), now().and_utc());

        assert!(matches!(result, Err(ServiceError::Repository(_))));
    }

    #[test]
    fn concurrent_completion_returns_stored_work() {
        let agent = user(1, "Asha", UserRole::Agent);
        let mut repo = MockRepository::new();
        let mut calls = 0;
        repo.expect_get_work_by_id().times(2).returning(move |_| {
            calls += 1;
            let status = if calls == 1 {
                WorkStatus::Pending
            } else {
                WorkStatus::Completed
            };
            Ok(Some(sample_work(1, status, today())))
        });
        repo.expect_complete_work().returning(|_, _, _| Ok(None));

        let work = complete_work(&repo, &agent, WorkId::new(1).unwrap(), now().and_utc()).unwrap();

        assert_eq!(work.status, WorkStatus::Completed);
    }
}
