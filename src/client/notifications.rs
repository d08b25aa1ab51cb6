//! Client-side state of the work notification view.
//!
//! The controller never edits stats locally: a completion is trusted only once
//! the following reload returns. Loads may overlap, so each one is tagged with
//! a [`LoadTicket`] and only the newest ticket may install its result.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::client::{ClientError, CrmApi};
use crate::domain::stats::WorkStats;
use crate::domain::types::WorkId;
use crate::dto::works::{NotificationsPageData, RequestState};

/// Handle for one in-flight stats load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Message shown to the user after a failed action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub level: &'static str,
    pub message: String,
}

pub struct NotificationsController<A: CrmApi> {
    api: A,
    stats: Option<WorkStats>,
    requests: HashMap<WorkId, RequestState>,
    generation: u64,
    load_error: Option<String>,
}

impl<A: CrmApi> NotificationsController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            stats: None,
            requests: HashMap::new(),
            generation: 0,
            load_error: None,
        }
    }

    pub fn stats(&self) -> Option<&WorkStats> {
        self.stats.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn request_state(&self, work_id: WorkId) -> RequestState {
        self.requests.get(&work_id).copied().unwrap_or_default()
    }

    /// Starts a load; every earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Installs a load result. Returns false when the ticket is stale.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<WorkStats, ClientError>,
    ) -> bool {
        if ticket.0 != self.generation {
            log::debug!("discarding stale work stats load {}", ticket.0);
            return false;
        }
        match result {
            Ok(stats) => {
                self.stats = Some(stats);
                self.load_error = None;
            }
            Err(err) => {
                log::error!("Failed to load work stats: {err}");
                self.load_error = Some(err.to_string());
            }
        }
        true
    }

    /// Drops any in-flight load without fetching.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub async fn reload(&mut self) -> bool {
        let ticket = self.begin_load();
        let result = self.api.work_stats().await;
        self.finish_load(ticket, result)
    }

    /// Completes a work and reloads the stats.
    ///
    /// A second call for a row that is still in flight is ignored. On failure
    /// the row goes to [`RequestState::Failed`] so the action can be retried.
    pub async fn complete_work(&mut self, work_id: WorkId) -> Result<(), Alert> {
        if self.request_state(work_id) == RequestState::Pending {
            return Ok(());
        }
        self.requests.insert(work_id, RequestState::Pending);

        match self.api.complete_work(work_id).await {
            Ok(_) => {
                self.requests.remove(&work_id);
                self.invalidate();
                self.reload().await;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to complete work {work_id}: {err}");
                self.requests.insert(work_id, RequestState::Failed);
                Err(Alert {
                    level: "danger",
                    message: "Could not complete the work. Please try again.".to_string(),
                })
            }
        }
    }

    /// Page data for the last accepted stats, if any.
    pub fn view(&self, today: NaiveDate) -> Option<NotificationsPageData> {
        self.stats.as_ref().map(|stats| {
            NotificationsPageData::from_stats(stats, today, &[], |id| self.request_state(id))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::NaiveDate;

    use super::*;
    use crate::client::ClientResult;
    use crate::domain::stats::{AgentPerformance, DashboardStats};
    use crate::domain::types::LeadId;
    use crate::domain::user::User;
    use crate::domain::work::tests::sample_work;
    use crate::domain::work::{Work, WorkStatus};
    use crate::dto::api::{LeadDetailResponse, LeadView, LeadsResponse};
    use crate::dto::leads::LeadsQuery;
    use crate::forms::leads::CreateLeadRequest;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    /// Serves works from memory; completion can be made to fail.
    struct FakeApi {
        works: RefCell<Vec<Work>>,
        fail_completion: Cell<bool>,
        stats_calls: Cell<usize>,
    }

    impl FakeApi {
        fn new(works: Vec<Work>) -> Self {
            Self {
                works: RefCell::new(works),
                fail_completion: Cell::new(false),
                stats_calls: Cell::new(0),
            }
        }
    }

    impl CrmApi for &FakeApi {
        async fn work_stats(&self) -> ClientResult<WorkStats> {
            self.stats_calls.set(self.stats_calls.get() + 1);
            Ok(WorkStats::from_works(self.works.borrow().clone(), date(16)))
        }

        async fn complete_work(&self, work_id: WorkId) -> ClientResult<Work> {
            if self.fail_completion.get() {
                return Err(ClientError::Status(500));
            }
            let mut works = self.works.borrow_mut();
            let work = works
                .iter_mut()
                .find(|w| w.id == work_id)
                .ok_or(ClientError::Status(404))?;
            work.status = WorkStatus::Completed;
            work.completed_at = date(16).and_hms_opt(11, 30, 0);
            Ok(work.clone())
        }

        async fn list_leads(&self, _query: &LeadsQuery) -> ClientResult<LeadsResponse> {
            unimplemented!()
        }

        async fn get_lead(&self, _lead_id: LeadId) -> ClientResult<LeadDetailResponse> {
            unimplemented!()
        }

        async fn create_lead(&self, _request: &CreateLeadRequest) -> ClientResult<LeadView> {
            unimplemented!()
        }

        async fn list_users(&self) -> ClientResult<Vec<User>> {
            unimplemented!()
        }

        async fn dashboard_stats(&self) -> ClientResult<DashboardStats> {
            unimplemented!()
        }

        async fn agent_performance(&self) -> ClientResult<Vec<AgentPerformance>> {
            unimplemented!()
        }
    }

    fn two_pending() -> FakeApi {
        FakeApi::new(vec![
            sample_work(1, WorkStatus::Pending, date(13)),
            sample_work(2, WorkStatus::Pending, date(16)),
        ])
    }

    #[tokio::test]
    async fn reload_installs_stats() {
        let api = two_pending();
        let mut controller = NotificationsController::new(&api);

        assert!(controller.reload().await);

        let view = controller.view(date(16)).unwrap();
        assert_eq!(view.pending_works, 2);
        assert_eq!(view.pending[0].days_overdue, Some(3));
    }

    #[test]
    fn older_ticket_is_discarded() {
        let api = two_pending();
        let mut controller = NotificationsController::new(&api);

        let first = controller.begin_load();
        let second = controller.begin_load();

        let fresh = WorkStats::from_works(vec![sample_work(9, WorkStatus::Pending, date(16))], date(16));
        assert!(controller.finish_load(second, Ok(fresh)));
        assert!(!controller.finish_load(first, Ok(WorkStats::default())));

        assert_eq!(controller.stats().unwrap().pending_works, 1);
    }

    #[test]
    fn invalidate_drops_in_flight_load() {
        let api = two_pending();
        let mut controller = NotificationsController::new(&api);

        let ticket = controller.begin_load();
        controller.invalidate();

        assert!(!controller.finish_load(ticket, Ok(WorkStats::default())));
        assert!(controller.stats().is_none());
    }

    #[test]
    fn failed_load_keeps_previous_stats() {
        let api = two_pending();
        let mut controller = NotificationsController::new(&api);

        let ticket = controller.begin_load();
        controller.finish_load(ticket, Ok(WorkStats::default()));
        let ticket = controller.begin_load();
        controller.finish_load(ticket, Err(ClientError::Status(502)));

        assert!(controller.stats().is_some());
        assert_eq!(controller.load_error(), Some("server answered 502"));
    }

    #[tokio::test]
    async fn completion_reloads_from_server() {
        let api = two_pending();
        let mut controller = NotificationsController::new(&api);
        controller.reload().await;

        controller
            .complete_work(WorkId::new(1).unwrap())
            .await
            .unwrap();

        assert_eq!(api.stats_calls.get(), 2);
        let view = controller.view(date(16)).unwrap();
        assert_eq!(view.pending_works, 1);
        assert_eq!(view.completed_works, 1);
        assert_eq!(
            controller.request_state(WorkId::new(1).unwrap()),
            RequestState::Idle
        );
    }

    #[tokio::test]
    async fn failed_completion_marks_row_and_returns_alert() {
        let api = two_pending();
        api.fail_completion.set(true);
        let mut controller = NotificationsController::new(&api);
        controller.reload().await;
        let id = WorkId::new(2).unwrap();

        let alert = controller.complete_work(id).await.unwrap_err();

        assert_eq!(alert.level, "danger");
        assert_eq!(controller.request_state(id), RequestState::Failed);
        assert_eq!(api.stats_calls.get(), 1);
        let view = controller.view(date(16)).unwrap();
        let row = view.pending.iter().find(|row| row.id == id).unwrap();
        assert!(row.action_enabled);
    }

    #[tokio::test]
    async fn failed_row_can_be_retried() {
        let api = two_pending();
        api.fail_completion.set(true);
        let mut controller = NotificationsController::new(&api);
        let id = WorkId::new(2).unwrap();

        assert!(controller.complete_work(id).await.is_err());
        api.fail_completion.set(false);
        assert!(controller.complete_work(id).await.is_ok());

        assert_eq!(controller.request_state(id), RequestState::Idle);
        assert_eq!(controller.stats().unwrap().completed_works, 1);
    }
}
