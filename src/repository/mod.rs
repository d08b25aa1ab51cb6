use chrono::{DateTime, NaiveDate, Utc};

use crate::db::{DbConnection, DbPool};
use crate::domain::activity_log::{ActivityDraft, ActivityLog, NewActivityLog};
use crate::domain::lead::{Lead, LeadStatus, NewLead, UpdateLead};
use crate::domain::note::{NewNote, Note};
use crate::domain::types::{LeadId, UserEmail, UserId, WorkId};
use crate::domain::user::{NewUser, User, UserRole};
use crate::domain::work::{NewWork, Work, WorkStatus};
use crate::repository::errors::RepositoryResult;

pub mod activity_log;
pub mod errors;
pub mod lead;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod note;
pub mod user;
pub mod work;

/// Diesel-backed store shared by every request handler.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Rows to skip; saturates instead of overflowing on absurd page numbers.
    pub(crate) fn offset(&self) -> i64 {
        let skipped = (self.page.max(1) - 1).saturating_mul(self.per_page);
        i64::try_from(skipped).unwrap_or(i64::MAX)
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

/// Filters applied when listing leads.
///
/// Results are ordered by follow-up date (earliest first) and then by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadListQuery {
    pub assigned_to: Option<UserId>,
    pub status: Option<LeadStatus>,
    pub follow_up_on_or_before: Option<NaiveDate>,
    pub open_only: bool,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl LeadListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assigned_to(mut self, user_id: UserId) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Keeps leads whose follow-up is due on `date` or earlier.
    pub fn due_on_or_before(mut self, date: NaiveDate) -> Self {
        self.follow_up_on_or_before = Some(date);
        self
    }

    /// Drops closed and lost leads.
    pub fn open_only(mut self) -> Self {
        self.open_only = true;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkListQuery {
    pub assigned_to: Option<UserId>,
    pub lead_id: Option<LeadId>,
    pub status: Option<WorkStatus>,
}

impl WorkListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assigned_to(mut self, user_id: UserId) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    pub fn lead(mut self, lead_id: LeadId) -> Self {
        self.lead_id = Some(lead_id);
        self
    }

    pub fn status(mut self, status: WorkStatus) -> Self {
        self.status = Some(status);
        self
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
    /// Users ordered by name, optionally restricted to one role.
    fn list_users(&self, role: Option<UserRole>) -> RepositoryResult<Vec<User>>;
}

pub trait UserWriter {
    /// Inserts the user or refreshes name and role of the existing email.
    fn upsert_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
}

pub trait LeadReader {
    fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>>;
    /// Returns the total number of matches and the requested page.
    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
}

/// Writers take the audit entries describing the change and insert them in the
/// same transaction, attached to the affected lead.
pub trait LeadWriter {
    fn create_lead(&self, new_lead: &NewLead, audit: &[ActivityDraft]) -> RepositoryResult<Lead>;
    fn update_lead(
        &self,
        id: LeadId,
        updates: &UpdateLead,
        audit: &[ActivityDraft],
    ) -> RepositoryResult<Lead>;
}

pub trait NoteReader {
    /// Notes of a lead, newest first.
    fn list_notes(&self, lead_id: LeadId) -> RepositoryResult<Vec<Note>>;
}

pub trait NoteWriter {
    fn create_note(&self, new_note: &NewNote, audit: &[ActivityDraft]) -> RepositoryResult<Note>;
}

pub trait WorkReader {
    fn get_work_by_id(&self, id: WorkId) -> RepositoryResult<Option<Work>>;
    /// Works ordered by due date, then id.
    fn list_works(&self, query: WorkListQuery) -> RepositoryResult<Vec<Work>>;
}

pub trait WorkWriter {
    fn create_work(&self, new_work: &NewWork, audit: &[ActivityDraft]) -> RepositoryResult<Work>;
    /// Moves a pending work to completed.
    ///
    /// Returns `None` when the work does not exist or was already completed,
    /// so concurrent submissions complete a work exactly once. `audit` is only
    /// written when this call made the transition.
    fn complete_work(
        &self,
        id: WorkId,
        completed_at: DateTime<Utc>,
        audit: &[ActivityDraft],
    ) -> RepositoryResult<Option<Work>>;
}

pub trait ActivityLogReader {
    /// Audit trail of a lead, newest first.
    fn list_activity_logs(&self, lead_id: LeadId) -> RepositoryResult<Vec<ActivityLog>>;
}

pub trait ActivityLogWriter {
    fn create_activity_log(&self, entry: &NewActivityLog) -> RepositoryResult<ActivityLog>;
}
