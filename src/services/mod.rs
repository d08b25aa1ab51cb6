//! Business operations behind the pages and the JSON API.
//!
//! Every function is generic over the repository traits it needs and takes
//! the resolved [`User`] performing the request.

use thiserror::Error;

use crate::access::{Access, authorize};
use crate::domain::lead::Lead;
use crate::domain::types::TypeConstraintError;
use crate::domain::user::{User, UserRole};
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

pub mod leads;
pub mod stats;
pub mod users;
pub mod works;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

/// Fails with [`ServiceError::Unauthorized`] unless the user's role is listed.
pub fn ensure_role(user: &User, allowed: &[UserRole]) -> ServiceResult<()> {
    match authorize(Some(user.role), allowed) {
        Access::Allow => Ok(()),
        Access::Unauthenticated | Access::Forbidden => Err(ServiceError::Unauthorized),
    }
}

/// Agents only see their own leads; admins see every lead.
pub fn ensure_lead_access(user: &User, lead: &Lead) -> ServiceResult<()> {
    if user.role == UserRole::Admin || lead.assigned_to_id == user.id {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory repository used by the service tests.

    use std::cell::RefCell;

    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    use crate::domain::activity_log::{ActivityDraft, ActivityLog};
    use crate::domain::lead::{Lead, NewLead, UpdateLead};
    use crate::domain::note::{NewNote, Note};
    use crate::domain::types::{ActivityLogId, LeadId, NoteId, UserEmail, UserId, WorkId};
    use crate::domain::user::{NewUser, User, UserRole};
    use crate::domain::work::{NewWork, Work, WorkStatus};
    use crate::repository::errors::{RepositoryError, RepositoryResult};
    use crate::repository::{
        ActivityLogReader, LeadListQuery, LeadReader, LeadWriter, NoteReader, NoteWriter,
        UserReader, UserWriter, WorkListQuery, WorkReader, WorkWriter,
    };

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    pub fn now() -> NaiveDateTime {
        today().and_hms_opt(11, 30, 0).unwrap()
    }

    pub use crate::domain::user::tests::sample_user as user;

    #[derive(Default)]
    pub struct FakeRepository {
        pub users: RefCell<Vec<User>>,
        pub leads: RefCell<Vec<Lead>>,
        pub works: RefCell<Vec<Work>>,
        pub notes: RefCell<Vec<Note>>,
        pub logs: RefCell<Vec<ActivityLog>>,
    }

    impl FakeRepository {
        pub fn with_users(users: Vec<User>) -> Self {
            Self {
                users: RefCell::new(users),
                ..Self::default()
            }
        }

        pub fn add_lead(&self, lead: Lead) {
            self.leads.borrow_mut().push(lead);
        }

        pub fn add_work(&self, work: Work) {
            self.works.borrow_mut().push(work);
        }

        fn record(&self, lead_id: LeadId, audit: &[ActivityDraft]) -> RepositoryResult<()> {
            let mut logs = self.logs.borrow_mut();
            for draft in audit {
                let entry = draft.for_lead(lead_id);
                let log = ActivityLog {
                    id: ActivityLogId::new(next_id(logs.len()))?,
                    lead_id: entry.lead_id,
                    agent_id: entry.agent_id,
                    agent_name: entry.agent_name,
                    action: entry.action,
                    old_value: entry.old_value,
                    new_value: entry.new_value,
                    description: entry.description,
                    created_at: now(),
                };
                logs.push(log);
            }
            Ok(())
        }

        pub fn logged_actions(&self) -> Vec<String> {
            self.logs
                .borrow()
                .iter()
                .map(|log| log.action.to_string())
                .collect()
        }
    }

    fn next_id(len: usize) -> i32 {
        len as i32 + 1
    }

    impl UserReader for FakeRepository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
            Ok(self.users.borrow().iter().find(|u| u.id == id).cloned())
        }

        fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>> {
            Ok(self
                .users
                .borrow()
                .iter()
                .find(|u| &u.email == email)
                .cloned())
        }

        fn list_users(&self, role: Option<UserRole>) -> RepositoryResult<Vec<User>> {
            let mut users: Vec<User> = self
                .users
                .borrow()
                .iter()
                .filter(|u| role.is_none_or(|r| u.role == r))
                .cloned()
                .collect();
            users.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
            Ok(users)
        }
    }

    impl UserWriter for FakeRepository {
        fn upsert_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
            let mut users = self.users.borrow_mut();
            if let Some(existing) = users.iter_mut().find(|u| u.email == new_user.email) {
                existing.name = new_user.name.clone();
                existing.role = new_user.role;
                return Ok(existing.clone());
            }
            let user = User {
                id: UserId::new(next_id(users.len()))?,
                email: new_user.email.clone(),
                name: new_user.name.clone(),
                role: new_user.role,
                created_at: now(),
            };
            users.push(user.clone());
            Ok(user)
        }
    }

    impl LeadReader for FakeRepository {
        fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>> {
            Ok(self.leads.borrow().iter().find(|l| l.id == id).cloned())
        }

        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)> {
            let mut leads: Vec<Lead> = self
                .leads
                .borrow()
                .iter()
                .filter(|l| query.assigned_to.is_none_or(|id| l.assigned_to_id == id))
                .filter(|l| query.status.is_none_or(|s| l.status == s))
                .filter(|l| query.follow_up_on_or_before.is_none_or(|d| l.follow_up_date <= d))
                .filter(|l| !query.open_only || l.status.is_open())
                .filter(|l| {
                    query
                        .search
                        .as_deref()
                        .is_none_or(|term| l.name.as_str().contains(term))
                })
                .cloned()
                .collect();
            leads.sort_by(|a, b| a.follow_up_date.cmp(&b.follow_up_date).then(a.id.cmp(&b.id)));
            let total = leads.len();
            if let Some(p) = &query.pagination {
                leads = leads
                    .into_iter()
                    .skip(usize::try_from(p.offset()).unwrap_or(usize::MAX))
                    .take(p.per_page)
                    .collect();
            }
            Ok((total, leads))
        }
    }

    impl LeadWriter for FakeRepository {
        fn create_lead(
            &self,
            new_lead: &NewLead,
            audit: &[ActivityDraft],
        ) -> RepositoryResult<Lead> {
            let mut leads = self.leads.borrow_mut();
            let lead = Lead {
                id: LeadId::new(next_id(leads.len()))?,
                name: new_lead.name.clone(),
                phone: new_lead.phone.clone(),
                project: new_lead.project.clone(),
                location: new_lead.location.clone(),
                source: new_lead.source,
                status: new_lead.status,
                follow_up_date: new_lead.follow_up_date,
                follow_up_status: new_lead.follow_up_status,
                assigned_to_id: new_lead.assigned_to_id,
                expected_deal_value: new_lead.expected_deal_value,
                commission_percentage: new_lead.commission_percentage,
                last_contacted_date: None,
                created_at: now(),
                updated_at: now(),
            };
            leads.push(lead.clone());
            self.record(lead.id, audit)?;
            Ok(lead)
        }

        fn update_lead(
            &self,
            id: LeadId,
            updates: &UpdateLead,
            audit: &[ActivityDraft],
        ) -> RepositoryResult<Lead> {
            let mut leads = self.leads.borrow_mut();
            let lead = leads
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or(RepositoryError::NotFound)?;
            lead.status = updates.status;
            lead.follow_up_date = updates.follow_up_date;
            lead.follow_up_status = updates.follow_up_status;
            lead.expected_deal_value = updates.expected_deal_value;
            lead.commission_percentage = updates.commission_percentage;
            lead.last_contacted_date = updates.last_contacted_date;
            lead.updated_at = now();
            let lead = lead.clone();
            self.record(lead.id, audit)?;
            Ok(lead)
        }
    }

    impl NoteReader for FakeRepository {
        fn list_notes(&self, lead_id: LeadId) -> RepositoryResult<Vec<Note>> {
            Ok(self
                .notes
                .borrow()
                .iter()
                .rev()
                .filter(|n| n.lead_id == lead_id)
                .cloned()
                .collect())
        }
    }

    impl NoteWriter for FakeRepository {
        fn create_note(
            &self,
            new_note: &NewNote,
            audit: &[ActivityDraft],
        ) -> RepositoryResult<Note> {
            let mut notes = self.notes.borrow_mut();
            let note = Note {
                id: NoteId::new(next_id(notes.len()))?,
                lead_id: new_note.lead_id,
                content: new_note.content.clone(),
                created_at: now(),
            };
            notes.push(note.clone());
            self.record(note.lead_id, audit)?;
            Ok(note)
        }
    }

    impl WorkReader for FakeRepository {
        fn get_work_by_id(&self, id: WorkId) -> RepositoryResult<Option<Work>> {
            Ok(self.works.borrow().iter().find(|w| w.id == id).cloned())
        }

        fn list_works(&self, query: WorkListQuery) -> RepositoryResult<Vec<Work>> {
            let mut works: Vec<Work> = self
                .works
                .borrow()
                .iter()
                .filter(|w| query.assigned_to.is_none_or(|id| w.assigned_to_id == id))
                .filter(|w| query.lead_id.is_none_or(|id| w.lead_id == id))
                .filter(|w| query.status.is_none_or(|s| w.status == s))
                .cloned()
                .collect();
            works.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
            Ok(works)
        }
    }

    impl WorkWriter for FakeRepository {
        fn create_work(
            &self,
            new_work: &NewWork,
            audit: &[ActivityDraft],
        ) -> RepositoryResult<Work> {
            let mut works = self.works.borrow_mut();
            let work = Work {
                id: WorkId::new(next_id(works.len()))?,
                lead_id: new_work.lead_id,
                title: new_work.title.clone(),
                description: new_work.description.clone(),
                due_date: new_work.due_date,
                completed_at: None,
                status: WorkStatus::Pending,
                assigned_to_id: new_work.assigned_to_id,
                created_at: now(),
                updated_at: now(),
            };
            works.push(work.clone());
            self.record(work.lead_id, audit)?;
            Ok(work)
        }

        fn complete_work(
            &self,
            id: WorkId,
            completed_at: DateTime<Utc>,
            audit: &[ActivityDraft],
        ) -> RepositoryResult<Option<Work>> {
            // The fake keeps its clock in UTC.
            let completed_at = completed_at.naive_utc();
            let mut works = self.works.borrow_mut();
            let Some(work) = works
                .iter_mut()
                .find(|w| w.id == id && w.status == WorkStatus::Pending)
            else {
                return Ok(None);
            };
            work.status = WorkStatus::Completed;
            work.completed_at = Some(completed_at);
            work.updated_at = completed_at;
            let work = work.clone();
            self.record(work.lead_id, audit)?;
            Ok(Some(work))
        }
    }

    impl ActivityLogReader for FakeRepository {
        fn list_activity_logs(&self, lead_id: LeadId) -> RepositoryResult<Vec<ActivityLog>> {
            Ok(self
                .logs
                .borrow()
                .iter()
                .rev()
                .filter(|l| l.lead_id == lead_id)
                .cloned()
                .collect())
        }
    }
}
