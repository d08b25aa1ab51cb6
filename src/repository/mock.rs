//! Mock repository implementations for isolating services in tests.

use chrono::{DateTime, Utc};
use mockall::mock;

use crate::domain::activity_log::{ActivityDraft, ActivityLog, NewActivityLog};
use crate::domain::lead::{Lead, NewLead, UpdateLead};
use crate::domain::note::{NewNote, Note};
use crate::domain::types::{LeadId, UserEmail, UserId, WorkId};
use crate::domain::user::{NewUser, User, UserRole};
use crate::domain::work::{NewWork, Work};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ActivityLogReader, ActivityLogWriter, LeadListQuery, LeadReader, LeadWriter, NoteReader,
    NoteWriter, UserReader, UserWriter, WorkListQuery, WorkReader, WorkWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
        fn list_users(&self, role: Option<UserRole>) -> RepositoryResult<Vec<User>>;
    }

    impl UserWriter for Repository {
        fn upsert_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    }

    impl LeadReader for Repository {
        fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>>;
        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
    }

    impl LeadWriter for Repository {
        fn create_lead(&self, new_lead: &NewLead, audit: &[ActivityDraft]) -> RepositoryResult<Lead>;
        fn update_lead(
            &self,
            id: LeadId,
            updates: &UpdateLead,
            audit: &[ActivityDraft],
        ) -> RepositoryResult<Lead>;
    }

    impl NoteReader for Repository {
        fn list_notes(&self, lead_id: LeadId) -> RepositoryResult<Vec<Note>>;
    }

    impl NoteWriter for Repository {
        fn create_note(&self, new_note: &NewNote, audit: &[ActivityDraft]) -> RepositoryResult<Note>;
    }

    impl WorkReader for Repository {
        fn get_work_by_id(&self, id: WorkId) -> RepositoryResult<Option<Work>>;
        fn list_works(&self, query: WorkListQuery) -> RepositoryResult<Vec<Work>>;
    }

    impl WorkWriter for Repository {
        fn create_work(&self, new_work: &NewWork, audit: &[ActivityDraft]) -> RepositoryResult<Work>;
        fn complete_work(
            &self,
            id: WorkId,
            completed_at: DateTime<Utc>,
            audit: &[ActivityDraft],
        ) -> RepositoryResult<Option<Work>>;
    }

    impl ActivityLogReader for Repository {
        fn list_activity_logs(&self, lead_id: LeadId) -> RepositoryResult<Vec<ActivityLog>>;
    }

    impl ActivityLogWriter for Repository {
        fn create_activity_log(&self, entry: &NewActivityLog) -> RepositoryResult<ActivityLog>;
    }
}
