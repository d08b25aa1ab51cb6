//! Repository implementation for follow-up works.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::activity_log::ActivityDraft;
use crate::domain::types::WorkId;
use crate::domain::work::{NewWork, Work, WorkStatus};
use crate::models::work::{NewWork as DbNewWork, Work as DbWork};
use crate::repository::activity_log::insert_audit;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, WorkListQuery, WorkReader, WorkWriter};

impl WorkReader for DieselRepository {
    fn get_work_by_id(&self, id: WorkId) -> RepositoryResult<Option<Work>> {
        use crate::schema::works;

        let mut conn = self.conn()?;
        let db_work = works::table
            .find(id.get())
            .first::<DbWork>(&mut conn)
            .optional()?;

        db_work
            .map(Work::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_works(&self, query: WorkListQuery) -> RepositoryResult<Vec<Work>> {
        use crate::schema::works;

        let mut conn = self.conn()?;
        let mut items = works::table.into_boxed::<Sqlite>();

        if let Some(user_id) = query.assigned_to {
            items = items.filter(works::assigned_to_id.eq(user_id.get()));
        }
        if let Some(lead_id) = query.lead_id {
            items = items.filter(works::lead_id.eq(lead_id.get()));
        }
        if let Some(status) = query.status {
            items = items.filter(works::status.eq(status.as_str()));
        }

        let db_works = items
            .order((works::due_date.asc(), works::id.asc()))
            .load::<DbWork>(&mut conn)?;

        db_works
            .into_iter()
            .map(|work| Work::try_from(work).map_err(RepositoryError::from))
            .collect()
    }
}

impl WorkWriter for DieselRepository {
    fn create_work(&self, new_work: &NewWork, audit: &[ActivityDraft]) -> RepositoryResult<Work> {
        use crate::schema::works;

        let mut conn = self.conn()?;
        let db_new_work: DbNewWork = new_work.into();

        conn.transaction::<Work, RepositoryError, _>(|conn| {
            let db_work = diesel::insert_into(works::table)
                .values(&db_new_work)
                .get_result::<DbWork>(conn)?;

            insert_audit(conn, new_work.lead_id, audit)?;
            Ok(Work::try_from(db_work)?)
        })
    }

    fn complete_work(
        &self,
        id: WorkId,
        completed_at: DateTime<Utc>,
        audit: &[ActivityDraft],
    ) -> RepositoryResult<Option<Work>> {
        use crate::schema::works;

        let mut conn = self.conn()?;
        let completed_at = completed_at.naive_utc();

        conn.transaction::<Option<Work>, RepositoryError, _>(|conn| {
            // The status filter makes the transition happen at most once.
            let Some(db_work) = diesel::update(
                works::table
                    .filter(works::id.eq(id.get()))
                    .filter(works::status.eq(WorkStatus::Pending.as_str())),
            )
            .set((
                works::status.eq(WorkStatus::Completed.as_str()),
                works::completed_at.eq(Some(completed_at)),
                works::updated_at.eq(completed_at),
            ))
            .get_result::<DbWork>(conn)
            .optional()?
            else {
                return Ok(None);
            };

            let work = Work::try_from(db_work)?;
            insert_audit(conn, work.lead_id, audit)?;
            Ok(Some(work))
        })
    }
}
