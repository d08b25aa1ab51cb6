//! Repository implementation for the lead audit trail.
//!
//! Entries are append-only; there is no update or delete.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::activity_log::{ActivityDraft, ActivityLog, NewActivityLog};
use crate::domain::types::LeadId;
use crate::models::activity_log::{
    ActivityLog as DbActivityLog, NewActivityLog as DbNewActivityLog,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ActivityLogReader, ActivityLogWriter, DieselRepository};

/// Appends `audit` to the trail of `lead_id`.
///
/// Callers run this inside the transaction of the write being audited.
pub(crate) fn insert_audit(
    conn: &mut SqliteConnection,
    lead_id: LeadId,
    audit: &[ActivityDraft],
) -> RepositoryResult<()> {
    use crate::schema::activity_logs;

    if audit.is_empty() {
        return Ok(());
    }

    let entries: Vec<NewActivityLog> = audit.iter().map(|draft| draft.for_lead(lead_id)).collect();
    let rows: Vec<DbNewActivityLog> = entries.iter().map(DbNewActivityLog::from).collect();

    diesel::insert_into(activity_logs::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

impl ActivityLogReader for DieselRepository {
    fn list_activity_logs(&self, lead_id: LeadId) -> RepositoryResult<Vec<ActivityLog>> {
        use crate::schema::activity_logs;

        let mut conn = self.conn()?;
        let db_logs = activity_logs::table
            .filter(activity_logs::lead_id.eq(lead_id.get()))
            .order((activity_logs::created_at.desc(), activity_logs::id.desc()))
            .load::<DbActivityLog>(&mut conn)?;

        db_logs
            .into_iter()
            .map(|entry| ActivityLog::try_from(entry).map_err(RepositoryError::from))
            .collect()
    }
}

impl ActivityLogWriter for DieselRepository {
    fn create_activity_log(&self, entry: &NewActivityLog) -> RepositoryResult<ActivityLog> {
        use crate::schema::activity_logs;

        let mut conn = self.conn()?;
        let db_entry: DbNewActivityLog = entry.into();

        let db_log = diesel::insert_into(activity_logs::table)
            .values(&db_entry)
            .get_result::<DbActivityLog>(&mut conn)?;

        ActivityLog::try_from(db_log).map_err(RepositoryError::from)
    }
}
