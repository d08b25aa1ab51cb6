use diesel::prelude::*;

use crate::domain::activity_log::ActivityDraft;
use crate::domain::note::{NewNote, Note};
use crate::domain::types::LeadId;
use crate::models::note::{NewNote as DbNewNote, Note as DbNote};
use crate::repository::activity_log::insert_audit;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, NoteReader, NoteWriter};

impl NoteReader for DieselRepository {
    fn list_notes(&self, lead_id: LeadId) -> RepositoryResult<Vec<Note>> {
        use crate::schema::notes;

        let mut conn = self.conn()?;
        let db_notes = notes::table
            .filter(notes::lead_id.eq(lead_id.get()))
            .order((notes::created_at.desc(), notes::id.desc()))
            .load::<DbNote>(&mut conn)?;

        db_notes
            .into_iter()
            .map(|note| Note::try_from(note).map_err(RepositoryError::from))
            .collect()
    }
}

impl NoteWriter for DieselRepository {
    fn create_note(&self, new_note: &NewNote, audit: &[ActivityDraft]) -> RepositoryResult<Note> {
        use crate::schema::notes;

        let mut conn = self.conn()?;
        let db_new_note: DbNewNote = new_note.into();

        conn.transaction::<Note, RepositoryError, _>(|conn| {
            let db_note = diesel::insert_into(notes::table)
                .values(&db_new_note)
                .get_result::<DbNote>(conn)?;

            insert_audit(conn, new_note.lead_id, audit)?;
            Ok(Note::try_from(db_note)?)
        })
    }
}
