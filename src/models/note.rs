use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::note::{NewNote as DomainNewNote, Note as DomainNote};
use crate::domain::types::{LeadId, NoteContent, NoteId, TypeConstraintError};
use crate::models::lead::Lead;
use crate::models::local_time;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::notes)]
#[diesel(belongs_to(Lead, foreign_key = lead_id))]
pub struct Note {
    pub id: i32,
    pub lead_id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notes)]
pub struct NewNote<'a> {
    pub lead_id: i32,
    pub content: &'a str,
}

impl TryFrom<Note> for DomainNote {
    type Error = TypeConstraintError;

    fn try_from(note: Note) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NoteId::try_from(note.id)?,
            lead_id: LeadId::try_from(note.lead_id)?,
            content: NoteContent::new(note.content)?,
            created_at: local_time(note.created_at),
        })
    }
}

impl<'a> From<&'a DomainNewNote> for NewNote<'a> {
    fn from(note: &'a DomainNewNote) -> Self {
        Self {
            lead_id: note.lead_id.get(),
            content: note.content.as_str(),
        }
    }
}
