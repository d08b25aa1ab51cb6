use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{LeadId, NoteContent, NoteId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub lead_id: LeadId,
    pub content: NoteContent,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewNote {
    pub lead_id: LeadId,
    pub content: NoteContent,
}

impl NewNote {
    #[must_use]
    pub fn new(lead_id: LeadId, content: NoteContent) -> Self {
        Self { lead_id, content }
    }
}
