use serde::Deserialize;

use crate::domain::note::NewNote;
use crate::domain::types::{LeadId, NoteContent};
use crate::forms::FormError;

#[derive(Debug, Deserialize)]
pub struct AddNoteForm {
    pub content: String,
}

impl AddNoteForm {
    /// Markup is stripped; a note that is empty afterwards is rejected.
    pub fn into_new_note(self, lead_id: LeadId) -> Result<NewNote, FormError> {
        let content = NoteContent::new(self.content).map_err(|_| FormError::EmptyContent)?;
        Ok(NewNote::new(lead_id, content))
    }
}
