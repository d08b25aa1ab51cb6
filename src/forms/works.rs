use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{LeadId, UserId, WorkTitle};
use crate::domain::work::NewWork;
use crate::forms::{FormError, optional_text, parse_date};

#[derive(Debug, Deserialize, Validate)]
/// Follow-up task scheduled from the lead detail page.
pub struct AddWorkForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddWorkPayload {
    pub title: WorkTitle,
    pub description: Option<String>,
    pub due_date: NaiveDate,
}

impl TryFrom<AddWorkForm> for AddWorkPayload {
    type Error = FormError;

    fn try_from(form: AddWorkForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            title: WorkTitle::new(form.title).map_err(|_| FormError::InvalidName)?,
            description: optional_text(&form.description),
            due_date: parse_date(&form.due_date)?,
        })
    }
}

impl AddWorkPayload {
    pub fn into_new_work(self, lead_id: LeadId, assigned_to_id: UserId) -> NewWork {
        NewWork::new(
            lead_id,
            self.title,
            self.description,
            self.due_date,
            assigned_to_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_form_into_new_work() {
        let form = AddWorkForm {
            title: "Site visit".into(),
            description: "  ".into(),
            due_date: "2026-10-17".into(),
        };

        let work = AddWorkPayload::try_from(form)
            .unwrap()
            .into_new_work(LeadId::new(2).unwrap(), UserId::new(5).unwrap());

        assert_eq!(work.title.as_str(), "Site visit");
        assert_eq!(work.description, None);
        assert_eq!(work.due_date, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(work.assigned_to_id.get(), 5);
    }

    #[test]
    fn blank_title_is_rejected() {
        let form = AddWorkForm {
            title: "   ".into(),
            description: String::new(),
            due_date: "2026-10-17".into(),
        };
        assert_eq!(AddWorkPayload::try_from(form), Err(FormError::InvalidName));
    }
}
