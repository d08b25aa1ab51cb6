use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{LeadId, UserId, WorkId, WorkTitle};

text_enum!(
    /// Completion state of a follow-up work.
    WorkStatus {
        Pending => "PENDING",
        Completed => "COMPLETED",
    }
);

/// Whole days between `due_date` and `today`.
///
/// Positive when the due date has passed, zero on the due date itself and
/// negative for future dates.
pub fn days_overdue(due_date: NaiveDate, today: NaiveDate) -> i64 {
    today.signed_duration_since(due_date).num_days()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: WorkId,
    pub lead_id: LeadId,
    pub title: WorkTitle,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDateTime>,
    pub status: WorkStatus,
    pub assigned_to_id: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Work {
    pub fn is_pending(&self) -> bool {
        self.status == WorkStatus::Pending
    }

    /// Days past due for pending work; `None` once completed.
    pub fn days_overdue(&self, today: NaiveDate) -> Option<i64> {
        self.is_pending()
            .then(|| days_overdue(self.due_date, today))
    }
}

#[derive(Clone, Debug)]
pub struct NewWork {
    pub lead_id: LeadId,
    pub title: WorkTitle,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub assigned_to_id: UserId,
}

impl NewWork {
    #[must_use]
    pub fn new(
        lead_id: LeadId,
        title: WorkTitle,
        description: Option<String>,
        due_date: NaiveDate,
        assigned_to_id: UserId,
    ) -> Self {
        Self {
            lead_id,
            title,
            description: description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            due_date,
            assigned_to_id,
        }
    }
}
