//! Immutable audit trail of what agents did to a lead.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ActivityLogId, LeadId, UserId};

text_enum!(
    /// Kind of change recorded in the activity log.
    ActivityAction {
        LeadCreated => "LEAD_CREATED",
        StatusChanged => "STATUS_CHANGED",
        FollowUpChanged => "FOLLOW_UP_CHANGED",
        DealValueChanged => "DEAL_VALUE_CHANGED",
        NoteAdded => "NOTE_ADDED",
        WorkAdded => "WORK_ADDED",
        WorkCompleted => "WORK_COMPLETED",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub lead_id: LeadId,
    pub agent_id: UserId,
    pub agent_name: String,
    pub action: ActivityAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewActivityLog {
    pub lead_id: LeadId,
    pub agent_id: UserId,
    pub agent_name: String,
    pub action: ActivityAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: String,
}

impl NewActivityLog {
    #[must_use]
    pub fn new(
        lead_id: LeadId,
        agent_id: UserId,
        agent_name: impl Into<String>,
        action: ActivityAction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            lead_id,
            agent_id,
            agent_name: agent_name.into(),
            action,
            old_value: None,
            new_value: None,
            description: description.into(),
        }
    }

    /// Records the before/after values of a field change.
    #[must_use]
    pub fn change(mut self, old_value: impl ToString, new_value: impl ToString) -> Self {
        self.old_value = Some(old_value.to_string());
        self.new_value = Some(new_value.to_string());
        self
    }
}

/// Audit entry for a write that has not happened yet.
///
/// Repository writers attach the lead id of the row they touch and insert the
/// entry in the same transaction, so a change and its audit trail commit or
/// roll back together.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityDraft {
    pub agent_id: UserId,
    pub agent_name: String,
    pub action: ActivityAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: String,
}

impl ActivityDraft {
    #[must_use]
    pub fn new(
        agent_id: UserId,
        agent_name: impl Into<String>,
        action: ActivityAction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            agent_id,
            agent_name: agent_name.into(),
            action,
            old_value: None,
            new_value: None,
            description: description.into(),
        }
    }

    /// Records the before/after values of a field change.
    #[must_use]
    pub fn change(mut self, old_value: impl ToString, new_value: impl ToString) -> Self {
        self.old_value = Some(old_value.to_string());
        self.new_value = Some(new_value.to_string());
        self
    }

    pub fn for_lead(&self, lead_id: LeadId) -> NewActivityLog {
        NewActivityLog {
            lead_id,
            agent_id: self.agent_id,
            agent_name: self.agent_name.clone(),
            action: self.action,
            old_value: self.old_value.clone(),
            new_value: self.new_value.clone(),
            description: self.description.clone(),
        }
    }
}
