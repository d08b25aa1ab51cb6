//! Diesel models for the lead activity log.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::activity_log::{
    ActivityLog as DomainActivityLog, NewActivityLog as DomainNewActivityLog,
};
use crate::domain::types::{ActivityLogId, LeadId, TypeConstraintError, UserId};
use crate::models::lead::Lead;
use crate::models::local_time;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::activity_logs)]
#[diesel(belongs_to(Lead, foreign_key = lead_id))]
pub struct ActivityLog {
    pub id: i32,
    pub lead_id: i32,
    pub agent_id: i32,
    pub agent_name: String,
    pub action: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::activity_logs)]
pub struct NewActivityLog<'a> {
    pub lead_id: i32,
    pub agent_id: i32,
    pub agent_name: &'a str,
    pub action: &'a str,
    pub old_value: Option<&'a str>,
    pub new_value: Option<&'a str>,
    pub description: &'a str,
}

impl TryFrom<ActivityLog> for DomainActivityLog {
    type Error = TypeConstraintError;

    fn try_from(log: ActivityLog) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActivityLogId::try_from(log.id)?,
            lead_id: LeadId::try_from(log.lead_id)?,
            agent_id: UserId::try_from(log.agent_id)?,
            agent_name: log.agent_name,
            action: log.action.parse()?,
            old_value: log.old_value,
            new_value: log.new_value,
            description: log.description,
            created_at: local_time(log.created_at),
        })
    }
}

impl<'a> From<&'a DomainNewActivityLog> for NewActivityLog<'a> {
    fn from(log: &'a DomainNewActivityLog) -> Self {
        Self {
            lead_id: log.lead_id.get(),
            agent_id: log.agent_id.get(),
            agent_name: log.agent_name.as_str(),
            action: log.action.as_str(),
            old_value: log.old_value.as_deref(),
            new_value: log.new_value.as_deref(),
            description: log.description.as_str(),
        }
    }
}
