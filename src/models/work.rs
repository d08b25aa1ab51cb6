use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::types::{LeadId, TypeConstraintError, UserId, WorkId, WorkTitle};
use crate::domain::work::{NewWork as DomainNewWork, Work as DomainWork};
use crate::models::lead::Lead;
use crate::models::local_time;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::works)]
#[diesel(belongs_to(Lead, foreign_key = lead_id))]
/// Diesel model for [`crate::domain::work::Work`].
pub struct Work {
    pub id: i32,
    pub lead_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDateTime>,
    pub status: String,
    pub assigned_to_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::works)]
pub struct NewWork<'a> {
    pub lead_id: i32,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: NaiveDate,
    pub assigned_to_id: i32,
}

impl TryFrom<Work> for DomainWork {
    type Error = TypeConstraintError;

    fn try_from(work: Work) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkId::try_from(work.id)?,
            lead_id: LeadId::try_from(work.lead_id)?,
            title: WorkTitle::new(work.title)?,
            description: work.description,
            due_date: work.due_date,
            completed_at: work.completed_at.map(local_time),
            status: work.status.parse()?,
            assigned_to_id: UserId::try_from(work.assigned_to_id)?,
            created_at: local_time(work.created_at),
            updated_at: local_time(work.updated_at),
        })
    }
}

impl<'a> From<&'a DomainNewWork> for NewWork<'a> {
    fn from(work: &'a DomainNewWork) -> Self {
        Self {
            lead_id: work.lead_id.get(),
            title: work.title.as_str(),
            description: work.description.as_deref(),
            due_date: work.due_date,
            assigned_to_id: work.assigned_to_id.get(),
        }
    }
}
