//! Repository implementation for leads.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::activity_log::ActivityDraft;
use crate::domain::lead::{Lead, LeadStatus, NewLead, UpdateLead};
use crate::domain::types::LeadId;
use crate::models::lead::{Lead as DbLead, NewLead as DbNewLead, UpdateLead as DbUpdateLead};
use crate::repository::activity_log::insert_audit;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, LeadListQuery, LeadReader, LeadWriter};
use crate::schema::leads;

type BoxedLeadQuery<'a> = leads::BoxedQuery<'a, Sqlite>;

fn filtered_leads(query: &LeadListQuery) -> BoxedLeadQuery<'_> {
    let mut items = leads::table.into_boxed::<Sqlite>();

    if let Some(user_id) = query.assigned_to {
        items = items.filter(leads::assigned_to_id.eq(user_id.get()));
    }
    if let Some(status) = query.status {
        items = items.filter(leads::status.eq(status.as_str()));
    }
    if let Some(date) = query.follow_up_on_or_before {
        items = items.filter(leads::follow_up_date.le(date));
    }
    if query.open_only {
        items = items.filter(
            leads::status.ne_all([LeadStatus::Closed.as_str(), LeadStatus::Lost.as_str()]),
        );
    }
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{term}%");
        items = items.filter(
            leads::name
                .like(pattern.clone())
                .or(leads::phone.like(pattern.clone()))
                .or(leads::project.assume_not_null().like(pattern.clone()))
                .or(leads::location.assume_not_null().like(pattern)),
        );
    }

    items
}

impl LeadReader for DieselRepository {
    fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>> {
        let mut conn = self.conn()?;
        let db_lead = leads::table
            .find(id.get())
            .first::<DbLead>(&mut conn)
            .optional()?;

        db_lead
            .map(Lead::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)> {
        let mut conn = self.conn()?;

        let total = filtered_leads(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_leads(&query);
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let db_leads = items
            .order((leads::follow_up_date.asc(), leads::id.asc()))
            .load::<DbLead>(&mut conn)?;

        let leads = db_leads
            .into_iter()
            .map(|lead| Lead::try_from(lead).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, leads))
    }
}

impl LeadWriter for DieselRepository {
    fn create_lead(&self, new_lead: &NewLead, audit: &[ActivityDraft]) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;
        let db_new_lead: DbNewLead = new_lead.into();

        conn.transaction::<Lead, RepositoryError, _>(|conn| {
            let db_lead = diesel::insert_into(leads::table)
                .values(&db_new_lead)
                .get_result::<DbLead>(conn)?;

            let lead = Lead::try_from(db_lead)?;
            insert_audit(conn, lead.id, audit)?;
            Ok(lead)
        })
    }

    fn update_lead(
        &self,
        id: LeadId,
        updates: &UpdateLead,
        audit: &[ActivityDraft],
    ) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;
        let db_updates: DbUpdateLead = updates.into();

        conn.transaction::<Lead, RepositoryError, _>(|conn| {
            let db_lead = diesel::update(leads::table.find(id.get()))
                .set((&db_updates, leads::updated_at.eq(Utc::now().naive_utc())))
                .get_result::<DbLead>(conn)?;

            insert_audit(conn, id, audit)?;
            Ok(Lead::try_from(db_lead)?)
        })
    }
}
