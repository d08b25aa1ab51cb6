use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::lead::{Lead as DomainLead, NewLead as DomainNewLead, UpdateLead as DomainUpdateLead};
use crate::domain::types::{
    Amount, CommissionRate, LeadId, LeadName, PhoneNumber, TypeConstraintError, UserId,
};
use crate::models::local_time;
use crate::models::user::User;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(belongs_to(User, foreign_key = assigned_to_id))]
/// Diesel model for [`crate::domain::lead::Lead`].
pub struct Lead {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub project: Option<String>,
    pub location: Option<String>,
    pub source: String,
    pub status: String,
    pub follow_up_date: NaiveDate,
    pub follow_up_status: String,
    pub assigned_to_id: i32,
    pub expected_deal_value: Option<f64>,
    pub commission_percentage: Option<f64>,
    pub last_contacted_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::leads)]
/// Insertable form of [`Lead`].
pub struct NewLead<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub project: Option<&'a str>,
    pub location: Option<&'a str>,
    pub source: &'a str,
    pub status: &'a str,
    pub follow_up_date: NaiveDate,
    pub follow_up_status: &'a str,
    pub assigned_to_id: i32,
    pub expected_deal_value: Option<f64>,
    pub commission_percentage: Option<f64>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Lead`] record.
pub struct UpdateLead<'a> {
    pub status: &'a str,
    pub follow_up_date: NaiveDate,
    pub follow_up_status: &'a str,
    pub expected_deal_value: Option<f64>,
    pub commission_percentage: Option<f64>,
    pub last_contacted_date: Option<NaiveDate>,
}

impl TryFrom<Lead> for DomainLead {
    type Error = TypeConstraintError;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LeadId::try_from(lead.id)?,
            name: LeadName::new(lead.name)?,
            phone: PhoneNumber::new(lead.phone)?,
            project: lead.project,
            location: lead.location,
            source: lead.source.parse()?,
            status: lead.status.parse()?,
            follow_up_date: lead.follow_up_date,
            follow_up_status: lead.follow_up_status.parse()?,
            assigned_to_id: UserId::try_from(lead.assigned_to_id)?,
            expected_deal_value: lead.expected_deal_value.map(Amount::new).transpose()?,
            commission_percentage: lead
                .commission_percentage
                .map(CommissionRate::new)
                .transpose()?,
            last_contacted_date: lead.last_contacted_date,
            created_at: local_time(lead.created_at),
            updated_at: local_time(lead.updated_at),
        })
    }
}

impl<'a> From<&'a DomainNewLead> for NewLead<'a> {
    fn from(lead: &'a DomainNewLead) -> Self {
        Self {
            name: lead.name.as_str(),
            phone: lead.phone.as_str(),
            project: lead.project.as_deref(),
            location: lead.location.as_deref(),
            source: lead.source.as_str(),
            status: lead.status.as_str(),
            follow_up_date: lead.follow_up_date,
            follow_up_status: lead.follow_up_status.as_str(),
            assigned_to_id: lead.assigned_to_id.get(),
            expected_deal_value: lead.expected_deal_value.map(Amount::get),
            commission_percentage: lead.commission_percentage.map(CommissionRate::get),
        }
    }
}

impl<'a> From<&'a DomainUpdateLead> for UpdateLead<'a> {
    fn from(lead: &'a DomainUpdateLead) -> Self {
        Self {
            status: lead.status.as_str(),
            follow_up_date: lead.follow_up_date,
            follow_up_status: lead.follow_up_status.as_str(),
            expected_deal_value: lead.expected_deal_value.map(Amount::get),
            commission_percentage: lead.commission_percentage.map(CommissionRate::get),
            last_contacted_date: lead.last_contacted_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::{FollowUpStatus, LeadSource, LeadStatus};

    fn row() -> Lead {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let now = date.and_hms_opt(10, 0, 0).unwrap();
        Lead {
            id: 3,
            name: "Meera".into(),
            phone: "+919812345678".into(),
            project: None,
            location: Some("Whitefield".into()),
            source: "WALK_IN".into(),
            status: "NEGOTIATION".into(),
            follow_up_date: date,
            follow_up_status: "INTERESTED".into(),
            assigned_to_id: 2,
            expected_deal_value: Some(9_000_000.0),
            commission_percentage: Some(1.5),
            last_contacted_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lead_into_domain() {
        let lead = DomainLead::try_from(row()).unwrap();
        assert_eq!(lead.id.get(), 3);
        assert_eq!(lead.source, LeadSource::WalkIn);
        assert_eq!(lead.status, LeadStatus::Negotiation);
        assert_eq!(lead.follow_up_status, FollowUpStatus::Interested);
        assert_eq!(lead.expected_commission(), Some(135_000.0));
    }

    #[test]
    fn corrupt_enum_values_are_rejected() {
        let mut bad = row();
        bad.status = "WON".into();
        assert!(DomainLead::try_from(bad).is_err());
    }

    #[test]
    fn update_clears_removed_commission() {
        let mut domain = DomainUpdateLead::from_lead(&DomainLead::try_from(row()).unwrap());
        domain.commission_percentage = None;
        let update: UpdateLead = (&domain).into();
        assert_eq!(update.commission_percentage, None);
        assert_eq!(update.expected_deal_value, Some(9_000_000.0));
        assert_eq!(update.status, "NEGOTIATION");
    }
}
