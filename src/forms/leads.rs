//! Forms for creating leads and moving them through the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::lead::{FollowUpStatus, Lead, LeadSource, LeadStatus, NewLead, UpdateLead};
use crate::domain::types::{Amount, CommissionRate, LeadName, PhoneNumber, UserId};
use crate::forms::{
    FormError, optional_text, parse_date, parse_optional_amount, parse_optional_rate,
};

#[derive(Debug, Deserialize, Validate)]
/// Form data posted by the "new lead" page.
pub struct CreateLeadForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub location: String,
    pub source: String,
    /// `YYYY-MM-DD` as sent by a date input.
    pub follow_up_date: String,
    #[serde(default)]
    pub expected_deal_value: String,
    #[serde(default)]
    pub commission_percentage: String,
    /// Admins may assign the lead to another agent; blank means "me".
    #[serde(default)]
    pub assigned_to_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// JSON body of `POST /api/v1/leads`.
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    pub project: Option<String>,
    pub location: Option<String>,
    pub source: LeadSource,
    pub follow_up_date: NaiveDate,
    pub expected_deal_value: Option<f64>,
    pub commission_percentage: Option<f64>,
    pub assigned_to_id: Option<i32>,
}

/// Validated lead data ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLeadPayload {
    pub name: LeadName,
    pub phone: PhoneNumber,
    pub project: Option<String>,
    pub location: Option<String>,
    pub source: LeadSource,
    pub follow_up_date: NaiveDate,
    pub expected_deal_value: Option<Amount>,
    pub commission_percentage: Option<CommissionRate>,
    pub assigned_to_id: Option<UserId>,
}

impl CreateLeadPayload {
    /// Builds the new lead, assigning it to `fallback_assignee` when the form
    /// did not name anyone.
    pub fn into_new_lead(self, fallback_assignee: UserId) -> NewLead {
        NewLead::new(
            self.name,
            self.phone,
            self.source,
            self.follow_up_date,
            self.assigned_to_id.unwrap_or(fallback_assignee),
        )
        .with_place(self.project, self.location)
        .with_commission(self.expected_deal_value, self.commission_percentage)
    }
}

fn parse_assignee(value: &str) -> Result<Option<UserId>, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i32>()
        .ok()
        .and_then(|id| UserId::new(id).ok())
        .map(Some)
        .ok_or(FormError::InvalidUserId)
}

impl TryFrom<CreateLeadForm> for CreateLeadPayload {
    type Error = FormError;

    fn try_from(form: CreateLeadForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            name: LeadName::new(form.name).map_err(|_| FormError::InvalidName)?,
            phone: PhoneNumber::new(form.phone).map_err(|_| FormError::InvalidPhoneNumber)?,
            project: optional_text(&form.project),
            location: optional_text(&form.location),
            source: form
                .source
                .parse()
                .map_err(|_| FormError::InvalidChoice(form.source.clone()))?,
            follow_up_date: parse_date(&form.follow_up_date)?,
            expected_deal_value: parse_optional_amount(&form.expected_deal_value)?,
            commission_percentage: parse_optional_rate(&form.commission_percentage)?,
            assigned_to_id: parse_assignee(&form.assigned_to_id)?,
        })
    }
}

impl TryFrom<CreateLeadRequest> for CreateLeadPayload {
    type Error = FormError;

    fn try_from(request: CreateLeadRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        Ok(Self {
            name: LeadName::new(request.name).map_err(|_| FormError::InvalidName)?,
            phone: PhoneNumber::new(request.phone).map_err(|_| FormError::InvalidPhoneNumber)?,
            project: request.project.as_deref().and_then(optional_text),
            location: request.location.as_deref().and_then(optional_text),
            source: request.source,
            follow_up_date: request.follow_up_date,
            expected_deal_value: request
                .expected_deal_value
                .map(Amount::new)
                .transpose()
                .map_err(|_| FormError::InvalidAmount)?,
            commission_percentage: request
                .commission_percentage
                .map(CommissionRate::new)
                .transpose()
                .map_err(|_| FormError::InvalidPercentage)?,
            assigned_to_id: request
                .assigned_to_id
                .map(UserId::new)
                .transpose()
                .map_err(|_| FormError::InvalidUserId)?,
        })
    }
}

#[derive(Debug, Deserialize)]
/// Pipeline fields edited on the lead detail page.
pub struct UpdateLeadForm {
    pub status: String,
    pub follow_up_date: String,
    pub follow_up_status: String,
    #[serde(default)]
    pub expected_deal_value: String,
    #[serde(default)]
    pub commission_percentage: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateLeadPayload {
    pub status: LeadStatus,
    pub follow_up_date: NaiveDate,
    pub follow_up_status: FollowUpStatus,
    pub expected_deal_value: Option<Amount>,
    pub commission_percentage: Option<CommissionRate>,
}

impl TryFrom<UpdateLeadForm> for UpdateLeadPayload {
    type Error = FormError;

    fn try_from(form: UpdateLeadForm) -> Result<Self, Self::Error> {
        Ok(Self {
            status: form
                .status
                .parse()
                .map_err(|_| FormError::InvalidChoice(form.status.clone()))?,
            follow_up_date: parse_date(&form.follow_up_date)?,
            follow_up_status: form
                .follow_up_status
                .parse()
                .map_err(|_| FormError::InvalidChoice(form.follow_up_status.clone()))?,
            expected_deal_value: parse_optional_amount(&form.expected_deal_value)?,
            commission_percentage: parse_optional_rate(&form.commission_percentage)?,
        })
    }
}

impl UpdateLeadPayload {
    /// Applies the edited fields on top of `lead`.
    ///
    /// A status change counts as a contact made on `today`.
    pub fn apply_to(self, lead: &Lead, today: NaiveDate) -> UpdateLead {
        let mut update = UpdateLead::from_lead(lead);
        if self.status != lead.status {
            update.last_contacted_date = Some(today);
        }
        update.status = self.status;
        update.follow_up_date = self.follow_up_date;
        update.follow_up_status = self.follow_up_status;
        update.expected_deal_value = self.expected_deal_value;
        update.commission_percentage = self.commission_percentage;
        update
    }
}
