use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Amount, CommissionRate, LeadId, LeadName, PhoneNumber, UserId};

text_enum!(
    /// Position of a lead in the sales pipeline.
    LeadStatus {
        New => "NEW",
        Contacted => "CONTACTED",
        SiteVisitDone => "SITE_VISIT_DONE",
        Negotiation => "NEGOTIATION",
        Closed => "CLOSED",
        Lost => "LOST",
    }
);

text_enum!(
    /// Channel the lead came in through.
    LeadSource {
        Call => "CALL",
        WhatsApp => "WHATSAPP",
        Portal => "PORTAL",
        WalkIn => "WALK_IN",
        Facebook => "FACEBOOK",
        Referral => "REFERRAL",
        Other => "OTHER",
    }
);

text_enum!(
    /// Outcome of the latest follow-up call.
    FollowUpStatus {
        Pending => "PENDING",
        SelectDate => "SELECT_DATE",
        Completed => "COMPLETED",
        NotNegotiable => "NOT_NEGOTIABLE",
        Interested => "INTERESTED",
        FollowUpLater => "FOLLOW_UP_LATER",
        NotResponding => "NOT_RESPONDING",
        SiteVisitDone => "SITE_VISIT_DONE",
    }
);

impl LeadStatus {
    /// Closed and lost leads leave the pipeline.
    pub const fn is_open(self) -> bool {
        !matches!(self, LeadStatus::Closed | LeadStatus::Lost)
    }
}

/// Which commission total a lead contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommissionBucket {
    Closed,
    Lost,
    InProgress,
}

impl From<LeadStatus> for CommissionBucket {
    fn from(status: LeadStatus) -> Self {
        match status {
            LeadStatus::Closed => CommissionBucket::Closed,
            LeadStatus::Lost => CommissionBucket::Lost,
            _ => CommissionBucket::InProgress,
        }
    }
}

/// Commission earned on a deal of `deal_value` at `percentage` percent.
pub fn expected_commission(deal_value: Amount, percentage: CommissionRate) -> f64 {
    deal_value.get() * percentage.get() / 100.0
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    pub name: LeadName,
    pub phone: PhoneNumber,
    pub project: Option<String>,
    pub location: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub follow_up_date: NaiveDate,
    pub follow_up_status: FollowUpStatus,
    pub assigned_to_id: UserId,
    pub expected_deal_value: Option<Amount>,
    pub commission_percentage: Option<CommissionRate>,
    pub last_contacted_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Lead {
    /// Commission expected on this deal, when both value and rate are known.
    pub fn expected_commission(&self) -> Option<f64> {
        match (self.expected_deal_value, self.commission_percentage) {
            (Some(value), Some(rate)) => Some(expected_commission(value, rate)),
            _ => None,
        }
    }

    /// An open lead whose follow-up date has already passed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.follow_up_date < today
    }

    /// Open lead that is due for a call today or earlier.
    pub fn is_due_for_call(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.follow_up_date <= today
    }

    pub fn commission_bucket(&self) -> CommissionBucket {
        self.status.into()
    }
}

#[derive(Clone, Debug)]
pub struct NewLead {
    pub name: LeadName,
    pub phone: PhoneNumber,
    pub project: Option<String>,
    pub location: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub follow_up_date: NaiveDate,
    pub follow_up_status: FollowUpStatus,
    pub assigned_to_id: UserId,
    pub expected_deal_value: Option<Amount>,
    pub commission_percentage: Option<CommissionRate>,
}

impl NewLead {
    /// Builds a fresh lead in the `NEW` stage with a pending follow-up.
    #[must_use]
    pub fn new(
        name: LeadName,
        phone: PhoneNumber,
        source: LeadSource,
        follow_up_date: NaiveDate,
        assigned_to_id: UserId,
    ) -> Self {
        Self {
            name,
            phone,
            project: None,
            location: None,
            source,
            status: LeadStatus::New,
            follow_up_date,
            follow_up_status: FollowUpStatus::Pending,
            assigned_to_id,
            expected_deal_value: None,
            commission_percentage: None,
        }
    }

    #[must_use]
    pub fn with_place(mut self, project: Option<String>, location: Option<String>) -> Self {
        self.project = project
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.location = location
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub fn with_commission(
        mut self,
        deal_value: Option<Amount>,
        percentage: Option<CommissionRate>,
    ) -> Self {
        self.expected_deal_value = deal_value;
        self.commission_percentage = percentage;
        self
    }
}

/// Mutable pipeline fields of a lead. Every field is written on update.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateLead {
    pub status: LeadStatus,
    pub follow_up_date: NaiveDate,
    pub follow_up_status: FollowUpStatus,
    pub expected_deal_value: Option<Amount>,
    pub commission_percentage: Option<CommissionRate>,
    pub last_contacted_date: Option<NaiveDate>,
}

impl UpdateLead {
    /// Starts an update that keeps every field of `lead` unchanged.
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            status: lead.status,
            follow_up_date: lead.follow_up_date,
            follow_up_status: lead.follow_up_status,
            expected_deal_value: lead.expected_deal_value,
            commission_percentage: lead.commission_percentage,
            last_contacted_date: lead.last_contacted_date,
        }
    }
}
