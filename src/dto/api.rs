//! JSON bodies returned by the `/api/v1` endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::activity_log::ActivityLog;
use crate::domain::lead::Lead;
use crate::domain::note::Note;

/// Page of leads plus the number of matches across all pages.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadsResponse {
    pub total: usize,
    pub leads: Vec<LeadView>,
}

/// Lead with its derived figures.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    #[serde(flatten)]
    pub lead: Lead,
    pub expected_commission: Option<f64>,
    pub is_overdue: bool,
}

impl LeadView {
    pub fn new(lead: Lead, today: chrono::NaiveDate) -> Self {
        Self {
            expected_commission: lead.expected_commission(),
            is_overdue: lead.is_overdue(today),
            lead,
        }
    }
}

/// Lead detail including its notes and audit trail, newest first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetailResponse {
    #[serde(flatten)]
    pub lead: LeadView,
    pub notes: Vec<Note>,
    pub activity_logs: Vec<ActivityLog>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::lead::LeadStatus;
    use crate::domain::lead::tests::sample_lead;

    #[test]
    fn lead_view_serializes_flat_camel_case() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let lead = sample_lead(LeadStatus::New, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());

        let json = serde_json::to_value(LeadView::new(lead, today)).unwrap();

        assert_eq!(json["name"], "Ravi Kumar");
        assert_eq!(json["status"], "NEW");
        assert_eq!(json["followUpDate"], "2026-10-12");
        assert_eq!(json["isOverdue"], true);
        assert!(json["expectedCommission"].is_null());
    }
}
