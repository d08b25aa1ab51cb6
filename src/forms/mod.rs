//! Form definitions backing the lead and work routes.

use chrono::NaiveDate;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::{Amount, CommissionRate};

pub mod leads;
pub mod notes;
pub mod works;

#[derive(Debug, Error, PartialEq)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("commission percentage must be between 0 and 100")]
    InvalidPercentage,

    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    #[error("invalid user id")]
    InvalidUserId,

    #[error("content cannot be empty")]
    EmptyContent,
}

/// Reads an `<input type="date">` value.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| FormError::InvalidDate)
}

/// Blank inputs mean "not set".
pub(crate) fn parse_optional_amount(value: &str) -> Result<Option<Amount>, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let number = value
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| FormError::InvalidAmount)?;
    Amount::new(number).map(Some).map_err(|_| FormError::InvalidAmount)
}

pub(crate) fn parse_optional_rate(value: &str) -> Result<Option<CommissionRate>, FormError> {
    let value = value.trim().trim_end_matches('%').trim();
    if value.is_empty() {
        return Ok(None);
    }
    let number = value
        .parse::<f64>()
        .map_err(|_| FormError::InvalidPercentage)?;
    CommissionRate::new(number)
        .map(Some)
        .map_err(|_| FormError::InvalidPercentage)
}

pub(crate) fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
