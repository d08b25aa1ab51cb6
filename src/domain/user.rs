use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, UserEmail, UserId, UserName};

text_enum!(
    /// Access level of a team member.
    UserRole {
        Agent => "AGENT",
        Admin => "ADMIN",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: UserEmail,
    pub name: UserName,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

/// Data required to register (or refresh) a team member.
#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub email: UserEmail,
    pub name: UserName,
    pub role: UserRole,
}

impl NewUser {
    #[must_use]
    pub fn new(email: UserEmail, name: UserName, role: UserRole) -> Self {
        Self { email, name, role }
    }

    /// Validates raw values before building the payload.
    pub fn try_new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: &str,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            email: UserEmail::new(email)?,
            name: UserName::new(name)?,
            role: role.parse()?,
        })
    }
}
