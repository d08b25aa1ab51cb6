//! Diesel models representing team members.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TypeConstraintError, UserEmail, UserId, UserName};
use crate::models::local_time;
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            email: UserEmail::new(user.email)?,
            name: UserName::new(user.name)?,
            role: user.role.parse()?,
            created_at: local_time(user.created_at),
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            email: user.email.as_str(),
            name: user.name.as_str(),
            role: user.role.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::user::UserRole;

    #[test]
    fn from_domain_new_user() {
        let domain = DomainNewUser::try_new("asha@example.com", "Asha", "ADMIN").unwrap();
        let new: NewUser = (&domain).into();
        assert_eq!(new.email, "asha@example.com");
        assert_eq!(new.name, "Asha");
        assert_eq!(new.role, "ADMIN");
    }

    #[test]
    fn rejects_unknown_roles_from_db() {
        let now = Utc::now().naive_utc();
        let row = User {
            id: 1,
            email: "asha@example.com".into(),
            name: "Asha".into(),
            role: "OWNER".into(),
            created_at: now,
        };
        assert!(DomainUser::try_from(row).is_err());

        let row = User {
            id: 1,
            email: "asha@example.com".into(),
            name: "Asha".into(),
            role: "AGENT".into(),
            created_at: now,
        };
        let user = DomainUser::try_from(row).unwrap();
        assert_eq!(user.role, UserRole::Agent);
    }
}
