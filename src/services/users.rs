use crate::access::ADMIN_ROLES;
use crate::domain::user::{User, UserRole};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Maps verified token claims onto the local user record, creating it on the
/// first visit and refreshing name and role afterwards.
pub fn resolve_user<R>(repo: &R, claims: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let new_user = claims.to_new_user()?;
    repo.upsert_user(&new_user).map_err(|err| {
        log::error!("Failed to store user {}: {err}", claims.email);
        ServiceError::from(err)
    })
}

/// Team members visible to an admin.
pub fn list_users<R>(repo: &R, user: &User, role: Option<UserRole>) -> ServiceResult<Vec<User>>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLES)?;
    repo.list_users(role).map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{FakeRepository, user};

    fn claims(email: &str, name: &str, role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "ext-1".to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn first_visit_creates_user_and_later_visits_refresh_it() {
        let repo = FakeRepository::default();

        let created = resolve_user(&repo, &claims("asha@example.com", "Asha", UserRole::Agent))
            .unwrap();
        let refreshed =
            resolve_user(&repo, &claims("ASHA@example.com", "Asha R", UserRole::Admin)).unwrap();

        assert_eq!(created.id, refreshed.id);
        assert_eq!(refreshed.name.as_str(), "Asha R");
        assert_eq!(refreshed.role, UserRole::Admin);
        assert_eq!(repo.users.borrow().len(), 1);
    }

    #[test]
    fn malformed_claims_are_rejected() {
        let repo = FakeRepository::default();
        let result = resolve_user(&repo, &claims("not-an-email", "Asha", UserRole::Agent));
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    #[test]
    fn only_admins_list_users() {
        let agent = user(1, "Asha", UserRole::Agent);
        let admin = user(2, "Vikram", UserRole::Admin);
        let repo = FakeRepository::with_users(vec![agent.clone(), admin.clone()]);

        assert!(matches!(
            list_users(&repo, &agent, None),
            Err(ServiceError::Unauthorized)
        ));
        let agents = list_users(&repo, &admin, Some(UserRole::Agent)).unwrap();
        assert_eq!(agents, vec![agent]);
    }
}
