//! Repository implementation for agents and admins.

use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::types::{UserEmail, UserId};
use crate::domain::user::{NewUser, User, UserRole};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .find(id.get())
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::email.eq(email.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_users(&self, role: Option<UserRole>) -> RepositoryResult<Vec<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let mut query = users::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(role) = role {
            query = query.filter(users::role.eq(role.as_str()));
        }

        let db_users = query
            .order((users::name.asc(), users::id.asc()))
            .load::<DbUser>(&mut conn)?;

        db_users
            .into_iter()
            .map(|user| User::try_from(user).map_err(RepositoryError::from))
            .collect()
    }
}

impl UserWriter for DieselRepository {
    fn upsert_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_new_user: DbNewUser = new_user.into();

        let db_user = diesel::insert_into(users::table)
            .values(&db_new_user)
            .on_conflict(users::email)
            .do_update()
            .set((
                users::name.eq(excluded(users::name)),
                users::role.eq(excluded(users::role)),
            ))
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }
}
