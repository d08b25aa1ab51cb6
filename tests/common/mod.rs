#![allow(dead_code)]

use chrono::NaiveDate;
use realty_leads::db::{DbPool, establish_connection_pool, run_pending_migrations};
use realty_leads::domain::lead::{LeadSource, NewLead};
use realty_leads::domain::types::{LeadName, PhoneNumber, UserId};
use realty_leads::domain::user::{NewUser, User};
use realty_leads::repository::{DieselRepository, LeadWriter, UserWriter};
use tempfile::TempDir;

/// SQLite database in a temporary directory, migrated and removed on drop.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("connection pool");
        run_pending_migrations(&pool).expect("migrations");
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

pub fn add_user(repo: &DieselRepository, email: &str, name: &str, role: &str) -> User {
    repo.upsert_user(&NewUser::try_new(email, name, role).unwrap())
        .unwrap()
}

pub fn new_lead(name: &str, phone: &str, follow_up: NaiveDate, agent: UserId) -> NewLead {
    NewLead::new(
        LeadName::new(name).unwrap(),
        PhoneNumber::new(phone).unwrap(),
        LeadSource::Call,
        follow_up,
        agent,
    )
}

pub fn add_lead(
    repo: &DieselRepository,
    name: &str,
    follow_up: NaiveDate,
    agent: UserId,
) -> realty_leads::domain::lead::Lead {
    repo.create_lead(&new_lead(name, "+919812345678", follow_up, agent), &[])
        .unwrap()
}
