use chrono::NaiveDate;
use realty_leads::domain::activity_log::{ActivityAction, ActivityDraft, NewActivityLog};
use realty_leads::domain::lead::{LeadStatus, UpdateLead};
use realty_leads::domain::note::NewNote;
use realty_leads::domain::types::{
    Amount, CommissionRate, LeadId, NoteContent, UserEmail, UserId, WorkTitle,
};
use realty_leads::domain::user::UserRole;
use realty_leads::domain::work::{NewWork, WorkStatus};
use realty_leads::models::local_time;
use realty_leads::repository::{
    ActivityLogReader, ActivityLogWriter, LeadListQuery, LeadReader, LeadWriter, NoteReader,
    NoteWriter, UserReader, WorkListQuery, WorkReader, WorkWriter,
};

mod common;

use common::{TestDb, add_lead, add_user, date};

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = TestDb::new("test_in_memory_connection.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}

#[test]
fn test_user_upsert_refreshes_existing_email() {
    let test_db = TestDb::new("test_user_upsert.db");
    let repo = test_db.repo();

    let first = add_user(&repo, "asha@example.com", "Asha", "AGENT");
    let again = add_user(&repo, "asha@example.com", "Asha Rao", "ADMIN");
    add_user(&repo, "dev@example.com", "Dev", "AGENT");

    assert_eq!(first.id, again.id);
    assert_eq!(again.name.as_str(), "Asha Rao");
    assert_eq!(again.role, UserRole::Admin);

    let agents = repo.list_users(Some(UserRole::Agent)).unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name.as_str(), "Dev");
    assert_eq!(repo.list_users(None).unwrap().len(), 2);

    let email = UserEmail::new("asha@example.com").unwrap();
    assert_eq!(repo.get_user_by_email(&email).unwrap().unwrap().id, first.id);
}

#[test]
fn test_lead_list_filters_and_pages() {
    let test_db = TestDb::new("test_lead_list.db");
    let repo = test_db.repo();
    let asha = add_user(&repo, "asha@example.com", "Asha", "AGENT");
    let dev = add_user(&repo, "dev@example.com", "Dev", "AGENT");

    let ravi = add_lead(&repo, "Ravi Kumar", date(18), asha.id);
    let meera = add_lead(&repo, "Meera Shah", date(12), asha.id);
    let lost = add_lead(&repo, "Old Prospect", date(10), asha.id);
    add_lead(&repo, "Sunil Das", date(14), dev.id);

    let mut update = UpdateLead::from_lead(&lost);
    update.status = LeadStatus::Lost;
    repo.update_lead(lost.id, &update, &[]).unwrap();

    let (total, leads) = repo
        .list_leads(LeadListQuery::new().assigned_to(asha.id))
        .unwrap();
    assert_eq!(total, 3);
    let names: Vec<&str> = leads.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Old Prospect", "Meera Shah", "Ravi Kumar"]);

    let (_, due) = repo
        .list_leads(
            LeadListQuery::new()
                .assigned_to(asha.id)
                .open_only()
                .due_on_or_before(date(16)),
        )
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, meera.id);

    let (total, found) = repo
        .list_leads(LeadListQuery::new().search("ravi"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, ravi.id);

    let (_, lost_only) = repo
        .list_leads(LeadListQuery::new().status(LeadStatus::Lost))
        .unwrap();
    assert_eq!(lost_only.len(), 1);

    let (total, page) = repo
        .list_leads(LeadListQuery::new().paginate(2, 3))
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, ravi.id);
}

#[test]
fn test_lead_update_persists_pipeline_fields() {
    let test_db = TestDb::new("test_lead_update.db");
    let repo = test_db.repo();
    let asha = add_user(&repo, "asha@example.com", "Asha", "AGENT");
    let lead = add_lead(&repo, "Ravi Kumar", date(16), asha.id);

    let mut update = UpdateLead::from_lead(&lead);
    update.status = LeadStatus::Negotiation;
    update.follow_up_date = date(20);
    update.expected_deal_value = Some(Amount::new(8_500_000.0).unwrap());
    update.commission_percentage = Some(CommissionRate::new(2.0).unwrap());
    update.last_contacted_date = Some(date(16));
    repo.update_lead(lead.id, &update, &[]).unwrap();

    let stored = repo.get_lead_by_id(lead.id).unwrap().unwrap();
    assert_eq!(stored.status, LeadStatus::Negotiation);
    assert_eq!(stored.follow_up_date, date(20));
    assert_eq!(stored.last_contacted_date, Some(date(16)));
    assert_eq!(stored.expected_commission(), Some(170_000.0));

    assert!(repo.get_lead_by_id(LeadId::new(999).unwrap()).unwrap().is_none());
}

#[test]
fn test_notes_and_activity_logs_newest_first() {
    let test_db = TestDb::new("test_notes_logs.db");
    let repo = test_db.repo();
    let asha = add_user(&repo, "asha@example.com", "Asha", "AGENT");
    let lead = add_lead(&repo, "Ravi Kumar", date(16), asha.id);

    for text in ["Called, no answer", "Asked for brochure"] {
        repo.create_note(&NewNote::new(lead.id, NoteContent::new(text).unwrap()), &[])
            .unwrap();
    }
    let notes = repo.list_notes(lead.id).unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].content.as_str(), "Asked for brochure");

    repo.create_activity_log(&NewActivityLog::new(
        lead.id,
        asha.id,
        "Asha",
        ActivityAction::LeadCreated,
        "Lead created",
    ))
    .unwrap();
    repo.create_activity_log(
        &NewActivityLog::new(
            lead.id,
            asha.id,
            "Asha",
            ActivityAction::StatusChanged,
            "Status changed",
        )
        .change("NEW", "CONTACTED"),
    )
    .unwrap();

    let logs = repo.list_activity_logs(lead.id).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action, ActivityAction::StatusChanged);
    assert_eq!(logs[0].old_value.as_deref(), Some("NEW"));
    assert_eq!(logs[0].new_value.as_deref(), Some("CONTACTED"));
}

#[test]
fn test_work_completion_happens_once() {
    let test_db = TestDb::new("test_work_completion.db");
    let repo = test_db.repo();
    let asha = add_user(&repo, "asha@example.com", "Asha", "AGENT");
    let lead = add_lead(&repo, "Ravi Kumar", date(16), asha.id);

    let later = repo
        .create_work(
            &NewWork::new(
                lead.id,
                WorkTitle::new("Share floor plan").unwrap(),
                Some("  ".to_string()),
                date(20),
                asha.id,
            ),
            &[],
        )
        .unwrap();
    let sooner = repo
        .create_work(
            &NewWork::new(
                lead.id,
                WorkTitle::new("Call back").unwrap(),
                None,
                date(15),
                asha.id,
            ),
            &[],
        )
        .unwrap();
    assert_eq!(later.status, WorkStatus::Pending);
    assert_eq!(later.description, None);

    let works = repo
        .list_works(WorkListQuery::new().assigned_to(asha.id))
        .unwrap();
    assert_eq!(works[0].id, sooner.id);

    let at = NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(11, 30, 0)
        .unwrap()
        .and_utc();
    let completed = repo.complete_work(sooner.id, at, &[]).unwrap().unwrap();
    assert_eq!(completed.status, WorkStatus::Completed);
    assert_eq!(completed.completed_at, Some(local_time(at.naive_utc())));

    assert!(repo.complete_work(sooner.id, at, &[]).unwrap().is_none());

    let pending = repo
        .list_works(WorkListQuery::new().lead(lead.id).status(WorkStatus::Pending))
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, later.id);
}

fn draft(agent: UserId, action: ActivityAction) -> ActivityDraft {
    ActivityDraft::new(agent, "Asha", action, action.to_string())
}

#[test]
fn test_writes_attach_audit_to_the_lead() {
    let test_db = TestDb::new("test_write_audit.db");
    let repo = test_db.repo();
    let asha = add_user(&repo, "asha@example.com", "Asha", "AGENT");

    let lead = repo
        .create_lead(
            &common::new_lead("Ravi Kumar", "+919812345678", date(16), asha.id),
            &[draft(asha.id, ActivityAction::LeadCreated)],
        )
        .unwrap();

    let mut update = UpdateLead::from_lead(&lead);
    update.status = LeadStatus::Contacted;
    update.follow_up_date = date(20);
    repo.update_lead(
        lead.id,
        &update,
        &[
            draft(asha.id, ActivityAction::StatusChanged).change("NEW", "CONTACTED"),
            draft(asha.id, ActivityAction::FollowUpChanged),
        ],
    )
    .unwrap();

    repo.create_note(
        &NewNote::new(lead.id, NoteContent::new("Asked for brochure").unwrap()),
        &[draft(asha.id, ActivityAction::NoteAdded)],
    )
    .unwrap();

    let mut actions: Vec<ActivityAction> = repo
        .list_activity_logs(lead.id)
        .unwrap()
        .into_iter()
        .map(|log| log.action)
        .collect();
    actions.sort_by_key(|action| action.as_str());
    assert_eq!(
        actions,
        [
            ActivityAction::FollowUpChanged,
            ActivityAction::LeadCreated,
            ActivityAction::NoteAdded,
            ActivityAction::StatusChanged,
        ]
    );
}

#[test]
fn test_failed_audit_rolls_back_the_write() {
    let test_db = TestDb::new("test_audit_rollback.db");
    let repo = test_db.repo();
    let asha = add_user(&repo, "asha@example.com", "Asha", "AGENT");
    let lead = add_lead(&repo, "Ravi Kumar", date(16), asha.id);
    let work = repo
        .create_work(
            &NewWork::new(lead.id, WorkTitle::new("Call back").unwrap(), None, date(15), asha.id),
            &[],
        )
        .unwrap();
    let at = date(16).and_hms_opt(11, 30, 0).unwrap().and_utc();

    // no such user, so the audit insert violates its foreign key
    let ghost = UserId::new(999).unwrap();
    let failed = repo.complete_work(work.id, at, &[draft(ghost, ActivityAction::WorkCompleted)]);
    assert!(failed.is_err());

    let stored = repo.get_work_by_id(work.id).unwrap().unwrap();
    assert_eq!(stored.status, WorkStatus::Pending);
    assert!(repo.list_activity_logs(lead.id).unwrap().is_empty());

    let mut update = UpdateLead::from_lead(&lead);
    update.status = LeadStatus::Lost;
    assert!(
        repo.update_lead(lead.id, &update, &[draft(ghost, ActivityAction::StatusChanged)])
            .is_err()
    );
    assert_eq!(
        repo.get_lead_by_id(lead.id).unwrap().unwrap().status,
        LeadStatus::New
    );

    // a retry completes the work and logs it exactly once
    let audit = [draft(asha.id, ActivityAction::WorkCompleted)];
    assert!(repo.complete_work(work.id, at, &audit).unwrap().is_some());
    assert!(repo.complete_work(work.id, at, &audit).unwrap().is_none());
    let logs = repo.list_activity_logs(lead.id).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, ActivityAction::WorkCompleted);
}
