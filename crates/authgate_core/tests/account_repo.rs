use authgate_core::db::{open_db, open_db_in_memory};
use authgate_core::{
    Account, AccountRepository, LockoutState, RepoError, SqliteAccountRepository,
    MAX_FAILED_ATTEMPTS,
};
use std::sync::{Arc, Barrier};
use std::thread;
use uuid::Uuid;

#[test]
fn create_and_find_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);

    let account = Account::new("alice", "hunter22")
        .with_email("alice@example.com")
        .with_national_id("200012345678");
    let id = repo.create_account(&account).unwrap();
    assert_eq!(id, account.id);

    let loaded = repo.find_by_username("alice").unwrap().unwrap();
    assert_eq!(loaded, account);
    assert!(repo.exists_by_username("alice").unwrap());
    assert!(!repo.exists_by_username("bob").unwrap());
    assert!(repo.find_by_username("bob").unwrap().is_none());
}

#[test]
fn duplicate_username_and_email_are_reported_by_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);

    repo.create_account(&Account::new("alice", "hunter22").with_email("a@example.com"))
        .unwrap();

    let err = repo
        .create_account(&Account::new("alice", "other-pass"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate { field: "username", ref value } if value == "alice"));

    let err = repo
        .create_account(&Account::new("bob", "other-pass").with_email("a@example.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate { field: "email", .. }));
}

#[test]
fn create_rejects_invalid_account_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);

    let err = repo.create_account(&Account::new("", "hunter22")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(!repo.exists_by_username("").unwrap());
}

#[test]
fn failed_attempts_count_up_and_lock_at_threshold() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);
    let id = repo.create_account(&Account::new("alice", "hunter22")).unwrap();

    assert_eq!(
        repo.record_failed_attempt(id).unwrap(),
        LockoutState::Active { failed_attempts: 1 }
    );
    assert_eq!(
        repo.record_failed_attempt(id).unwrap(),
        LockoutState::Active { failed_attempts: 2 }
    );
    assert_eq!(
        repo.record_failed_attempt(id).unwrap(),
        LockoutState::Locked
    );

    // Further failures leave the locked row untouched.
    assert_eq!(
        repo.record_failed_attempt(id).unwrap(),
        LockoutState::Locked
    );
    let loaded = repo.find_by_username("alice").unwrap().unwrap();
    assert_eq!(loaded.failed_login_attempts, MAX_FAILED_ATTEMPTS);
    assert!(loaded.account_locked);
}

#[test]
fn reset_clears_counter_but_never_unlocks() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);
    let id = repo.create_account(&Account::new("alice", "hunter22")).unwrap();

    repo.record_failed_attempt(id).unwrap();
    repo.record_failed_attempt(id).unwrap();
    assert_eq!(repo.reset_failed_attempts(id).unwrap(), LockoutState::default());
    assert_eq!(
        repo.find_by_username("alice").unwrap().unwrap().failed_login_attempts,
        0
    );

    for _ in 0..MAX_FAILED_ATTEMPTS {
        repo.record_failed_attempt(id).unwrap();
    }
    assert_eq!(repo.reset_failed_attempts(id).unwrap(), LockoutState::Locked);
    assert!(repo.find_by_username("alice").unwrap().unwrap().account_locked);
}

#[test]
fn counter_updates_on_missing_account_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);
    let missing = Uuid::new_v4();

    let err = repo.record_failed_attempt(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));

    let err = repo.reset_failed_attempts(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn list_locked_accounts_returns_only_locked_rows_sorted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);

    let zed = repo.create_account(&Account::new("zed", "hunter22")).unwrap();
    let amy = repo.create_account(&Account::new("amy", "hunter22")).unwrap();
    repo.create_account(&Account::new("active", "hunter22")).unwrap();

    for id in [zed, amy] {
        for _ in 0..MAX_FAILED_ATTEMPTS {
            repo.record_failed_attempt(id).unwrap();
        }
    }

    let locked: Vec<String> = repo
        .list_locked_accounts()
        .unwrap()
        .into_iter()
        .map(|account| account.username)
        .collect();
    assert_eq!(locked, vec!["amy".to_string(), "zed".to_string()]);
}

#[test]
fn corrupt_lockout_columns_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);
    repo.create_account(&Account::new("alice", "hunter22")).unwrap();

    conn.execute(
        "UPDATE accounts SET account_locked = 1, failed_login_attempts = 0;",
        [],
    )
    .unwrap();

    let err = repo.find_by_username("alice").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn failures_past_threshold_keep_row_loadable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);
    let id = repo.create_account(&Account::new("alice", "hunter22")).unwrap();

    for _ in 0..MAX_FAILED_ATTEMPTS + 3 {
        repo.record_failed_attempt(id).unwrap();
    }

    let loaded = repo.find_by_username("alice").unwrap().unwrap();
    assert_eq!(loaded.lockout_state(), LockoutState::Locked);
    assert_eq!(loaded.failed_login_attempts, MAX_FAILED_ATTEMPTS);
    loaded.validate().unwrap();
    assert_eq!(repo.list_locked_accounts().unwrap().len(), 1);
}

#[test]
fn corrupt_lockout_columns_block_counter_updates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAccountRepository::new(&conn);
    let id = repo.create_account(&Account::new("alice", "hunter22")).unwrap();

    conn.execute(
        "UPDATE accounts SET account_locked = 0, failed_login_attempts = 7;",
        [],
    )
    .unwrap();

    let err = repo.record_failed_attempt(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    let err = repo.reset_failed_attempts(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let (failed, locked): (i64, i64) = conn
        .query_row(
            "SELECT failed_login_attempts, account_locked FROM accounts;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!((failed, locked), (7, 0));
}

#[test]
fn concurrent_failures_on_separate_connections_are_all_counted() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("authgate.sqlite3");

    let conn = open_db(&db_path).unwrap();
    let id = SqliteAccountRepository::new(&conn)
        .create_account(&Account::new("alice", "hunter22"))
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let db_path = db_path.clone();
            thread::spawn(move || {
                let conn = open_db(&db_path).unwrap();
                barrier.wait();
                SqliteAccountRepository::new(&conn)
                    .record_failed_attempt(id)
                    .unwrap()
            })
        })
        .collect();

    let mut outcomes: Vec<u32> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap().failed_attempts())
        .collect();
    outcomes.sort_unstable();
    assert_eq!(outcomes, vec![1, 2]);

    let loaded = SqliteAccountRepository::new(&conn)
        .find_by_username("alice")
        .unwrap()
        .unwrap();
    assert_eq!(loaded.lockout_state(), LockoutState::Active { failed_attempts: 2 });
}
