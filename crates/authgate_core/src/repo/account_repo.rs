//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the account lookups and mutations the auth service needs.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Account::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Lockout columns only change through `LockoutState` transitions applied
//!   inside an immediate transaction, so concurrent attempts against one
//!   account cannot lose an increment or undo a lock.

use crate::db::DbError;
use crate::model::account::{Account, AccountId, AccountValidationError};
use crate::model::lockout::LockoutState;
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ACCOUNT_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    password,
    nic_number,
    failed_login_attempts,
    account_locked,
    created_at
FROM accounts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for account persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(AccountValidationError),
    Db(DbError),
    NotFound(AccountId),
    /// A unique column already holds `value`.
    Duplicate { field: &'static str, value: String },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "account not found: {id}"),
            Self::Duplicate { field, .. } => write!(f, "account {field} already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted account data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Duplicate { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<AccountValidationError> for RepoError {
    fn from(value: AccountValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for account storage.
pub trait AccountRepository {
    fn create_account(&self, account: &Account) -> RepoResult<AccountId>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Account>>;
    fn exists_by_username(&self, username: &str) -> RepoResult<bool>;
    /// Applies `LockoutState::after_failure` and returns the resulting state.
    ///
    /// A locked account is returned as `Locked` without changes.
    fn record_failed_attempt(&self, id: AccountId) -> RepoResult<LockoutState>;
    /// Applies `LockoutState::after_success` and returns the resulting state.
    ///
    /// Returns `Locked` without changes when the account was locked in the
    /// meantime.
    fn reset_failed_attempts(&self, id: AccountId) -> RepoResult<LockoutState>;
    fn list_locked_accounts(&self) -> RepoResult<Vec<Account>>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Reads, transitions and writes the lockout columns under one
    /// `BEGIN IMMEDIATE` transaction, so concurrent writers serialize on the
    /// database lock and no transition is computed from a stale row.
    fn apply_transition(
        &self,
        id: AccountId,
        transition: fn(LockoutState) -> LockoutState,
    ) -> RepoResult<LockoutState> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let columns = tx
            .query_row(
                "SELECT failed_login_attempts, account_locked FROM accounts WHERE id = ?1;",
                [id.to_string()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        let Some((failed_attempts, locked)) = columns else {
            return Err(RepoError::NotFound(id));
        };
        let current = parse_lockout_columns(failed_attempts, locked)?;

        let next = transition(current);
        if next != current {
            tx.execute(
                "UPDATE accounts
                 SET
                    failed_login_attempts = ?1,
                    account_locked = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3;",
                params![next.failed_attempts(), next.is_locked(), id.to_string()],
            )?;
        }
        tx.commit()?;

        Ok(next)
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, account: &Account) -> RepoResult<AccountId> {
        account.validate()?;

        self.conn
            .execute(
                "INSERT INTO accounts (
                    id,
                    username,
                    email,
                    password,
                    nic_number,
                    failed_login_attempts,
                    account_locked,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    account.id.to_string(),
                    account.username.as_str(),
                    account.email.as_deref(),
                    account.password.as_str(),
                    account.national_id.as_deref(),
                    account.failed_login_attempts,
                    account.account_locked,
                    account.created_at,
                ],
            )
            .map_err(|err| map_unique_violation(err, account))?;

        Ok(account.id)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE username = ?1;"))?;

        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }

        Ok(None)
    }

    fn exists_by_username(&self, username: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE username = ?1);",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn record_failed_attempt(&self, id: AccountId) -> RepoResult<LockoutState> {
        self.apply_transition(id, LockoutState::after_failure)
    }

    fn reset_failed_attempts(&self, id: AccountId) -> RepoResult<LockoutState> {
        self.apply_transition(id, LockoutState::after_success)
    }

    fn list_locked_accounts(&self) -> RepoResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACCOUNT_SELECT_SQL}
             WHERE account_locked = 1
             ORDER BY username ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            accounts.push(parse_account_row(row)?);
        }

        Ok(accounts)
    }
}

fn map_unique_violation(err: rusqlite::Error, account: &Account) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            if message.contains("accounts.username") {
                return RepoError::Duplicate {
                    field: "username",
                    value: account.username.clone(),
                };
            }
            if message.contains("accounts.email") {
                return RepoError::Duplicate {
                    field: "email",
                    value: account.email.clone().unwrap_or_default(),
                };
            }
        }
    }
    RepoError::from(err)
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in accounts.id"))
    })?;

    let failed_login_attempts = parse_counter(row.get("failed_login_attempts")?)?;
    let account_locked = parse_locked_flag(row.get("account_locked")?)?;

    let account = Account {
        id,
        username: row.get("username")?,
        email: row.get("email")?,
        password: row.get("password")?,
        national_id: row.get("nic_number")?,
        failed_login_attempts,
        account_locked,
        created_at: row.get("created_at")?,
    };
    account.validate()?;
    Ok(account)
}

fn parse_counter(value: i64) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid counter `{value}` in accounts.failed_login_attempts"
        ))
    })
}

fn parse_locked_flag(value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid account_locked value `{other}` in accounts.account_locked"
        ))),
    }
}

fn parse_lockout_columns(failed_attempts: i64, locked: i64) -> RepoResult<LockoutState> {
    let failed_attempts = parse_counter(failed_attempts)?;
    let locked = parse_locked_flag(locked)?;
    LockoutState::from_persisted(failed_attempts, locked).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "inconsistent lockout columns (failed_login_attempts={failed_attempts}, account_locked={locked})"
        ))
    })
}
