//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::{params, Connection};
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, NewAccount};
use crate::ports::AccountRepository;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const ACCOUNT_COLUMNS: &str =
    "id, number, email, password_hash, first_name, last_name, balance, created_at";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
}

/// DuckDB repository implementation
///
/// A single connection guarded by a mutex. Every statement runs on the blocking
/// thread pool so async callers never hold the runtime while DuckDB works.
pub struct DuckDbRepository {
    conn: Arc<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which occur when another process still holds the database open.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(Some(db_path)) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Arc::new(Mutex::new(conn)),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            "database busy, retrying: {}",
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::storage(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Self::try_open_connection(None)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: Option<&Path>) -> Result<Connection> {
        // Extension autoloading is never needed here and touches ~/.duckdb
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = match db_path {
            Some(path) => Connection::open_with_flags(path, config)?,
            None => Connection::open_in_memory_with_flags(config)?,
        };
        Ok(conn)
    }

    /// Path of the backing file, if any
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run pending migrations, returning what was applied
    pub async fn run_migrations(&self) -> Result<MigrationResult> {
        self.run(|conn| MigrationService::new(conn).run_pending()).await
    }

    /// Names of migrations not yet applied
    pub async fn pending_migrations(&self) -> Result<Vec<String>> {
        self.run(|conn| MigrationService::new(conn).get_pending()).await
    }

    /// Run `f` against the connection on the blocking pool
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::storage("database connection lock poisoned"))?;
            f(&mut guard)
        })
        .await?
    }

    fn query_one(conn: &Connection, filter: &str, value: impl duckdb::ToSql) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {filter} = ?");
        match conn.query_row(&sql, params![value], row_to_account) {
            Ok(account) => Ok(Some(account)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Work out why a guarded debit touched no rows
    fn rejected_debit(conn: &Connection, id: i64, amount: i64) -> Error {
        let balance = conn.query_row(
            "SELECT balance FROM accounts WHERE id = ?",
            params![id],
            |row| row.get::<_, i64>(0),
        );

        match balance {
            Ok(available) => Error::InsufficientFunds {
                available,
                requested: amount,
            },
            Err(duckdb::Error::QueryReturnedNoRows) => {
                Error::not_found(format!("Account {} not found", id))
            }
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl AccountRepository for DuckDbRepository {
    async fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations().await?;
        if !result.applied.is_empty() {
            debug!(applied = ?result.applied, "applied migrations");
        }
        Ok(())
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let account = account.clone();
        self.run(move |conn| {
            let inserted = conn.query_row(
                "INSERT INTO accounts (number, email, password_hash, first_name, last_name, balance, created_at)
                 VALUES (?, ?, ?, ?, ?, 0, ?)
                 RETURNING id",
                params![
                    account.number,
                    account.email,
                    account.password_hash,
                    account.first_name,
                    account.last_name,
                    account.created_at.to_rfc3339(),
                ],
                |row| row.get::<_, i64>(0),
            );

            match inserted {
                Ok(id) => Ok(account.into_account(id)),
                Err(e) => Err(classify_insert_error(e, &account)),
            }
        })
        .await
    }

    async fn get_accounts(&self) -> Result<Vec<Account>> {
        self.run(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"))?;
            let accounts = stmt
                .query_map([], row_to_account)?
                .collect::<duckdb::Result<Vec<_>>>()?;
            Ok(accounts)
        })
        .await
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        self.run(move |conn| Self::query_one(conn, "id", id)).await
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = email.to_string();
        self.run(move |conn| Self::query_one(conn, "email", email)).await
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>> {
        self.run(move |conn| Self::query_one(conn, "number", number)).await
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        self.run(move |conn| {
            let removed = conn.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
            Ok(removed > 0)
        })
        .await
    }

    async fn adjust_balance(&self, id: i64, delta: i64) -> Result<()> {
        self.run(move |conn| {
            let updated = conn.execute(
                "UPDATE accounts SET balance = balance + ? WHERE id = ? AND balance + ? >= 0",
                params![delta, id, delta],
            )?;
            if updated == 0 {
                return Err(Self::rejected_debit(conn, id, -delta));
            }
            Ok(())
        })
        .await
    }

    async fn move_funds(&self, from_id: i64, to_id: i64, amount: i64) -> Result<()> {
        self.run(move |conn| {
            // Dropping `tx` without commit rolls back both legs
            let tx = conn.transaction()?;

            let debited = tx.execute(
                "UPDATE accounts SET balance = balance - ? WHERE id = ? AND balance >= ?",
                params![amount, from_id, amount],
            )?;
            if debited == 0 {
                return Err(Self::rejected_debit(&tx, from_id, amount));
            }

            let credited = tx.execute(
                "UPDATE accounts SET balance = balance + ? WHERE id = ?",
                params![amount, to_id],
            )?;
            if credited == 0 {
                return Err(Error::not_found(format!("Account {} not found", to_id)));
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }
}

fn row_to_account(row: &duckdb::Row) -> duckdb::Result<Account> {
    let created_str: String = row.get(7)?;
    Ok(Account {
        id: row.get(0)?,
        number: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        balance: row.get(6)?,
        created_at: parse_timestamp(&created_str),
    })
}

/// Map unique-constraint violations on insert to domain errors
fn classify_insert_error(err: duckdb::Error, account: &NewAccount) -> Error {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    // DuckDB reports the offending key as `Duplicate key "<column>: <value>"`
    if lower.contains("duplicate key") || lower.contains("unique constraint") {
        if lower.contains("\"number:") {
            return Error::DuplicateAccountNumber(account.number);
        }
        if lower.contains("\"email:") {
            return Error::conflict(format!("Email {} is already registered", account.email));
        }
    }
    Error::Storage(msg)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
