//! SQLite-based account store

use kiosk_util::UserId;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{Account, AccountField, AccountStore, StoreError, StoreResult};

/// SQLite-based account store
pub struct SqliteAccountStore {
    conn: Mutex<Connection>,
}

impl SqliteAccountStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                user_id TEXT PRIMARY KEY,
                money INTEGER NOT NULL DEFAULT 0 CHECK (money >= 0),
                remaining_time INTEGER NOT NULL DEFAULT 0 CHECK (remaining_time >= 0),
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl AccountStore for SqliteAccountStore {
    fn get(&self, user_id: &UserId) -> StoreResult<Account> {
        let conn = self.conn()?;

        let row: Option<(i64, i64)> = conn
            .query_row(
                "SELECT money, remaining_time FROM accounts WHERE user_id = ?",
                [user_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (money, remaining_time) =
            row.ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;

        // The CHECK constraints keep both columns non-negative.
        Ok(Account {
            user_id: user_id.clone(),
            money: money.max(0) as u64,
            remaining_time: remaining_time.max(0) as u64,
        })
    }

    fn update(&self, user_id: &UserId, field: AccountField, value: i64) -> StoreResult<()> {
        if value < 0 {
            warn!(user_id = %user_id, field = %field, value, "Rejecting negative balance");
            return Err(StoreError::InvalidValue { field, value });
        }

        let conn = self.conn()?;
        let sql = format!(
            "UPDATE accounts SET {} = ?, updated_at = ? WHERE user_id = ?",
            field.column()
        );
        let changed = conn.execute(
            &sql,
            params![value, kiosk_util::now().to_rfc3339(), user_id.as_str()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(user_id.to_string()));
        }

        debug!(user_id = %user_id, field = %field, value, "Account updated");
        Ok(())
    }

    fn create_account(&self, user_id: &UserId) -> StoreResult<Account> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            r#"
            INSERT INTO accounts (user_id, money, remaining_time, updated_at)
            VALUES (?, 0, 0, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
            params![user_id.as_str(), kiosk_util::now().to_rfc3339()],
        )?;

        if inserted == 0 {
            return Err(StoreError::AlreadyExists(user_id.to_string()));
        }

        debug!(user_id = %user_id, "Account created");
        Ok(Account {
            user_id: user_id.clone(),
            money: 0,
            remaining_time: 0,
        })
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
