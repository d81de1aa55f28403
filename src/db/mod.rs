mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::auth::CredentialStore;
use crate::models::Ledger;

/// Key-value blob store on SQLite. Each value is a whole serialized
/// document; writes replace it outright.
pub(crate) struct Store {
    conn: Connection,
}

impl Store {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut store = Self { conn };
        store.migrate().context("Database migration failed")?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Raw blobs ─────────────────────────────────────────────

    pub(crate) fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    pub(crate) fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub(crate) fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Credentials ───────────────────────────────────────────

    pub(crate) fn load_credentials(&self) -> Result<CredentialStore> {
        match self.get(schema::CREDENTIALS_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Credential store is corrupt"),
            None => Ok(CredentialStore::default()),
        }
    }

    pub(crate) fn save_credentials(&self, credentials: &CredentialStore) -> Result<()> {
        let json = serde_json::to_string(credentials)?;
        self.put(schema::CREDENTIALS_KEY, &json)
    }

    // ── Ledgers ───────────────────────────────────────────────

    /// Load a user's ledger. A missing or unreadable blob yields an empty
    /// ledger so a damaged save never blocks login.
    pub(crate) fn load_ledger(&self, username: &str) -> Result<Ledger> {
        let Some(json) = self.get(&schema::ledger_key(username))? else {
            return Ok(Ledger::default());
        };
        match serde_json::from_str(&json) {
            Ok(ledger) => Ok(ledger),
            Err(error) => {
                tracing::warn!(username, %error, "stored ledger is corrupt, starting empty");
                Ok(Ledger::default())
            }
        }
    }

    pub(crate) fn save_ledger(&self, username: &str, ledger: &Ledger) -> Result<()> {
        let json = serde_json::to_string(ledger)?;
        self.put(&schema::ledger_key(username), &json)
            .with_context(|| format!("Failed to save ledger for {username}"))?;
        tracing::debug!(username, bytes = json.len(), "ledger saved");
        Ok(())
    }

    // ── Session marker ────────────────────────────────────────

    pub(crate) fn current_user(&self) -> Result<Option<String>> {
        self.get(schema::SESSION_KEY)
    }

    pub(crate) fn set_current_user(&self, username: &str) -> Result<()> {
        self.put(schema::SESSION_KEY, username)
    }

    pub(crate) fn clear_current_user(&self) -> Result<()> {
        self.remove(schema::SESSION_KEY)
    }
}
