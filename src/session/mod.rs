use anyhow::Result;

use crate::auth::AuthError;
use crate::db::Store;
use crate::ledger::{self, InputError, ProjectionResult};
use crate::models::{Ledger, MonthKey};

/// A logged-in user and their ledger. Exists from login until logout;
/// every ledger change goes through [`Session::apply`], which persists it.
///
/// Rejections come back as [`InputError`] or [`AuthError`] inside the
/// `anyhow::Error`, so callers can show them and let the user retry.
pub(crate) struct Session {
    username: String,
    ledger: Ledger,
}

/// Create an account, or replace the password of an existing one.
pub(crate) fn register(store: &Store, username: &str, password: &str) -> Result<()> {
    let mut credentials = store.load_credentials()?;
    credentials.register(username, password)?;
    store.save_credentials(&credentials)?;
    tracing::info!(username = username.trim(), "account registered");
    Ok(())
}

impl Session {
    /// Check credentials, mark the user as logged in and load their ledger.
    pub(crate) fn login(store: &Store, username: &str, password: &str) -> Result<Self> {
        let credentials = store.load_credentials()?;
        if !credentials.verify(username, password) {
            tracing::info!(username, "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
        let username = username.trim();
        store.set_current_user(username)?;
        tracing::info!(username, "logged in");
        Self::open(store, username)
    }

    /// Reopen the session recorded by the last login, if any.
    pub(crate) fn resume(store: &Store) -> Result<Option<Self>> {
        match store.current_user()? {
            Some(username) => Ok(Some(Self::open(store, &username)?)),
            None => Ok(None),
        }
    }

    fn open(store: &Store, username: &str) -> Result<Self> {
        Ok(Self {
            username: username.to_string(),
            ledger: store.load_ledger(username)?,
        })
    }

    pub(crate) fn logout(self, store: &Store) -> Result<()> {
        store.clear_current_user()?;
        tracing::info!(username = %self.username, "logged out");
        Ok(())
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn project(&self, month: &MonthKey) -> ProjectionResult {
        ledger::project(&self.ledger, month)
    }

    /// Run a pure ledger mutation. On success the new ledger replaces the
    /// old one and is saved; on rejection nothing changes.
    pub(crate) fn apply<F>(&mut self, store: &Store, mutation: F) -> Result<()>
    where
        F: FnOnce(&Ledger) -> std::result::Result<Ledger, InputError>,
    {
        let next = mutation(&self.ledger).inspect_err(|e| {
            tracing::debug!(error = %e, "mutation rejected");
        })?;
        store.save_ledger(&self.username, &next)?;
        self.ledger = next;
        Ok(())
    }

    pub(crate) fn change_password(&self, store: &Store, current: &str, new: &str) -> Result<()> {
        let mut credentials = store.load_credentials()?;
        credentials.change_password(&self.username, current, new)?;
        store.save_credentials(&credentials)?;
        tracing::info!(username = %self.username, "password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
