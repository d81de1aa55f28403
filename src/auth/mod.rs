use std::collections::BTreeMap;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const MIN_PASSWORD_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username is empty")]
    EmptyUsername,
    #[error("user '{0}' already exists")]
    UserExists(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("wrong current password")]
    WrongCurrentPassword,
    #[error("new password too short (minimum {MIN_PASSWORD_LEN} characters)")]
    PasswordTooShort,
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Username to argon2 PHC string. Passwords never touch disk in clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialStore {
    users: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Create a user. Existing users keep their password; changing it
    /// goes through [`CredentialStore::change_password`].
    pub fn register(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if self.users.contains_key(username) {
            return Err(AuthError::UserExists(username.to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        let hash = hash_password(password)?;
        self.users.insert(username.to_string(), hash);
        Ok(())
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username.trim())
            .is_some_and(|stored| verify_password(password, stored))
    }

    pub fn change_password(
        &mut self,
        username: &str,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        if !self.verify(username, current) {
            return Err(AuthError::WrongCurrentPassword);
        }
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        let hash = hash_password(new)?;
        self.users.insert(username.trim().to_string(), hash);
        Ok(())
    }

    #[cfg(test)]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username.trim())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(AuthError::Hash)
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}
