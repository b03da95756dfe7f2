//! Credential store: registration and login verification.
//!
//! Passwords are hashed with Argon2 and stored as PHC strings. Login checks
//! fail closed: an unknown user, a malformed stored hash, or any
//! verification fault all read as "not authenticated" and are logged with
//! the attempted username. The raw password is never logged.

use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::validate;
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use rusqlite::{OptionalExtension, params};
use tracing::{error, info, instrument, warn};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registers a new user with a freshly salted password hash.
///
/// # Errors
///
/// * `Error::Validation` for a blank username/password or a password
///   shorter than [`MIN_PASSWORD_LEN`].
/// * `Error::AlreadyExists` when the username is taken.
/// * `Error::Storage` when the hash cannot be produced or the store is
///   unavailable.
#[instrument(skip(pool, password))]
pub async fn register_user(pool: &DbPool, username: &str, password: &str) -> Result<()> {
    let username = validate::require_field("username", username)?;
    if password.is_empty() {
        return Err(Error::Validation("password is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Storage(format!("Failed to hash password: {e}")))?
        .to_string();

    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    match conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
        params![username, password_hash],
    ) {
        Ok(_) => {
            info!("Registered user '{}'", username);
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            warn!("Registration rejected: username '{}' already exists", username);
            Err(Error::AlreadyExists(username))
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks a username/password pair against the stored hash.
///
/// Never raises for a failed check: every failure path logs the username
/// and the reason, then reads as `false`.
#[instrument(skip(pool, password))]
pub async fn authenticate_user(pool: &DbPool, username: &str, password: &str) -> bool {
    match verify_credentials(pool, username, password) {
        Ok(authenticated) => authenticated,
        Err(e) => {
            error!("Login check failed for '{}': {}", username, e);
            false
        }
    }
}

fn verify_credentials(pool: &DbPool, username: &str, password: &str) -> Result<bool> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached("SELECT password_hash FROM users WHERE username = ?1")?;
    let stored: Option<String> = stmt
        .query_row(params![username], |row| row.get(0))
        .optional()?;

    let Some(stored) = stored else {
        warn!("Login failed for '{}': no such user", username);
        return Ok(false);
    };

    let parsed = match PasswordHash::new(&stored) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Login failed for '{}': stored hash is malformed: {}", username, e);
            return Ok(false);
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => {
            info!("User '{}' authenticated", username);
            Ok(true)
        }
        Err(argon2::password_hash::Error::Password) => {
            warn!("Login failed for '{}': password mismatch", username);
            Ok(false)
        }
        Err(e) => {
            error!("Login failed for '{}': verification error: {}", username, e);
            Ok(false)
        }
    }
}
