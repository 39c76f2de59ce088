//! Username/password accounts with opaque bearer sessions.
//!
//! Passwords are stored as Argon2id PHC strings. Session tokens are random
//! alphanumeric strings handed to the client once; only their SHA-256 hex
//! digest is persisted.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use bookmarko_core::{defaults, Error, Result, User, UserRepository};

/// A freshly issued session, returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    session_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, session_ttl: chrono::Duration) -> Self {
        Self { users, session_ttl }
    }

    /// Create an account and log it in.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthSession> {
        let username = validate_credentials(username, password)?;
        let password_hash = hash_password(password)?;
        let user = self.users.create(username, &password_hash).await?;

        info!(
            subsystem = "auth",
            op = "register",
            user_id = %user.id,
            "User registered"
        );
        self.issue_session(user).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        let invalid = || Error::Unauthorized("Invalid username or password".to_string());

        let credentials = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(invalid)?;
        if !verify_password(password, &credentials.password_hash) {
            return Err(invalid());
        }
        self.issue_session(credentials.user).await
    }

    /// Resolve a bearer token to its user. Unknown and expired tokens are
    /// both rejected.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let unauthorized = || Error::Unauthorized("Invalid or expired token".to_string());

        let session = self
            .users
            .find_session(&hash_token(token))
            .await?
            .ok_or_else(unauthorized)?;
        if session.is_expired(Utc::now()) {
            return Err(unauthorized());
        }
        self.users.get(session.user_id).await?.ok_or_else(unauthorized)
    }

    /// Revoke the session behind `token`. Returns whether it existed.
    pub async fn logout(&self, token: &str) -> Result<bool> {
        self.users.revoke_session(&hash_token(token)).await
    }

    /// Drop expired sessions from storage.
    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.users.purge_expired_sessions().await
    }

    async fn issue_session(&self, user: User) -> Result<AuthSession> {
        let token = generate_token(defaults::SESSION_TOKEN_LENGTH);
        let expires_at = Utc::now() + self.session_ttl;
        self.users
            .create_session(user.id, &hash_token(&token), expires_at)
            .await?;
        Ok(AuthSession { user, token })
    }
}

fn validate_credentials<'a>(username: &'a str, password: &str) -> Result<&'a str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }
    if username.chars().count() > defaults::USERNAME_MAX_LEN {
        return Err(Error::InvalidInput(format!(
            "Username must be at most {} characters",
            defaults::USERNAME_MAX_LEN
        )));
    }
    Ok(username)
}

/// Generate a random alphanumeric token.
pub fn generate_token(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// SHA-256 hex digest under which a token is stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
