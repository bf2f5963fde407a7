//! Site accounts and login sessions.
//!
//! Layout:
//!   .grow/users.yaml      registered users
//!   .grow/sessions.yaml   live bearer tokens

use crate::error::{GrowError, Result};
use crate::forms::Validator;
use crate::{io, paths};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

const MIN_PASSWORD: usize = 8;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Coach,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Member => "member",
            Role::Coach => "coach",
            Role::Admin => "admin",
        })
    }
}

impl std::str::FromStr for Role {
    type Err = GrowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "coach" => Ok(Role::Coach),
            "admin" => Ok(Role::Admin),
            _ => Err(GrowError::field("role", format!("unknown role '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    salt: String,
    password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

/// Public view of a user, safe to return from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            name: u.name.clone(),
            role: u.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

fn random_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn load_users(root: &Path) -> Result<Vec<User>> {
    io::read_yaml_or_default(&paths::users_path(root))
}

fn save_users(root: &Path, users: &[User]) -> Result<()> {
    io::write_yaml(&paths::users_path(root), users)
}

fn load_sessions(root: &Path) -> Result<Vec<Session>> {
    io::read_yaml_or_default(&paths::sessions_path(root))
}

fn save_sessions(root: &Path, sessions: &[Session]) -> Result<()> {
    io::write_yaml(&paths::sessions_path(root), sessions)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn register(root: &Path, email: &str, name: &str, password: &str, role: Role) -> Result<User> {
    Validator::default()
        .email("email", email)
        .required("name", name, 120)
        .check(
            password.chars().count() >= MIN_PASSWORD,
            "password",
            "must be at least 8 characters",
        )
        .finish()?;

    let email = normalize_email(email);
    let mut users = load_users(root)?;
    if users.iter().any(|u| u.email == email) {
        return Err(GrowError::UserExists(email));
    }
    let salt = random_token(16);
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        name: name.trim().to_string(),
        role,
        password_hash: hash_password(&salt, password),
        salt,
        created_at: Utc::now(),
    };
    users.push(user.clone());
    save_users(root, &users)?;
    tracing::info!(user = %user.email, role = %user.role, "user registered");
    Ok(user)
}

pub fn list_users(root: &Path) -> Result<Vec<User>> {
    load_users(root)
}

pub fn get_user(root: &Path, id: &str) -> Result<User> {
    load_users(root)?
        .into_iter()
        .find(|u| u.id == id)
        .ok_or_else(|| GrowError::UserNotFound(id.to_string()))
}

/// Check credentials and issue a session token valid for `ttl_hours`.
/// Expired sessions are pruned on the way.
pub fn login(root: &Path, email: &str, password: &str, ttl_hours: u32) -> Result<(User, Session)> {
    let email = normalize_email(email);
    let user = load_users(root)?
        .into_iter()
        .find(|u| u.email == email)
        .filter(|u| u.verify(password))
        .ok_or(GrowError::InvalidCredentials)?;

    let now = Utc::now();
    let session = Session {
        token: random_token(32),
        user_id: user.id.clone(),
        expires_at: now + Duration::hours(i64::from(ttl_hours)),
    };
    let mut sessions = load_sessions(root)?;
    sessions.retain(|s| s.expires_at > now);
    sessions.push(session.clone());
    save_sessions(root, &sessions)?;
    Ok((user, session))
}

/// Drop a session token. Returns `false` if it was unknown.
pub fn logout(root: &Path, token: &str) -> Result<bool> {
    let mut sessions = load_sessions(root)?;
    let before = sessions.len();
    sessions.retain(|s| s.token != token);
    if sessions.len() == before {
        return Ok(false);
    }
    save_sessions(root, &sessions)?;
    Ok(true)
}

/// Resolve a bearer token to its user.
pub fn authenticate(root: &Path, token: &str) -> Result<User> {
    let now = Utc::now();
    let session = load_sessions(root)?
        .into_iter()
        .find(|s| s.token == token && s.expires_at > now)
        .ok_or(GrowError::Unauthorized)?;
    match get_user(root, &session.user_id) {
        Ok(u) => Ok(u),
        Err(GrowError::UserNotFound(_)) => Err(GrowError::Unauthorized),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> tempfile::TempDir {
        tempfile::TempDir::new().unwrap()
    }

    #[test]
    fn register_and_login() {
        let d = dir();
        let user = register(d.path(), "Ana@Example.com", "Ana", "correct-horse", Role::Member)
            .unwrap();
        assert_eq!(user.email, "ana@example.com");

        let (u, session) = login(d.path(), "ana@example.com", "correct-horse", 24).unwrap();
        assert_eq!(u.id, user.id);
        assert_eq!(authenticate(d.path(), &session.token).unwrap().id, user.id);
    }

    #[test]
    fn wrong_password_rejected() {
        let d = dir();
        register(d.path(), "ana@example.com", "Ana", "correct-horse", Role::Member).unwrap();
        assert!(matches!(
            login(d.path(), "ana@example.com", "wrong-horse", 24),
            Err(GrowError::InvalidCredentials)
        ));
        assert!(matches!(
            login(d.path(), "nobody@example.com", "correct-horse", 24),
            Err(GrowError::InvalidCredentials)
        ));
    }

    #[test]
    fn duplicate_email_rejected() {
        let d = dir();
        register(d.path(), "ana@example.com", "Ana", "correct-horse", Role::Member).unwrap();
        assert!(matches!(
            register(d.path(), "ANA@example.com", "Ana", "another-pass", Role::Member),
            Err(GrowError::UserExists(_))
        ));
    }

    #[test]
    fn short_password_rejected() {
        let d = dir();
        assert!(matches!(
            register(d.path(), "ana@example.com", "Ana", "short", Role::Member),
            Err(GrowError::Validation(_))
        ));
    }

    #[test]
    fn password_not_stored_in_clear() {
        let d = dir();
        register(d.path(), "ana@example.com", "Ana", "correct-horse", Role::Member).unwrap();
        let raw = std::fs::read_to_string(paths::users_path(d.path())).unwrap();
        assert!(!raw.contains("correct-horse"));
    }

    #[test]
    fn logout_invalidates_token() {
        let d = dir();
        register(d.path(), "ana@example.com", "Ana", "correct-horse", Role::Member).unwrap();
        let (_, session) = login(d.path(), "ana@example.com", "correct-horse", 24).unwrap();
        assert!(logout(d.path(), &session.token).unwrap());
        assert!(!logout(d.path(), &session.token).unwrap());
        assert!(matches!(
            authenticate(d.path(), &session.token),
            Err(GrowError::Unauthorized)
        ));
    }

    #[test]
    fn expired_session_is_unauthorized() {
        let d = dir();
        register(d.path(), "ana@example.com", "Ana", "correct-horse", Role::Member).unwrap();
        let (_, session) = login(d.path(), "ana@example.com", "correct-horse", 0).unwrap();
        assert!(matches!(
            authenticate(d.path(), &session.token),
            Err(GrowError::Unauthorized)
        ));
    }

    #[test]
    fn role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }
}
