//! Session / login state machine.
//!
//! ```text
//!              login(email, password) ok
//!  ANONYMOUS ─────────────────────────────▶ AUTHENTICATED(user)
//!      ▲                                           │
//!      └──────────────── logout ───────────────────┘
//! ```
//!
//! A failed login leaves the state unchanged and reports a generic
//! [`AuthError::InvalidCredentials`] without saying which field was wrong.

use serde::{Deserialize, Serialize};

use crate::models::User;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Current authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "PersistedSession", into = "PersistedSession")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(User),
}

/// On-disk shape: `{ "user": User | null, "is_authenticated": bool }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    is_authenticated: bool,
}

impl From<PersistedSession> for Session {
    fn from(p: PersistedSession) -> Self {
        match (p.is_authenticated, p.user) {
            (true, Some(user)) => Session::Authenticated(user),
            _ => Session::Anonymous,
        }
    }
}

impl From<Session> for PersistedSession {
    fn from(s: Session) -> Self {
        match s {
            Session::Anonymous => PersistedSession {
                user: None,
                is_authenticated: false,
            },
            Session::Authenticated(user) => PersistedSession {
                user: Some(user),
                is_authenticated: true,
            },
        }
    }
}

impl Session {
    pub fn actor(&self) -> Option<&User> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

/// Attempts `ANONYMOUS -> AUTHENTICATED`. Email and password are compared
/// exactly; the first matching user becomes the actor.
pub fn login(users: &[User], email: &str, password: &str) -> Result<Session, AuthError> {
    users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .map(|u| Session::Authenticated(u.clone()))
        .ok_or(AuthError::InvalidCredentials)
}

/// `AUTHENTICATED -> ANONYMOUS`. Always succeeds.
pub fn logout() -> Session {
    Session::Anonymous
}
