use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Facility,
    Admin,
}

impl Role {
    /// Display name given to a freshly verified account
    pub fn default_display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Admin User",
            Role::Facility => "Facility Owner",
            Role::Player => "Player",
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" | "user" => Ok(Role::Player),
            "facility" | "owner" => Ok(Role::Facility),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::ValidationError(format!("Unknown role: {}", other))),
        }
    }
}

/// Signed-in user, as persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl SessionUser {
    /// User record created once the server has verified the email OTP
    pub fn verified(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: role.default_display_name().to_string(),
            role,
        }
    }
}

/// Contact details the booking form starts with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPrefill {
    pub name: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage failed: {0}")]
    Storage(String),
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Where the session survives between runs
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionUser>, SessionError>;
    fn save(&self, user: &SessionUser) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-wide session state. Built once at startup and handed to
/// whatever needs the current user; nothing reads it ambiently.
pub struct SessionContext {
    user: Option<SessionUser>,
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    /// Restore a previously saved session, if any
    pub fn restore(store: Arc<dyn SessionStore>) -> Result<Self, SessionError> {
        let user = store.load()?;
        if let Some(u) = &user {
            info!("Restored session for {:?} user {}", u.role, u.id);
        }
        Ok(Self { user, store })
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn sign_in(&mut self, user: SessionUser) -> Result<(), SessionError> {
        self.store.save(&user)?;
        info!("Signed in {:?} user {}", user.role, user.id);
        self.user = Some(user);
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.user = None;
        Ok(())
    }

    /// Contact fields to prefill the booking form with
    pub fn contact_prefill(&self) -> ContactPrefill {
        self.user
            .as_ref()
            .map(|u| ContactPrefill { name: u.name.clone(), email: u.email.clone() })
            .unwrap_or_default()
    }
}

/// Volatile store, used when no session file is configured
#[derive(Default)]
pub struct MemorySessionStore {
    user: std::sync::Mutex<Option<SessionUser>>,
}

impl MemorySessionStore {
    pub fn with_user(user: SessionUser) -> Self {
        Self { user: std::sync::Mutex::new(Some(user)) }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionUser>, SessionError> {
        self.user
            .lock()
            .map(|u| u.clone())
            .map_err(|e| SessionError::Storage(e.to_string()))
    }

    fn save(&self, user: &SessionUser) -> Result<(), SessionError> {
        let mut slot = self.user.lock().map_err(|e| SessionError::Storage(e.to_string()))?;
        *slot = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self.user.lock().map_err(|e| SessionError::Storage(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}
