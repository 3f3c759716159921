use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;
use quickcourt_core::session::{SessionError, SessionStore, SessionUser};

/// Default file name for the persisted user
pub const SESSION_FILE_NAME: &str = "quickcourt_user.json";

/// Keeps the signed-in user as a JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under `dir` with the default file name
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionUser>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(e.to_string())),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SessionError::Corrupt(e.to_string()))
    }

    fn save(&self, user: &SessionUser) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| SessionError::Storage(e.to_string()))?;
        info!("Session saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcourt_core::session::{Role, SessionContext};
    use std::sync::Arc;

    #[test]
    fn test_file_round_trip_and_logout() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSessionStore::in_dir(dir.path().join("state")));
        assert!(store.load().unwrap().is_none());

        let mut session = SessionContext::restore(store.clone()).unwrap();
        let user = SessionUser::verified("owner@example.com", Role::Facility);
        session.sign_in(user.clone()).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), Some(user));

        session.sign_out().unwrap();
        assert!(!store.path().exists());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(SessionError::Corrupt(_))));
    }
}
