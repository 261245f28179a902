use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use core_types::{SessionUser, UserId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    schema_version: u32,
    user: Option<SessionUser>,
}

/// Current-user signal for the rest of the app.
///
/// The session persists as plain JSON under the given root so a restart
/// stays signed in. Everything else about authentication (credentials,
/// tokens, providers) lives with the external auth collaborator.
#[derive(Debug)]
pub struct AuthSession {
    root: PathBuf,
    current: Mutex<Option<SessionUser>>,
}

impl AuthSession {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: Mutex::new(None),
        }
    }

    /// Opens the session store and restores a persisted sign-in, if any.
    pub fn restore(root: impl Into<PathBuf>) -> Result<Self> {
        let session = Self::new(root);
        let path = session.session_path();
        if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file: SessionFile =
                serde_json::from_str(&text).context("failed to parse session json")?;
            *session.current.lock() = file.user;
        }
        Ok(session)
    }

    pub fn sign_in(&self, id: UserId, username: impl Into<String>) -> Result<SessionUser> {
        let user = SessionUser::new(id, username);
        *self.current.lock() = Some(user.clone());
        self.persist(Some(&user))?;
        info!(user_id = %user.id, "user signed in");
        Ok(user)
    }

    pub fn sign_out(&self) -> Result<()> {
        *self.current.lock() = None;
        self.persist(None)?;
        info!("user signed out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.current.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.lock().is_some()
    }

    fn persist(&self, user: Option<&SessionUser>) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let file = SessionFile {
            schema_version: SCHEMA_VERSION,
            user: user.cloned(),
        };
        let text = serde_json::to_string_pretty(&file)?;
        fs::write(self.session_path(), text)
            .with_context(|| format!("failed to write {}", self.session_path().display()))?;
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.root.join("session.json")
    }
}
