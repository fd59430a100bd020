use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    models::SessionUser,
};

/// Local mirror of the signed-in user, kept as a small JSON file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn save(&self, user: &SessionUser) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(user)
            .map_err(|e| AppError::Session(format!("Session serialization error: {}", e)))?;
        tokio::fs::write(&self.path, json).await?;

        tracing::debug!(path = %self.path.display(), uid = %user.uid, "Session saved");
        Ok(())
    }

    /// Returns the mirrored user, or `None` when nobody is signed in
    pub async fn load(&self) -> AppResult<Option<SessionUser>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let user = serde_json::from_str(&json)
            .map_err(|e| AppError::Session(format!("Session deserialization error: {}", e)))?;
        Ok(Some(user))
    }

    pub async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
