use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::db::Store;

#[derive(Debug, Error)]
pub enum PictureError {
    #[error("User not found")]
    UserNotFound,

    #[error("No profile picture")]
    NoPicture,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PictureError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Stores profile pictures as flat files named `<user-id>-<uuid>.jpg`.
pub struct ProfilePictureStore {
    store: Store,
    root: PathBuf,
}

impl ProfilePictureStore {
    #[must_use]
    pub fn new(store: Store, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// Writes the upload and records its filename on the user.
    pub async fn save(&self, user_id: Uuid, bytes: &[u8]) -> Result<String, PictureError> {
        if bytes.is_empty() {
            return Err(PictureError::Validation("Uploaded picture is empty".to_string()));
        }
        if self.store.get_user(user_id).await?.is_none() {
            return Err(PictureError::UserNotFound);
        }

        if !self.root.exists() {
            fs::create_dir_all(&self.root).await?;
        }

        let filename = format!("{user_id}-{}.jpg", Uuid::new_v4());
        let path = self.root.join(&filename);
        fs::write(&path, bytes).await?;

        self.store.set_user_profile_picture(user_id, &filename).await?;
        info!(user_id = %user_id, path = %path.display(), "Saved profile picture");

        Ok(filename)
    }

    /// Reads back the picture recorded for a user.
    pub async fn load(&self, user_id: Uuid) -> Result<(String, Vec<u8>), PictureError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(PictureError::UserNotFound)?;
        let filename = user.profile_picture.ok_or(PictureError::NoPicture)?;

        // Filenames are generated here, but never let a stored value escape the root.
        if Path::new(&filename).file_name().and_then(|n| n.to_str()) != Some(filename.as_str()) {
            return Err(PictureError::NoPicture);
        }

        match fs::read(self.root.join(&filename)).await {
            Ok(bytes) => Ok((filename, bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PictureError::NoPicture),
            Err(e) => Err(e.into()),
        }
    }
}
