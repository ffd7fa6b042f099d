use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use voxdemo_core::{VoxdemoError, VoxdemoResult};

const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Credentials {
    #[serde(default)]
    provider_api_key: Option<String>,
}

/// Stored provider API key for the legacy direct-call path.
///
/// Plaintext TOML on disk with an explicit load / save / clear lifecycle —
/// insecure by design and meant for local demos only. The recommended path
/// keeps the key on the proxy side and never stores it here.
pub struct ApiKeyStore {
    path: PathBuf,
}

impl ApiKeyStore {
    /// Creates a store rooted at `dir` (the file itself is
    /// `credentials.toml`).
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CREDENTIALS_FILE),
        }
    }

    /// Where the credentials file lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored key, if any. A missing file is `None`, not an error.
    pub async fn load(&self) -> VoxdemoResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(&self.path).await?;
        let creds: Credentials = toml::from_str(&data)
            .map_err(|e| VoxdemoError::Config(format!("Failed to parse credentials: {e}")))?;
        Ok(creds.provider_api_key.filter(|key| !key.is_empty()))
    }

    /// Writes `key`, replacing any previous value.
    pub async fn save(&self, key: &str) -> VoxdemoResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let creds = Credentials {
            provider_api_key: Some(key.to_string()),
        };
        let data = toml::to_string_pretty(&creds)
            .map_err(|e| VoxdemoError::Config(e.to_string()))?;
        tokio::fs::write(&self.path, data).await?;
        info!(path = %self.path.display(), "provider API key saved");
        Ok(())
    }

    /// Removes the stored key. Clearing an empty store is a no-op.
    pub async fn clear(&self) -> VoxdemoResult<()> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
            info!(path = %self.path.display(), "provider API key cleared");
        }
        Ok(())
    }
}
