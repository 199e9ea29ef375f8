//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::{Path, PathBuf};

use tracing::info;

/// Subdirectory of the media root holding uploaded user documents.
pub const DOCUMENTS_DIR: &str = "documents";

/// Ensure the media root and its documents directory exist.
pub async fn ensure_env(media_root: &str) -> anyhow::Result<PathBuf> {
    let documents = Path::new(media_root).join(DOCUMENTS_DIR);
    tokio::fs::create_dir_all(&documents)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", documents.display()))?;
    info!(media_root = %media_root, "media directories ready");
    Ok(documents)
}
