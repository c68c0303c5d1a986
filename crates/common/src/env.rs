//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Ensure the data file's parent and the upload directory exist; warn when
/// the HTML pages are missing.
pub async fn ensure_env(frontend_dir: &str, data_file: &str, upload_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend directory not found; index and admin pages will 404");
    }
    if let Some(parent) = Path::new(data_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_data_and_upload_dirs() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("ensure_env_{}", uuid::Uuid::new_v4()));
        let data_file = root.join("data").join("locations.json");
        let uploads = root.join("uploads");

        ensure_env(
            root.join("missing-frontend").to_str().unwrap(),
            data_file.to_str().unwrap(),
            uploads.to_str().unwrap(),
        )
        .await?;

        assert!(root.join("data").is_dir());
        assert!(uploads.is_dir());
        // the data file itself is left to the store
        assert!(!data_file.exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
