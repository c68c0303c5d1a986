//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate only talks to `service`.

/// Ensure the data and upload directories exist; warn when pages are missing.
pub async fn ensure_env(frontend_dir: &str, data_file: &str, upload_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(frontend_dir, data_file, upload_dir).await
}
