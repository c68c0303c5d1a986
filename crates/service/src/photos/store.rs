use std::{io::ErrorKind, path::{Path, PathBuf}, sync::Arc};

use chrono::Local;
use tokio::{fs, io::AsyncWriteExt};
use tracing::info;

use crate::errors::ServiceError;

use super::filename::{allowed_file, extension, secure_filename};

/// Public URL prefix the upload directory is served under.
pub const URL_PREFIX: &str = "/uploads";

/// `YYYYMMDD_HHMMSS`, prepended to every stored filename.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const NO_PHOTO_FILE: &str = "No photo file";
pub const NO_SELECTED_FILE: &str = "No selected file";
pub const FILE_TYPE_NOT_ALLOWED: &str = "File type not allowed";

const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct StoredPhoto {
    pub file_name: String,
    pub url: String,
}

/// Writes validated uploads into one directory.
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub async fn new<P: Into<PathBuf>>(dir: P) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Persistence(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Arc::new(Self { dir }))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check the client filename, then store `bytes` as
    /// `<YYYYMMDD_HHMMSS>_<sanitized name>`. An existing file is never
    /// overwritten; a `_<n>` suffix is added before the extension instead.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredPhoto, ServiceError> {
        if original_name.is_empty() {
            return Err(ServiceError::upload(NO_SELECTED_FILE));
        }
        if !allowed_file(original_name) {
            return Err(ServiceError::upload(FILE_TYPE_NOT_ALLOWED));
        }

        let mut safe = secure_filename(original_name);
        if !allowed_file(&safe) {
            // sanitizing ate the extension (e.g. a fully non-ASCII name)
            let ext = extension(original_name).unwrap_or_default();
            safe = format!("photo.{ext}");
        }
        let base = format!("{}_{}", Local::now().format(STAMP_FORMAT), safe);

        let (mut file, file_name) = self.create_unique(&base).await?;
        file.write_all(bytes)
            .await
            .map_err(|e| ServiceError::Persistence(format!("cannot write {file_name}: {e}")))?;
        file.flush()
            .await
            .map_err(|e| ServiceError::Persistence(format!("cannot write {file_name}: {e}")))?;

        info!(file = %file_name, size = bytes.len(), "photo stored");
        Ok(StoredPhoto {
            url: format!("{URL_PREFIX}/{file_name}"),
            file_name,
        })
    }

    async fn create_unique(&self, base: &str) -> Result<(fs::File, String), ServiceError> {
        let (stem, ext) = base.rsplit_once('.').unwrap_or((base, ""));
        for n in 0..MAX_NAME_ATTEMPTS {
            let name = match n {
                0 => base.to_string(),
                n => format!("{stem}_{n}.{ext}"),
            };
            let res = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&name))
                .await;
            match res {
                Ok(file) => return Ok((file, name)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ServiceError::Persistence(format!("cannot create {name}: {e}"))),
            }
        }
        Err(ServiceError::Persistence(format!("no free file name for {base}")))
    }
}
