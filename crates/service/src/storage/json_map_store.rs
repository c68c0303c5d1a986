use std::{collections::HashMap, hash::Hash, io::ErrorKind, path::{Path, PathBuf}, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// The whole `HashMap<K, V>` lives in memory and is written back to one JSON
/// file after every mutation. Mutations hold the write lock until the file has
/// been replaced, so saves never interleave and a failed save leaves the
/// in-memory map untouched.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. A missing file yields an empty map;
    /// an unreadable or malformed file is an error.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Persistence(format!("cannot create {}: {e}", parent.display())))?;
        }
        let map = Self::load(&file_path).await?;
        debug!(path = %file_path.display(), entries = map.len(), "json map store loaded");
        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    /// Read and parse the backing file.
    pub async fn load(path: &Path) -> Result<HashMap<K, V>, ServiceError> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Persistence(format!("{} is not a valid data file: {e}", path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ServiceError::Persistence(format!("cannot read {}: {e}", path.display()))),
        }
    }

    /// Serialize `map` and replace the backing file via a temp file + rename.
    async fn save(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(map).map_err(ServiceError::persistence)?;
        let tmp = tmp_path(&self.file_path);
        fs::write(&tmp, data)
            .await
            .map_err(|e| ServiceError::Persistence(format!("cannot write {}: {e}", tmp.display())))?;
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Persistence(format!(
                "cannot replace {}: {e}",
                self.file_path.display()
            )));
        }
        Ok(())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Clone of the whole map, taken under one read lock.
    pub async fn snapshot(&self) -> HashMap<K, V> {
        self.inner.read().await.clone()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drop every entry and persist; returns how many were removed.
    pub async fn clear(&self) -> Result<usize, ServiceError> {
        self.update_map(|m| {
            let n = m.len();
            m.clear();
            Ok(n)
        })
        .await
    }

    /// Apply a mutation to a copy of the map, persist it, then publish it.
    /// If `f` or the save fails the stored map is unchanged.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<R, ServiceError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = f(&mut next)?;
        self.save(&next).await?;
        *map = next;
        Ok(out)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("json_map_store_{tag}_{}.json", uuid::Uuid::new_v4()))
    }

    async fn put<V>(store: &JsonMapStore<String, V>, key: &str, value: V) -> Result<(), ServiceError>
    where
        V: serde::Serialize + serde::de::DeserializeOwned + Clone,
    {
        store
            .update_map(|m| {
                m.insert(key.to_string(), value);
                Ok(())
            })
            .await
    }

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("crud");
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty, and nothing written yet
        assert_eq!(store.len().await, 0);
        assert!(!tmp.exists());

        put(&store, "a", "1".to_string()).await?;
        put(&store, "b", "2".to_string()).await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));
        assert_eq!(store.snapshot().await.len(), 2);

        store
            .update_map(|m| {
                if let Some(v) = m.get_mut("a") { *v = "10".into(); }
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("10"));

        // remove and reload persistence
        let removed = store.update_map(|m| Ok(m.remove("b").is_some())).await?;
        assert!(removed);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.len().await, 1);
        assert_eq!(reloaded.get(&"a".into()).await.as_deref(), Some("10"));
        assert!(!tmp_path(&tmp).exists());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("corrupt");
        tokio::fs::write(&tmp, b"{not json").await?;

        let res = JsonMapStore::<String, String>::new(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Persistence(_))));
        // the corrupt file is left for inspection
        assert_eq!(tokio::fs::read(&tmp).await?, b"{not json");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_state() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("json_map_store_dir_{}", uuid::Uuid::new_v4()));
        let path = dir.join("map.json");
        let store = JsonMapStore::<String, u32>::new(&path).await?;
        put(&store, "kept", 1).await?;

        // pull the directory out from under the store so the next save fails
        tokio::fs::remove_dir_all(&dir).await?;
        let res = put(&store, "lost", 2).await;
        assert!(matches!(res, Err(ServiceError::Persistence(_))));
        assert_eq!(store.get(&"lost".into()).await, None);
        assert_eq!(store.get(&"kept".into()).await, Some(1));

        let cleared = store.clear().await;
        assert!(cleared.is_err());
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn uncreatable_parent_dir_is_an_error() -> Result<(), anyhow::Error> {
        // a regular file where the parent directory should be
        let blocker = tmp_file("blocker");
        tokio::fs::write(&blocker, b"").await?;

        let res = JsonMapStore::<String, u32>::new(blocker.join("map.json")).await;
        match res {
            Err(ServiceError::Persistence(msg)) => assert!(msg.starts_with("cannot create"), "{msg}"),
            Err(other) => panic!("expected persistence error, got {other:?}"),
            Ok(_) => panic!("store opened under a regular file"),
        }

        let _ = tokio::fs::remove_file(&blocker).await;
        Ok(())
    }

    #[tokio::test]
    async fn closure_error_aborts_mutation() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("abort");
        let store = JsonMapStore::<String, u32>::new(&tmp).await?;
        put(&store, "x", 1).await?;

        let res: Result<(), _> = store
            .update_map(|m| {
                m.insert("y".into(), 2);
                Err(ServiceError::validation("nope"))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.get(&"y".into()).await, None);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
