use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use tracing::info;

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

use super::domain::{LocationInput, LocationRecord, ValidationRules};

pub const USER_NOT_FOUND: &str = "User not found";

/// All users' location histories, mirrored to a JSON file on every change.
pub struct LocationStore {
    store: Arc<JsonMapStore<String, Vec<LocationRecord>>>,
    rules: ValidationRules,
}

impl LocationStore {
    /// Load the store from `path`; an absent file starts empty.
    pub async fn open<P: Into<PathBuf>>(path: P, rules: ValidationRules) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::new(path).await?;
        let users = store.len().await;
        info!(path = %store.file_path().display(), users, "location store opened");
        Ok(Arc::new(Self { store, rules }))
    }

    /// Validate, stamp and append a record to its user's history, then persist.
    pub async fn record(&self, input: LocationInput) -> Result<LocationRecord, ServiceError> {
        let (user_id, record) = input.validate(self.rules)?.into_record();
        let appended = record.clone();
        let count = self
            .store
            .update_map(move |map| {
                let history = map.entry(user_id).or_default();
                history.push(record);
                Ok(history.len())
            })
            .await?;
        tracing::debug!(records = count, "location appended");
        Ok(appended)
    }

    /// Every user's history, ordered by user id.
    pub async fn all(&self) -> BTreeMap<String, Vec<LocationRecord>> {
        self.store.snapshot().await.into_iter().collect()
    }

    /// One user's history in insertion order.
    pub async fn history(&self, user_id: &str) -> Result<Vec<LocationRecord>, ServiceError> {
        self.store
            .get(&user_id.to_string())
            .await
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.into()))
    }

    /// Remove every user and persist the empty map; returns how many users were dropped.
    pub async fn delete_all(&self) -> Result<usize, ServiceError> {
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tmp_file() -> PathBuf {
        std::env::temp_dir().join(format!("locations_{}.json", uuid::Uuid::new_v4()))
    }

    fn body(v: serde_json::Value) -> LocationInput {
        LocationInput::from_body(v)
    }

    #[tokio::test]
    async fn records_in_order_and_reloads() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = LocationStore::open(&path, ValidationRules::default()).await?;

        for i in 1..=3 {
            store.record(body(json!({"user_id": "u1", "latitude": i, "longitude": 69.2}))).await?;
        }
        store.record(body(json!({"user_id": "u2", "latitude": "1.5", "longitude": "2.5"}))).await?;

        let h = store.history("u1").await?;
        assert_eq!(h.len(), 3);
        let lats: Vec<_> = h.iter().map(|r| serde_json::to_value(&r.latitude).unwrap()).collect();
        assert_eq!(lats, vec![json!(1), json!(2), json!(3)]);

        let before = store.all().await;
        let reopened = LocationStore::open(&path, ValidationRules::default()).await?;
        assert_eq!(reopened.all().await, before);
        assert_eq!(reopened.all().await.len(), 2);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_leaves_store_untouched() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = LocationStore::open(&path, ValidationRules::default()).await?;
        store.record(body(json!({"user_id": "u1", "latitude": 1, "longitude": 2}))).await?;

        let res = store.record(body(json!({"user_id": "u1", "latitude": 0, "longitude": 2}))).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert_eq!(store.history("u1").await?.len(), 1);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_and_delete_all() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = LocationStore::open(&path, ValidationRules::default()).await?;
        assert!(matches!(store.history("ghost").await, Err(ServiceError::NotFound(_))));

        store.record(body(json!({"user_id": "a", "latitude": 1, "longitude": 2}))).await?;
        store.record(body(json!({"user_id": "b", "latitude": 1, "longitude": 2}))).await?;
        assert_eq!(store.delete_all().await?, 2);
        assert!(store.all().await.is_empty());
        assert!(store.history("a").await.is_err());

        let on_disk: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&path).await?)?;
        assert_eq!(on_disk, json!({}));

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = LocationStore::open(&path, ValidationRules::default()).await?;

        let mut tasks = Vec::new();
        for i in 0..40 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let user = if i % 2 == 0 { "even" } else { "odd" };
                store.record(body(json!({"user_id": user, "latitude": i + 1, "longitude": 1}))).await
            }));
        }
        for t in tasks {
            t.await??;
        }

        assert_eq!(store.history("even").await?.len(), 20);
        assert_eq!(store.history("odd").await?.len(), 20);
        let reopened = LocationStore::open(&path, ValidationRules::default()).await?;
        assert_eq!(reopened.history("even").await?.len(), 20);
        assert_eq!(reopened.history("odd").await?.len(), 20);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
