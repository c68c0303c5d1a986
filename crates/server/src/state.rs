use std::sync::Arc;

use service::{locations::LocationStore, photos::PhotoStore};

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<LocationStore>,
    pub photos: Arc<PhotoStore>,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(locations: Arc<LocationStore>, photos: Arc<PhotoStore>, admin_token: Option<String>) -> Self {
        Self { locations, photos, admin_token: admin_token.map(Arc::from) }
    }
}
