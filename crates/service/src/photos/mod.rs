//! Photo uploads: filename checks and the on-disk upload directory.

pub mod filename;
pub mod store;

pub use store::{PhotoStore, StoredPhoto, URL_PREFIX};
