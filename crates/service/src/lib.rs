//! Service layer for the location tracker.
//! - `locations`: per-user location history persisted as one JSON file.
//! - `photos`: validated photo uploads written to a local directory.
//! - `storage`: the generic JSON file-backed map both build on.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod locations;
pub mod photos;
