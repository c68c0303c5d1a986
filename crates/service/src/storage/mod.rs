//! Storage abstractions for service layer
//!
//! Contains the file-backed map store shared by services that persist
//! their whole state as a single JSON document.

pub mod json_map_store;
