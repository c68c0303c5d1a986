//! Per-user location history.
//!
//! Each user id maps to the ordered list of [`domain::LocationRecord`]s it has
//! reported. The whole map is mirrored to one JSON file by [`store::LocationStore`].

pub mod domain;
pub mod store;

pub use domain::{Coordinate, LocationInput, LocationRecord, ValidationRules};
pub use store::LocationStore;
