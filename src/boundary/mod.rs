//! Administrative boundary dataset.
//!
//! Loads department and municipality polygons from GeoJSON once and keeps
//! them indexed by code and by envelope for the analyzers.

mod feature;
mod index;
mod store;

pub use feature::{parse_boundaries, BoundaryFeature, CodeProperties};
pub use index::BoundaryCollection;
pub use store::BoundaryStore;
