//! Mojon - administrative boundary locator
//!
//! Resolves points, lines and polygons to the departments and municipalities
//! they fall in or cross, with length, area and overlap metrics.

pub mod boundary;
pub mod catalog;
pub mod config;
pub mod error;
pub mod locator;
pub mod models;
pub mod projection;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, MemoryCatalog};
pub use error::LocatorError;
pub use locator::Locator;
pub use models::{AdminLevel, AnalysisResult, ApiResponse, GeometryInput};
