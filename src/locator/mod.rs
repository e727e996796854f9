//! Geometry analyzers and the locator service that fronts them.

mod line;
mod point;
mod polygon;
mod service;

pub use line::LineAnalyzer;
pub use point::PointLocator;
pub use polygon::PolygonAnalyzer;
pub use service::Locator;
