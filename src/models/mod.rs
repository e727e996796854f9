//! Core data models for the locator.

pub mod admin;
pub mod analysis;
pub mod geometry;

pub use admin::{department_prefix, AdminLevel, DepartmentRecord, MunicipalityRecord};
pub use analysis::{
    AnalysisResult, ApiResponse, DepartmentOnRoute, DepartmentOverlap, LineAnalysis, LineSummary,
    MatchKind, MunicipalityOnRoute, MunicipalityOverlap, PointAnalysis, PointLocation,
    PolygonAnalysis, PolygonSummary,
};
pub use geometry::{Bounds, Coordinate, GeometryInput, GeometryKind};
