//! Analysis results returned to callers.
//!
//! All metrics are rounded to two decimals before they leave the locator.

use serde::{Deserialize, Serialize};

use super::{Coordinate, DepartmentRecord, MunicipalityRecord};

/// Round a metric to two decimals for presentation
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Department code reported for a municipality.
///
/// The resolved department record wins over the municipality's own column so
/// the code, id and name in one row always describe the same department.
pub fn department_code(municipality: &MunicipalityRecord, department: Option<&DepartmentRecord>) -> String {
    department
        .map(|d| d.code.clone())
        .unwrap_or_else(|| municipality.department_code.clone())
}

/// How a point was attributed to a municipality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The municipality boundary contains the point
    Contained,
    /// No boundary contains the point; nearest centroid was used
    Nearest,
    /// Nothing could be attributed
    NotFound,
}

/// Location of a single point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLocation {
    pub municipality_id: i64,
    pub municipality_code: String,
    pub municipality_name: String,
    pub department_id: i64,
    pub department_code: String,
    pub department_name: String,
    pub centroid_distance_km: f64,
    pub match_kind: MatchKind,
}

impl PointLocation {
    pub fn new(
        municipality: &MunicipalityRecord,
        department: Option<&DepartmentRecord>,
        centroid_distance_km: f64,
        match_kind: MatchKind,
    ) -> Self {
        Self {
            municipality_id: municipality.id,
            municipality_code: municipality.code.clone(),
            municipality_name: municipality.name.clone(),
            department_id: department.map(|d| d.id).unwrap_or(0),
            department_code: department_code(municipality, department),
            department_name: department.map(|d| d.name.clone()).unwrap_or_default(),
            centroid_distance_km: round2(centroid_distance_km),
            match_kind,
        }
    }

    /// Sentinel returned when no municipality can be attributed
    pub fn not_found() -> Self {
        Self {
            municipality_id: 0,
            municipality_code: String::new(),
            municipality_name: String::new(),
            department_id: 0,
            department_code: String::new(),
            department_name: String::new(),
            centroid_distance_km: 0.0,
            match_kind: MatchKind::NotFound,
        }
    }

    /// Whether the location came from the nearest-centroid fallback
    pub fn is_approximate(&self) -> bool {
        self.match_kind == MatchKind::Nearest
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointAnalysis {
    pub coordinates: Coordinate,
    pub location: PointLocation,
}

/// Municipality crossed by a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityOnRoute {
    pub id: i64,
    pub municipality_code: String,
    pub municipality_name: String,
    pub department_code: String,
    pub department_name: String,
    /// 1-based position in boundary dataset order (not traversal order)
    pub order: usize,
}

/// Department crossed by a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentOnRoute {
    pub id: i64,
    pub department_code: String,
    pub department_name: String,
    /// 1-based position in boundary dataset order (not traversal order)
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSummary {
    pub total_departments: usize,
    pub total_municipalities: usize,
    pub length_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAnalysis {
    pub coordinates: Vec<Coordinate>,
    pub length_km: f64,
    pub summary: LineSummary,
    pub departments: Vec<DepartmentOnRoute>,
    pub municipalities: Vec<MunicipalityOnRoute>,
}

/// Municipality intersected by a polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityOverlap {
    pub id: i64,
    pub municipality_code: String,
    pub municipality_name: String,
    pub department_code: String,
    pub department_name: String,
    /// Share of the municipality's own area covered, in percent
    pub overlap_pct: f64,
    pub area_km2: f64,
}

/// Department intersected by a polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentOverlap {
    pub id: i64,
    pub department_code: String,
    pub department_name: String,
    /// Share of the department's own area covered, in percent
    pub overlap_pct: f64,
    pub area_km2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSummary {
    pub total_departments: usize,
    pub total_municipalities: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonAnalysis {
    /// Rings exactly as submitted; only the first one is analyzed
    pub coordinates: Vec<Vec<Coordinate>>,
    pub area_km2: f64,
    pub summary: PolygonSummary,
    pub departments: Vec<DepartmentOverlap>,
    pub municipalities: Vec<MunicipalityOverlap>,
}

/// Analysis result tagged by geometry kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisResult {
    #[serde(rename = "marker")]
    Point(PointAnalysis),
    #[serde(rename = "line")]
    Line(LineAnalysis),
    #[serde(rename = "polygon")]
    Polygon(PolygonAnalysis),
}

/// Success/failure envelope handed to transports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
