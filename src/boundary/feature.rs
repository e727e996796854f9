//! Boundary feature extraction from GeoJSON.

use geo::{BoundingRect, MultiPolygon};
use geojson::{Feature, GeoJson};
use tracing::{info, warn};

use crate::models::AdminLevel;

/// Property names that carry administrative codes on each feature
#[derive(Debug, Clone)]
pub struct CodeProperties {
    /// Department code, present on both collections
    pub department: String,
    /// Municipality local code, appended to the department code
    pub municipality: String,
}

impl Default for CodeProperties {
    fn default() -> Self {
        Self {
            department: "DPTO".to_string(),
            municipality: "MPIO".to_string(),
        }
    }
}

/// A single admin boundary polygon with its codes
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub level: AdminLevel,
    /// Department code for departments, full municipality code otherwise
    pub code: String,
    pub department_code: String,
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryFeature {
    pub fn department(code: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        let code = code.into();
        Self {
            level: AdminLevel::Department,
            department_code: code.clone(),
            code,
            geometry,
        }
    }

    pub fn municipality(
        department_code: impl Into<String>,
        local_code: &str,
        geometry: MultiPolygon<f64>,
    ) -> Self {
        let department_code = department_code.into();
        Self {
            level: AdminLevel::Municipality,
            code: format!("{}{}", department_code, local_code),
            department_code,
            geometry,
        }
    }

    /// Get the bounding box of this boundary
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Parse a GeoJSON FeatureCollection into boundary features of one level.
///
/// Features without codes or without an areal geometry are skipped.
pub fn parse_boundaries(
    text: &str,
    level: AdminLevel,
    props: &CodeProperties,
) -> anyhow::Result<Vec<BoundaryFeature>> {
    let geojson: GeoJson = text.parse()?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => anyhow::bail!("expected a FeatureCollection, found a bare geometry"),
    };

    let total = features.len();
    let mut boundaries = Vec::with_capacity(total);

    for (idx, feature) in features.iter().enumerate() {
        match feature_to_boundary(feature, level, props) {
            Some(boundary) => boundaries.push(boundary),
            None => warn!("Skipping {} feature #{}: missing code or areal geometry", level, idx),
        }
    }

    info!("Parsed {}/{} {} boundaries", boundaries.len(), total, level);

    Ok(boundaries)
}

fn feature_to_boundary(
    feature: &Feature,
    level: AdminLevel,
    props: &CodeProperties,
) -> Option<BoundaryFeature> {
    let department_code = code_property(feature, &props.department)?;
    let geometry = to_multipolygon(feature)?;

    match level {
        AdminLevel::Department => Some(BoundaryFeature::department(department_code, geometry)),
        AdminLevel::Municipality => {
            let local_code = code_property(feature, &props.municipality)?;
            Some(BoundaryFeature::municipality(department_code, &local_code, geometry))
        }
    }
}

/// Read a code property that may be a JSON string or integer
fn code_property(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_multipolygon(feature: &Feature) -> Option<MultiPolygon<f64>> {
    let geometry = feature.geometry.clone()?;
    let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}
