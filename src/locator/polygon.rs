//! Polygon analysis: intersected regions with overlap share and area.

use geo::{Area, BooleanOps, Geometry, Intersects, MultiPolygon};
use hashbrown::HashSet;
use tracing::{debug, warn};

use crate::boundary::{BoundaryFeature, BoundaryStore};
use crate::catalog::{Catalog, CatalogResolver};
use crate::error::{LocatorError, Result};
use crate::models::geometry::to_polygon;
use crate::models::analysis::{department_code, round2};
use crate::models::{
    Coordinate, DepartmentOverlap, GeometryKind, MunicipalityOverlap, PolygonAnalysis, PolygonSummary,
};
use crate::projection::MetricProjector;

/// Relative slack allowed between an intersection and the input polygon area
const AREA_TOLERANCE: f64 = 1e-6;

/// Intersection of the input with one boundary feature
struct Overlap {
    /// Percent of the feature's own area covered
    pct: f64,
    area_km2: f64,
}

/// Finds the municipalities and departments a polygon intersects
pub struct PolygonAnalyzer<'a> {
    store: &'a BoundaryStore,
    projector: &'a MetricProjector,
}

impl<'a> PolygonAnalyzer<'a> {
    pub fn new(store: &'a BoundaryStore, projector: &'a MetricProjector) -> Self {
        Self { store, projector }
    }

    /// Analyze the first of `rings`; the rest are echoed back untouched.
    pub fn analyze(&self, rings: &[Vec<Coordinate>], catalog: &dyn Catalog) -> Result<PolygonAnalysis> {
        let resolver = CatalogResolver::new(catalog);
        let ring = rings.first().map(Vec::as_slice).unwrap_or(&[]);
        let shape = Shape::new(ring);

        let area_km2 = self.projector.area_km2(&shape.geometry);
        if !area_km2.is_finite() {
            return Err(LocatorError::processing(
                GeometryKind::Polygon,
                "polygon area is not a finite number",
            ));
        }

        let mut municipalities = self.municipalities(&shape, &resolver)?;
        let mut departments = self.departments(&shape, &resolver)?;

        // Stable sort: equal shares keep dataset order
        municipalities.sort_by(|a, b| b.overlap_pct.total_cmp(&a.overlap_pct));
        departments.sort_by(|a, b| b.overlap_pct.total_cmp(&a.overlap_pct));

        debug!(
            "Polygon of {} vertices ({:.2} km²) intersects {} municipalities, {} departments",
            ring.len(),
            area_km2,
            municipalities.len(),
            departments.len()
        );

        Ok(PolygonAnalysis {
            coordinates: rings.to_vec(),
            area_km2: round2(area_km2),
            summary: PolygonSummary {
                total_departments: departments.len(),
                total_municipalities: municipalities.len(),
            },
            departments,
            municipalities,
        })
    }

    fn municipalities(
        &self,
        shape: &Shape,
        resolver: &CatalogResolver<'_>,
    ) -> Result<Vec<MunicipalityOverlap>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for feature in self.store.municipalities().candidates(&shape.query()) {
            if !shape.geometry.intersects(&feature.geometry) || !seen.insert(feature.code.as_str()) {
                continue;
            }

            let Some(resolved) = resolver.municipality(&feature.code)? else {
                continue;
            };

            let Some(overlap) = self.overlap(shape, feature)? else {
                continue;
            };

            let department_code = department_code(&resolved.municipality, resolved.department.as_ref());
            let municipality = resolved.municipality;
            found.push(MunicipalityOverlap {
                id: municipality.id,
                municipality_code: municipality.code,
                municipality_name: municipality.name,
                department_code,
                department_name: resolved.department.map(|d| d.name).unwrap_or_default(),
                overlap_pct: round2(overlap.pct),
                area_km2: round2(overlap.area_km2),
            });
        }

        Ok(found)
    }

    fn departments(
        &self,
        shape: &Shape,
        resolver: &CatalogResolver<'_>,
    ) -> Result<Vec<DepartmentOverlap>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for feature in self.store.departments().candidates(&shape.query()) {
            if !shape.geometry.intersects(&feature.geometry) || !seen.insert(feature.code.as_str()) {
                continue;
            }

            let Some(department) = resolver.department(&feature.code)? else {
                continue;
            };

            let Some(overlap) = self.overlap(shape, feature)? else {
                continue;
            };

            found.push(DepartmentOverlap {
                id: department.id,
                department_code: department.code,
                department_name: department.name,
                overlap_pct: round2(overlap.pct),
                area_km2: round2(overlap.area_km2),
            });
        }

        Ok(found)
    }

    /// Share of the feature covered by the input and the covered area.
    ///
    /// Features with no area are skipped. An intersection larger than the
    /// input itself means the ring is self-intersecting and is an error.
    fn overlap(&self, shape: &Shape, feature: &BoundaryFeature) -> Result<Option<Overlap>> {
        let feature_area = feature.geometry.unsigned_area();
        if feature_area <= 0.0 || !feature_area.is_finite() {
            warn!("Skipping {} {}: boundary has no area", feature.level, feature.code);
            return Ok(None);
        }

        let intersection = shape.geometry.intersection(&feature.geometry);
        let intersection_area = intersection.unsigned_area();
        if intersection_area > shape.area * (1.0 + AREA_TOLERANCE) + f64::EPSILON {
            return Err(LocatorError::processing(
                GeometryKind::Polygon,
                format!(
                    "invalid polygon: intersection with {} {} exceeds the polygon area (self-intersecting ring?)",
                    feature.level, feature.code
                ),
            ));
        }

        let pct = (intersection_area / feature_area * 100.0).clamp(0.0, 100.0);
        let area_km2 = self.projector.area_km2(&intersection);

        if !pct.is_finite() || !area_km2.is_finite() {
            return Err(LocatorError::processing(
                GeometryKind::Polygon,
                format!("non-finite overlap with {} {}", feature.level, feature.code),
            ));
        }

        Ok(Some(Overlap { pct, area_km2 }))
    }
}

/// Input polygon with its degree area computed once
struct Shape {
    geometry: MultiPolygon<f64>,
    area: f64,
}

impl Shape {
    fn new(ring: &[Coordinate]) -> Self {
        let geometry = MultiPolygon::new(vec![to_polygon(ring)]);
        let area = geometry.unsigned_area();
        Self { geometry, area }
    }

    fn query(&self) -> Geometry<f64> {
        Geometry::MultiPolygon(self.geometry.clone())
    }
}
