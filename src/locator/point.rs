//! Point attribution: containing municipality, or nearest centroid.

use geo::{Contains, Geometry, Point};
use tracing::debug;

use crate::boundary::BoundaryStore;
use crate::catalog::{Catalog, CatalogResolver};
use crate::error::Result;
use crate::models::{department_prefix, Coordinate, MatchKind, PointAnalysis, PointLocation};
use crate::projection::MetricProjector;

/// Resolves a coordinate to the municipality that contains it
pub struct PointLocator<'a> {
    store: &'a BoundaryStore,
    projector: &'a MetricProjector,
}

impl<'a> PointLocator<'a> {
    pub fn new(store: &'a BoundaryStore, projector: &'a MetricProjector) -> Self {
        Self { store, projector }
    }

    /// Locate a point.
    ///
    /// The first municipality in dataset order that contains the point and
    /// has a catalog record wins. Otherwise the municipality with the closest
    /// stored centroid is returned as an approximate match.
    pub fn locate(&self, coordinate: Coordinate, catalog: &dyn Catalog) -> Result<PointAnalysis> {
        let resolver = CatalogResolver::new(catalog);
        let point: Point<f64> = coordinate.into();
        let query = Geometry::Point(point);

        for feature in self.store.municipalities().candidates(&query) {
            if !feature.geometry.contains(&point) {
                continue;
            }

            let Some(resolved) = resolver.municipality(&feature.code)? else {
                continue;
            };

            let distance_km = resolved
                .municipality
                .centroid()
                .map(|(lng, lat)| self.projector.distance_km(point, Point::new(lng, lat)))
                .unwrap_or(0.0);

            debug!(
                "Point ({}, {}) inside municipality {}",
                coordinate.lng, coordinate.lat, feature.code
            );

            return Ok(PointAnalysis {
                coordinates: coordinate,
                location: PointLocation::new(
                    &resolved.municipality,
                    resolved.department.as_ref(),
                    distance_km,
                    MatchKind::Contained,
                ),
            });
        }

        let location = self.nearest(point, &resolver)?;

        Ok(PointAnalysis {
            coordinates: coordinate,
            location,
        })
    }

    fn nearest(&self, point: Point<f64>, resolver: &CatalogResolver<'_>) -> Result<PointLocation> {
        let mut best = None;
        let mut min_distance = f64::INFINITY;

        for municipality in resolver.municipalities_with_centroid()? {
            let Some((lng, lat)) = municipality.centroid() else {
                continue;
            };
            let distance = self.projector.distance_km(point, Point::new(lng, lat));
            if distance < min_distance {
                min_distance = distance;
                best = Some(municipality);
            }
        }

        let Some(municipality) = best else {
            debug!("No municipality with a centroid; point ({}, {}) not found", point.x(), point.y());
            return Ok(PointLocation::not_found());
        };

        debug!(
            "Point ({}, {}) outside all boundaries; nearest municipality {} at {:.2} km",
            point.x(),
            point.y(),
            municipality.code,
            min_distance
        );

        let department = resolver.department(department_prefix(&municipality.code))?;

        Ok(PointLocation::new(
            &municipality,
            department.as_ref(),
            min_distance,
            MatchKind::Nearest,
        ))
    }
}
