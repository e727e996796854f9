//! Metric measurements for geographic geometry.
//!
//! Geometry is reprojected into one fixed planar CRS for the whole national
//! territory and measured there. Whenever reprojection is unavailable or fails,
//! measures fall back to one degree of arc being 111 km, applied to the
//! unprojected degree-based measure. The fallback is a precision compromise.

use geo::{Area, Coord, Distance, Euclidean, Length, LineString, MapCoords, MultiPolygon, Point};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ProjectionConfig;

/// Kilometres per degree of arc used by the fallback
pub const KM_PER_DEGREE: f64 = 111.0;

/// How areas are converted to km²
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaMode {
    /// Degree² area scaled by 111 × 111 for every area
    #[default]
    DegreeSquare,
    /// Same reprojection/fallback policy as lengths and distances
    Projected,
}

struct Planar {
    source: Proj,
    target: Proj,
}

/// Converts degree geometry into km / km² measures
pub struct MetricProjector {
    planar: Option<Planar>,
    area_mode: AreaMode,
}

impl MetricProjector {
    /// Build from config. An unusable CRS definition leaves the projector in
    /// fallback-only mode.
    pub fn new(config: &ProjectionConfig) -> Self {
        let planar = match (
            Proj::from_proj_string(&config.source_proj),
            Proj::from_proj_string(&config.target_proj),
        ) {
            (Ok(source), Ok(target)) => {
                info!("Metric projection: {}", config.target_proj);
                Some(Planar { source, target })
            }
            (source, target) => {
                warn!(
                    "Could not build metric projection (source ok: {}, target ok: {}); using {} km/degree approximation",
                    source.is_ok(),
                    target.is_ok(),
                    KM_PER_DEGREE
                );
                None
            }
        };

        Self {
            planar,
            area_mode: config.area_mode,
        }
    }

    /// Projector that always uses the degree approximation
    pub fn degrees_only(area_mode: AreaMode) -> Self {
        Self {
            planar: None,
            area_mode,
        }
    }

    pub fn is_planar(&self) -> bool {
        self.planar.is_some()
    }

    fn project<G>(&self, geometry: &G) -> Option<G::Output>
    where
        G: MapCoords<f64, f64>,
    {
        let planar = self.planar.as_ref()?;
        let projected = geometry.try_map_coords(|c: Coord<f64>| {
            let mut point = (c.x.to_radians(), c.y.to_radians(), 0.0);
            transform(&planar.source, &planar.target, &mut point).map_err(|e| format!("{:?}", e))?;
            if point.0.is_finite() && point.1.is_finite() {
                Ok(Coord {
                    x: point.0,
                    y: point.1,
                })
            } else {
                Err(format!("non-finite projection of ({}, {})", c.x, c.y))
            }
        });

        match projected {
            Ok(g) => Some(g),
            Err(e) => {
                debug!("Reprojection failed, falling back to degree approximation: {}", e);
                None
            }
        }
    }

    /// Length of a line in km
    pub fn length_km(&self, line: &LineString<f64>) -> f64 {
        match self.project(line) {
            Some(projected) => Euclidean.length(&projected) / 1000.0,
            None => Euclidean.length(line) * KM_PER_DEGREE,
        }
    }

    /// Planar distance between two points in km
    pub fn distance_km(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        match (self.project(&a), self.project(&b)) {
            (Some(pa), Some(pb)) => Euclidean.distance(pa, pb) / 1000.0,
            _ => Euclidean.distance(a, b) * KM_PER_DEGREE,
        }
    }

    /// Area in km² according to the configured area mode
    pub fn area_km2(&self, geometry: &MultiPolygon<f64>) -> f64 {
        let degree_area = || geometry.unsigned_area() * KM_PER_DEGREE * KM_PER_DEGREE;
        match self.area_mode {
            AreaMode::DegreeSquare => degree_area(),
            AreaMode::Projected => match self.project(geometry) {
                Some(projected) => projected.unsigned_area() / 1_000_000.0,
                None => degree_area(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    fn planar() -> MetricProjector {
        MetricProjector::new(&ProjectionConfig::default())
    }

    fn within(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() <= expected.abs() * tolerance
    }

    #[test]
    fn test_fallback_length() {
        let projector = MetricProjector::degrees_only(AreaMode::DegreeSquare);
        let line = line_string![(x: -74.0, y: 4.0), (x: -73.0, y: 4.0)];
        assert!((projector.length_km(&line) - 111.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_distance() {
        let projector = MetricProjector::degrees_only(AreaMode::DegreeSquare);
        let d = projector.distance_km(Point::new(-74.0, 4.0), Point::new(-74.0, 6.0));
        assert!((d - 222.0).abs() < 1e-9);
    }

    #[test]
    fn test_degree_square_area() {
        let projector = MetricProjector::degrees_only(AreaMode::DegreeSquare);
        let square = MultiPolygon::new(vec![polygon![
            (x: -74.0, y: 4.0),
            (x: -73.0, y: 4.0),
            (x: -73.0, y: 5.0),
            (x: -74.0, y: 5.0),
        ]]);
        assert!((projector.area_km2(&square) - 12321.0).abs() < 1e-6);
    }

    #[test]
    fn test_planar_length_is_close_to_approximation() {
        let projector = planar();
        // Along a meridian a degree is ~110.6 km on the ellipsoid
        let line = line_string![(x: -74.0, y: 4.0), (x: -74.0, y: 5.0)];
        let km = projector.length_km(&line);
        assert!(within(km, 111.0, 0.02), "got {}", km);
    }

    #[test]
    fn test_length_scales_with_extent() {
        let projector = planar();
        let short = line_string![(x: -74.2, y: 4.5), (x: -74.1, y: 4.5)];
        let long = line_string![(x: -74.2, y: 4.5), (x: -74.0, y: 4.5)];
        let ratio = projector.length_km(&long) / projector.length_km(&short);
        assert!(within(ratio, 2.0, 0.01), "ratio {}", ratio);
    }

    #[test]
    fn test_projected_area_mode() {
        let config = ProjectionConfig {
            area_mode: AreaMode::Projected,
            ..ProjectionConfig::default()
        };
        let projector = MetricProjector::new(&config);
        let square = MultiPolygon::new(vec![polygon![
            (x: -74.2, y: 4.5),
            (x: -74.1, y: 4.5),
            (x: -74.1, y: 4.6),
            (x: -74.2, y: 4.6),
        ]]);
        let km2 = projector.area_km2(&square);
        assert!(within(km2, 123.21, 0.03), "got {}", km2);
    }

    #[test]
    fn test_bad_crs_uses_fallback() {
        let config = ProjectionConfig {
            target_proj: "+proj=definitely_not_a_projection".to_string(),
            ..ProjectionConfig::default()
        };
        let projector = MetricProjector::new(&config);
        assert!(!projector.is_planar());
        let line = line_string![(x: -74.0, y: 4.0), (x: -73.0, y: 4.0)];
        assert!((projector.length_km(&line) - 111.0).abs() < 1e-9);
    }

    #[test]
    fn test_measures_are_non_negative() {
        let projector = planar();
        let degenerate = line_string![(x: -74.0, y: 4.0), (x: -74.0, y: 4.0)];
        assert_eq!(projector.length_km(&degenerate), 0.0);
        let p = Point::new(-74.0, 4.0);
        assert_eq!(projector.distance_km(p, p), 0.0);
    }
}
