//! Caller-supplied geometry and its validation.

use geo::{Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{LocatorError, Result};

/// Kind of geometry submitted for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    #[serde(rename = "marker")]
    Point,
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "polygon")]
    Polygon,
}

impl GeometryKind {
    /// Minimum number of coordinates accepted for this kind
    pub fn min_coordinates(&self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::Line | GeometryKind::Polygon => 2,
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "point"),
            GeometryKind::Line => write!(f, "line"),
            GeometryKind::Polygon => write!(f, "polygon"),
        }
    }
}

/// Longitude/latitude pair in degrees, serialized as `[lng, lat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Parse a raw `[lng, lat]` slice, rejecting wrong arity and non-finite values.
    pub fn from_slice(index: usize, raw: &[f64]) -> Result<Self> {
        let [lng, lat] = raw else {
            return Err(LocatorError::MalformedCoordinate {
                index,
                reason: format!("expected [lng, lat], got {} values", raw.len()),
            });
        };

        if !lng.is_finite() || !lat.is_finite() {
            return Err(LocatorError::MalformedCoordinate {
                index,
                reason: "values must be finite numbers".to_string(),
            });
        }

        Ok(Self::new(*lng, *lat))
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lng, c.lat]
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(c: Coordinate) -> Self {
        Coord { x: c.lng, y: c.lat }
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lng, c.lat)
    }
}

/// Geographic extent that every input coordinate must fall within
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Default for Bounds {
    /// Continental Colombia plus the San Andrés archipelago
    fn default() -> Self {
        Self {
            min_lng: -79.0,
            max_lng: -66.0,
            min_lat: -4.5,
            max_lat: 13.5,
        }
    }
}

impl Bounds {
    /// Whole-world bounds
    pub fn world() -> Self {
        Self {
            min_lng: -180.0,
            max_lng: 180.0,
            min_lat: -90.0,
            max_lat: 90.0,
        }
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.min_lng..=self.max_lng).contains(&c.lng) && (self.min_lat..=self.max_lat).contains(&c.lat)
    }

    fn check(&self, c: Coordinate) -> Result<Coordinate> {
        if self.contains(&c) {
            Ok(c)
        } else {
            Err(LocatorError::OutOfBounds {
                lng: c.lng,
                lat: c.lat,
            })
        }
    }
}

/// Validated geometry ready for analysis
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryInput {
    Point(Coordinate),
    Line(Vec<Coordinate>),
    /// Rings as submitted; the first is the outer ring, closure is implicit
    Polygon(Vec<Vec<Coordinate>>),
}

impl GeometryInput {
    /// Validate a raw `[lng, lat]` point.
    pub fn point(raw: &[f64], bounds: &Bounds) -> Result<Self> {
        parse_point(raw, bounds).map(GeometryInput::Point)
    }

    /// Validate a raw `[[lng, lat], ...]` line.
    pub fn line(raw: &[Vec<f64>], bounds: &Bounds) -> Result<Self> {
        parse_line(raw, bounds).map(GeometryInput::Line)
    }

    /// Validate raw GeoJSON-style polygon rings.
    pub fn polygon(rings: &[Vec<Vec<f64>>], bounds: &Bounds) -> Result<Self> {
        parse_rings(rings, bounds).map(GeometryInput::Polygon)
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            GeometryInput::Point(_) => GeometryKind::Point,
            GeometryInput::Line(_) => GeometryKind::Line,
            GeometryInput::Polygon(_) => GeometryKind::Polygon,
        }
    }
}

/// Parse one `[lng, lat]` pair inside the bounds
pub fn parse_point(raw: &[f64], bounds: &Bounds) -> Result<Coordinate> {
    bounds.check(Coordinate::from_slice(0, raw)?)
}

/// Parse a line of at least two vertices
pub fn parse_line(raw: &[Vec<f64>], bounds: &Bounds) -> Result<Vec<Coordinate>> {
    check_len(GeometryKind::Line, raw.len())?;
    parse_sequence(raw, bounds)
}

/// Parse polygon rings.
///
/// The outer ring needs at least two vertices. Every vertex of every ring is
/// checked, although only the outer ring is analyzed.
pub fn parse_rings(rings: &[Vec<Vec<f64>>], bounds: &Bounds) -> Result<Vec<Vec<Coordinate>>> {
    check_len(GeometryKind::Polygon, rings.first().map_or(0, Vec::len))?;
    rings.iter().map(|ring| parse_sequence(ring, bounds)).collect()
}

fn check_len(kind: GeometryKind, got: usize) -> Result<()> {
    if got < kind.min_coordinates() {
        return Err(LocatorError::TooFewCoordinates {
            kind,
            min: kind.min_coordinates(),
            got,
        });
    }
    Ok(())
}

fn parse_sequence(raw: &[Vec<f64>], bounds: &Bounds) -> Result<Vec<Coordinate>> {
    raw.iter()
        .enumerate()
        .map(|(index, pair)| Coordinate::from_slice(index, pair).and_then(|c| bounds.check(c)))
        .collect()
}

/// Build a line string from validated coordinates
pub fn to_line_string(coords: &[Coordinate]) -> LineString<f64> {
    LineString::new(coords.iter().copied().map(Coord::from).collect())
}

/// Build a polygon from an outer ring, closing it if needed
pub fn to_polygon(ring: &[Coordinate]) -> Polygon<f64> {
    // geo closes the exterior ring on construction
    Polygon::new(to_line_string(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_requires_pair() {
        let err = GeometryInput::point(&[-74.08], &Bounds::default()).unwrap_err();
        assert!(matches!(err, LocatorError::MalformedCoordinate { index: 0, .. }));
        assert!(err.is_validation());

        let err = GeometryInput::point(&[-74.08, 4.6, 0.0], &Bounds::default()).unwrap_err();
        assert!(matches!(err, LocatorError::MalformedCoordinate { .. }));
    }

    #[test]
    fn test_point_rejects_non_finite() {
        let err = GeometryInput::point(&[f64::NAN, 4.6], &Bounds::default()).unwrap_err();
        assert!(matches!(err, LocatorError::MalformedCoordinate { .. }));
    }

    #[test]
    fn test_point_bounds() {
        let ok = GeometryInput::point(&[-74.08, 4.6], &Bounds::default()).unwrap();
        assert_eq!(ok, GeometryInput::Point(Coordinate::new(-74.08, 4.6)));

        let err = GeometryInput::point(&[2.35, 48.85], &Bounds::default()).unwrap_err();
        assert!(matches!(err, LocatorError::OutOfBounds { .. }));

        assert!(GeometryInput::point(&[2.35, 48.85], &Bounds::world()).is_ok());
    }

    #[test]
    fn test_line_requires_two_points() {
        let err = GeometryInput::line(&[vec![-74.0, 4.0]], &Bounds::default()).unwrap_err();
        assert!(matches!(
            err,
            LocatorError::TooFewCoordinates {
                kind: GeometryKind::Line,
                min: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_line_reports_bad_vertex_position() {
        let raw = vec![vec![-74.0, 4.0], vec![-74.1, 4.1], vec![-74.2]];
        let err = GeometryInput::line(&raw, &Bounds::default()).unwrap_err();
        assert!(matches!(err, LocatorError::MalformedCoordinate { index: 2, .. }));
    }

    #[test]
    fn test_polygon_keeps_all_rings() {
        let rings = vec![
            vec![vec![-74.0, 4.0], vec![-73.0, 4.0], vec![-73.0, 5.0]],
            vec![vec![-73.5, 4.5]],
        ];
        let parsed = parse_rings(&rings, &Bounds::default()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].len(), 3);
        assert_eq!(parsed[1], vec![Coordinate::new(-73.5, 4.5)]);

        let err = GeometryInput::polygon(&[], &Bounds::default()).unwrap_err();
        assert!(matches!(err, LocatorError::TooFewCoordinates { got: 0, .. }));
    }

    #[test]
    fn test_inner_ring_vertices_are_checked() {
        let rings = vec![
            vec![vec![-74.0, 4.0], vec![-73.0, 4.0], vec![-73.0, 5.0]],
            vec![vec![2.35, 48.85]],
        ];
        let err = parse_rings(&rings, &Bounds::default()).unwrap_err();
        assert!(matches!(err, LocatorError::OutOfBounds { .. }));
    }

    #[test]
    fn test_parse_helpers_return_coordinates() {
        let point = parse_point(&[-74.08, 4.6], &Bounds::default()).unwrap();
        assert_eq!(point, Coordinate::new(-74.08, 4.6));

        let line = parse_line(&[vec![-74.0, 4.0], vec![-74.1, 4.1]], &Bounds::default()).unwrap();
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn test_polygon_is_closed() {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ];
        let polygon = to_polygon(&ring);
        assert_eq!(polygon.exterior().0.len(), 4);
        assert_eq!(polygon.exterior().0.first(), polygon.exterior().0.last());
    }

    #[test]
    fn test_coordinate_serializes_as_pair() {
        let json = serde_json::to_string(&Coordinate::new(-74.5, 4.25)).unwrap();
        assert_eq!(json, "[-74.5,4.25]");
    }
}
