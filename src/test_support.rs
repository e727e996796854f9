//! Synthetic boundary dataset shared by analyzer tests.
//!
//! Two departments side by side, each split into two municipalities:
//!
//! ```text
//!  lng  -75.0    -74.5    -74.0    -73.5    -73.0  -72.8
//!        | 11001  | 11002  | 25001  | 25002  | 25099 |   lat 4.0 .. 5.0
//!        |    dept 11      |    dept 25      |
//! ```
//!
//! Municipality features are stored out of geographic order (11002 first).
//! 25099 has a boundary but no catalog record.

use geo::{polygon, MultiPolygon};

use crate::boundary::{BoundaryFeature, BoundaryStore};
use crate::catalog::MemoryCatalog;
use crate::models::{DepartmentRecord, MunicipalityRecord};

pub fn rect(min_lng: f64, max_lng: f64, min_lat: f64, max_lat: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: min_lng, y: min_lat),
        (x: max_lng, y: min_lat),
        (x: max_lng, y: max_lat),
        (x: min_lng, y: max_lat),
    ]])
}

pub fn store() -> BoundaryStore {
    BoundaryStore::from_features(
        vec![
            BoundaryFeature::department("11", rect(-75.0, -74.0, 4.0, 5.0)),
            BoundaryFeature::department("25", rect(-74.0, -73.0, 4.0, 5.0)),
        ],
        vec![
            BoundaryFeature::municipality("11", "002", rect(-74.5, -74.0, 4.0, 5.0)),
            BoundaryFeature::municipality("11", "001", rect(-75.0, -74.5, 4.0, 5.0)),
            BoundaryFeature::municipality("25", "001", rect(-74.0, -73.5, 4.0, 5.0)),
            BoundaryFeature::municipality("25", "002", rect(-73.5, -73.0, 4.0, 5.0)),
            BoundaryFeature::municipality("25", "099", rect(-73.0, -72.8, 4.0, 5.0)),
        ],
    )
}

fn municipality(id: i64, code: &str, name: &str, centroid: Option<(f64, f64)>) -> MunicipalityRecord {
    MunicipalityRecord {
        id,
        department_code: code[..2].to_string(),
        code: code.to_string(),
        name: name.to_string(),
        kind: Some("Municipio".to_string()),
        latitude: centroid.map(|(_, lat)| lat),
        longitude: centroid.map(|(lng, _)| lng),
    }
}

pub fn departments() -> Vec<DepartmentRecord> {
    vec![
        DepartmentRecord {
            id: 1,
            code: "11".to_string(),
            name: "Bogotá".to_string(),
        },
        DepartmentRecord {
            id: 2,
            code: "25".to_string(),
            name: "Cundinamarca".to_string(),
        },
    ]
}

pub fn catalog() -> MemoryCatalog {
    MemoryCatalog::new(
        departments(),
        vec![
            municipality(101, "11001", "Occidente", Some((-74.75, 4.5))),
            municipality(102, "11002", "Oriente", Some((-74.25, 4.5))),
            municipality(201, "25001", "Sabana", Some((-73.75, 4.5))),
            municipality(202, "25002", "Llano", Some((-73.25, 4.5))),
        ],
    )
}

/// Same records without any stored centroid
pub fn catalog_without_centroids() -> MemoryCatalog {
    MemoryCatalog::new(
        departments(),
        vec![
            municipality(101, "11001", "Occidente", None),
            municipality(102, "11002", "Oriente", None),
        ],
    )
}
