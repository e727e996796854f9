//! Lazily loaded boundary dataset.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use anyhow::Context;
use tracing::{info, warn};

use super::{parse_boundaries, BoundaryCollection, BoundaryFeature, CodeProperties};
use crate::config::BoundariesConfig;
use crate::models::AdminLevel;

enum Source {
    Files {
        departments: PathBuf,
        municipalities: PathBuf,
        props: CodeProperties,
    },
    Memory {
        departments: Vec<BoundaryFeature>,
        municipalities: Vec<BoundaryFeature>,
    },
}

/// Department and municipality collections, parsed at most once.
///
/// A collection is loaded on first access and shared read-only afterwards.
/// A missing or unparsable file yields an empty collection.
pub struct BoundaryStore {
    source: Mutex<Option<Source>>,
    departments: OnceLock<BoundaryCollection>,
    municipalities: OnceLock<BoundaryCollection>,
}

impl BoundaryStore {
    /// Store backed by the two GeoJSON files named in the config
    pub fn from_config(config: &BoundariesConfig) -> Self {
        Self::from_files(
            config.data_dir.join(&config.departments_file),
            config.data_dir.join(&config.municipalities_file),
            CodeProperties {
                department: config.department_code_property.clone(),
                municipality: config.municipality_code_property.clone(),
            },
        )
    }

    pub fn from_files(departments: PathBuf, municipalities: PathBuf, props: CodeProperties) -> Self {
        Self::with_source(Source::Files {
            departments,
            municipalities,
            props,
        })
    }

    /// Store over features already in memory
    pub fn from_features(
        departments: Vec<BoundaryFeature>,
        municipalities: Vec<BoundaryFeature>,
    ) -> Self {
        Self::with_source(Source::Memory {
            departments,
            municipalities,
        })
    }

    fn with_source(source: Source) -> Self {
        Self {
            source: Mutex::new(Some(source)),
            departments: OnceLock::new(),
            municipalities: OnceLock::new(),
        }
    }

    pub fn departments(&self) -> &BoundaryCollection {
        self.departments
            .get_or_init(|| self.load(AdminLevel::Department))
    }

    pub fn municipalities(&self) -> &BoundaryCollection {
        self.municipalities
            .get_or_init(|| self.load(AdminLevel::Municipality))
    }

    pub fn collection(&self, level: AdminLevel) -> &BoundaryCollection {
        match level {
            AdminLevel::Department => self.departments(),
            AdminLevel::Municipality => self.municipalities(),
        }
    }

    /// Force both collections to load
    pub fn preload(&self) {
        let departments = self.departments().len();
        let municipalities = self.municipalities().len();
        info!(
            "Boundary store ready: {} departments, {} municipalities",
            departments, municipalities
        );
    }

    fn load(&self, level: AdminLevel) -> BoundaryCollection {
        // A poisoned lock only means another loader panicked; the source is still usable
        let mut guard = match self.source.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let features = match guard.as_mut() {
            Some(Source::Files {
                departments,
                municipalities,
                props,
            }) => {
                let path = match level {
                    AdminLevel::Department => departments.as_path(),
                    AdminLevel::Municipality => municipalities.as_path(),
                };
                match read_collection(path, level, props) {
                    Ok(features) => features,
                    Err(e) => {
                        warn!("Failed to load {} boundaries: {:#}", level, e);
                        Vec::new()
                    }
                }
            }
            Some(Source::Memory {
                departments,
                municipalities,
            }) => match level {
                AdminLevel::Department => std::mem::take(departments),
                AdminLevel::Municipality => std::mem::take(municipalities),
            },
            None => Vec::new(),
        };

        BoundaryCollection::build(features)
    }
}

fn read_collection(
    path: &Path,
    level: AdminLevel,
    props: &CodeProperties,
) -> anyhow::Result<Vec<BoundaryFeature>> {
    info!("Loading {} boundaries from {}", level, path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_boundaries(&text, level, props)
        .with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DEPARTMENTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "DPTO": "11" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-75.0, 4.0], [-74.0, 4.0], [-74.0, 5.0], [-75.0, 5.0], [-75.0, 4.0]]]
            }
        }]
    }"#;

    #[test]
    fn test_missing_files_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = BoundaryStore::from_files(
            dir.path().join("nope_dpto.geojson"),
            dir.path().join("nope_mpio.geojson"),
            CodeProperties::default(),
        );
        assert!(store.departments().is_empty());
        assert!(store.municipalities().is_empty());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mpio = dir.path().join("mpio.geojson");
        fs::write(&mpio, "{ not json").unwrap();
        let dpto = dir.path().join("dpto.geojson");
        fs::write(&dpto, DEPARTMENTS).unwrap();

        let store = BoundaryStore::from_files(dpto, mpio, CodeProperties::default());
        assert_eq!(store.departments().len(), 1);
        assert!(store.municipalities().is_empty());
    }

    #[test]
    fn test_load_happens_once() {
        let dir = tempfile::tempdir().unwrap();
        let dpto = dir.path().join("dpto.geojson");
        fs::write(&dpto, DEPARTMENTS).unwrap();

        let store = BoundaryStore::from_files(
            dpto.clone(),
            dir.path().join("mpio.geojson"),
            CodeProperties::default(),
        );
        assert_eq!(store.departments().len(), 1);

        // Later changes on disk are not observed
        fs::remove_file(&dpto).unwrap();
        assert_eq!(store.departments().len(), 1);
        assert!(store.departments().get("11").is_some());
    }

    #[test]
    fn test_memory_source() {
        let store = BoundaryStore::from_features(Vec::new(), Vec::new());
        store.preload();
        assert!(store.collection(AdminLevel::Department).is_empty());
        assert!(store.collection(AdminLevel::Municipality).is_empty());
    }
}
