//! TOML configuration for the locator and its server.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Bounds;
use crate::projection::AreaMode;

/// MAGNA-SIRGAS / Colombia Bogota zone (EPSG:3116)
pub const DEFAULT_TARGET_PROJ: &str = "+proj=tmerc +lat_0=4.596200416666666 +lon_0=-74.07750791666666 +k=1 +x_0=1000000 +y_0=1000000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// WGS84 geographic coordinates (EPSG:4326)
pub const DEFAULT_SOURCE_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub boundaries: BoundariesConfig,
    pub catalog: CatalogConfig,
    pub projection: ProjectionConfig,
    pub bounds: Bounds,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundariesConfig {
    pub data_dir: PathBuf,
    pub departments_file: String,
    pub municipalities_file: String,
    pub department_code_property: String,
    pub municipality_code_property: String,
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            departments_file: "MGN_DPTO_POLITICO.geojson".to_string(),
            municipalities_file: "MGN_MPIO_POLITICO.geojson".to_string(),
            department_code_property: "DPTO".to_string(),
            municipality_code_property: "MPIO".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub departments_csv: PathBuf,
    pub municipalities_csv: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            departments_csv: PathBuf::from("data/departments.csv"),
            municipalities_csv: PathBuf::from("data/municipalities.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProjectionConfig {
    pub source_proj: String,
    pub target_proj: String,
    pub area_mode: AreaMode,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            source_proj: DEFAULT_SOURCE_PROJ.to_string(),
            target_proj: DEFAULT_TARGET_PROJ.to_string(),
            area_mode: AreaMode::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }
}
