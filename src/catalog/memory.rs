//! In-memory catalog, optionally loaded from CSV exports of the reference tables.

use std::path::Path;

use anyhow::{Context, Result};
use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use tracing::info;

use super::Catalog;
use crate::config::CatalogConfig;
use crate::models::{DepartmentRecord, MunicipalityRecord};

/// Catalog held entirely in memory.
///
/// Municipalities keep their load order, which is the order the nearest
/// centroid scan visits them in.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    departments: HashMap<String, DepartmentRecord>,
    municipalities: Vec<MunicipalityRecord>,
    municipality_index: HashMap<String, usize>,
}

impl MemoryCatalog {
    pub fn new(departments: Vec<DepartmentRecord>, municipalities: Vec<MunicipalityRecord>) -> Self {
        let departments = departments
            .into_iter()
            .map(|d| (d.code.clone(), d))
            .collect();

        let mut municipality_index = HashMap::with_capacity(municipalities.len());
        for (idx, m) in municipalities.iter().enumerate() {
            municipality_index.entry(m.code.clone()).or_insert(idx);
        }

        Self {
            departments,
            municipalities,
            municipality_index,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::load_csv(&config.departments_csv, &config.municipalities_csv)
    }

    /// Load `departments.csv` (`id,code,name`) and `municipalities.csv`
    /// (`id,department_code,code,name,kind,latitude,longitude`).
    pub fn load_csv<P: AsRef<Path>, Q: AsRef<Path>>(departments: P, municipalities: Q) -> Result<Self> {
        let departments: Vec<DepartmentRecord> = read_csv(departments.as_ref())?;
        let municipalities: Vec<MunicipalityRecord> = read_csv(municipalities.as_ref())?;

        info!(
            "Loaded catalog: {} departments, {} municipalities",
            departments.len(),
            municipalities.len()
        );

        Ok(Self::new(departments, municipalities))
    }

    pub fn department_count(&self) -> usize {
        self.departments.len()
    }

    pub fn municipality_count(&self) -> usize {
        self.municipalities.len()
    }
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        let row: T = row.with_context(|| format!("Bad row {} in {}", line + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

impl Catalog for MemoryCatalog {
    fn department(&self, code: &str) -> crate::error::Result<Option<DepartmentRecord>> {
        Ok(self.departments.get(code).cloned())
    }

    fn municipality(&self, code: &str) -> crate::error::Result<Option<MunicipalityRecord>> {
        Ok(self
            .municipality_index
            .get(code)
            .map(|&idx| self.municipalities[idx].clone()))
    }

    fn municipalities_with_centroid(&self) -> crate::error::Result<Vec<MunicipalityRecord>> {
        Ok(self
            .municipalities
            .iter()
            .filter(|m| m.centroid().is_some())
            .cloned()
            .collect())
    }
}
