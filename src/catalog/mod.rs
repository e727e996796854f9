//! Catalog of persisted administrative records.
//!
//! Boundary features only carry codes; the catalog turns a code into the
//! stable id and display name callers see. The catalog is handed to every
//! analysis call, so the caller decides how connections are scoped.

mod memory;

pub use memory::MemoryCatalog;

use tracing::debug;

use crate::error::Result;
use crate::models::{department_prefix, DepartmentRecord, MunicipalityRecord};

/// Read-only lookups against the department and municipality tables
pub trait Catalog: Send + Sync {
    fn department(&self, code: &str) -> Result<Option<DepartmentRecord>>;

    fn municipality(&self, code: &str) -> Result<Option<MunicipalityRecord>>;

    /// All municipalities with both centroid halves recorded
    fn municipalities_with_centroid(&self) -> Result<Vec<MunicipalityRecord>>;
}

/// Municipality record together with its owning department, when present
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMunicipality {
    pub municipality: MunicipalityRecord,
    pub department: Option<DepartmentRecord>,
}

/// Joins boundary codes with catalog records
pub struct CatalogResolver<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> CatalogResolver<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    pub fn department(&self, code: &str) -> Result<Option<DepartmentRecord>> {
        let record = self.catalog.department(code)?;
        if record.is_none() {
            debug!("No catalog department for code {}", code);
        }
        Ok(record)
    }

    /// Resolve a municipality and its department by the code prefix.
    pub fn municipality(&self, code: &str) -> Result<Option<ResolvedMunicipality>> {
        let Some(municipality) = self.catalog.municipality(code)? else {
            debug!("No catalog municipality for code {}", code);
            return Ok(None);
        };

        let department = self.catalog.department(department_prefix(&municipality.code))?;

        Ok(Some(ResolvedMunicipality {
            municipality,
            department,
        }))
    }

    pub fn municipalities_with_centroid(&self) -> Result<Vec<MunicipalityRecord>> {
        self.catalog.municipalities_with_centroid()
    }
}
