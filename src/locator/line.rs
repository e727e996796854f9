//! Polyline analysis: regions crossed and total length.
//!
//! The `order` of each crossed region is its position among matches in
//! boundary dataset order. It is not the order in which the line actually
//! traverses the regions; recovering that would need the line parameter of
//! the first intersection with each region.

use geo::{Geometry, Intersects, LineString};
use hashbrown::HashSet;
use tracing::debug;

use crate::boundary::BoundaryStore;
use crate::catalog::{Catalog, CatalogResolver};
use crate::error::Result;
use crate::models::geometry::to_line_string;
use crate::models::analysis::{department_code, round2};
use crate::models::{Coordinate, DepartmentOnRoute, LineAnalysis, LineSummary, MunicipalityOnRoute};
use crate::projection::MetricProjector;

/// Finds the municipalities and departments a line intersects
pub struct LineAnalyzer<'a> {
    store: &'a BoundaryStore,
    projector: &'a MetricProjector,
}

impl<'a> LineAnalyzer<'a> {
    pub fn new(store: &'a BoundaryStore, projector: &'a MetricProjector) -> Self {
        Self { store, projector }
    }

    pub fn analyze(&self, coordinates: &[Coordinate], catalog: &dyn Catalog) -> Result<LineAnalysis> {
        let resolver = CatalogResolver::new(catalog);
        let line = to_line_string(coordinates);
        let length_km = round2(self.projector.length_km(&line));

        let municipalities = self.municipalities(&line, &resolver)?;
        let departments = self.departments(&line, &resolver)?;

        debug!(
            "Line of {} points ({} km) crosses {} municipalities, {} departments",
            coordinates.len(),
            length_km,
            municipalities.len(),
            departments.len()
        );

        Ok(LineAnalysis {
            coordinates: coordinates.to_vec(),
            length_km,
            summary: LineSummary {
                total_departments: departments.len(),
                total_municipalities: municipalities.len(),
                length_km,
            },
            departments,
            municipalities,
        })
    }

    fn municipalities(
        &self,
        line: &LineString<f64>,
        resolver: &CatalogResolver<'_>,
    ) -> Result<Vec<MunicipalityOnRoute>> {
        let query = Geometry::LineString(line.clone());
        let mut seen = HashSet::new();
        let mut found: Vec<MunicipalityOnRoute> = Vec::new();

        for feature in self.store.municipalities().candidates(&query) {
            if !line.intersects(&feature.geometry) || !seen.insert(feature.code.as_str()) {
                continue;
            }

            let Some(resolved) = resolver.municipality(&feature.code)? else {
                continue;
            };

            let department_code = department_code(&resolved.municipality, resolved.department.as_ref());
            let municipality = resolved.municipality;
            found.push(MunicipalityOnRoute {
                id: municipality.id,
                municipality_code: municipality.code,
                municipality_name: municipality.name,
                department_code,
                department_name: resolved.department.map(|d| d.name).unwrap_or_default(),
                order: found.len() + 1,
            });
        }

        Ok(found)
    }

    fn departments(
        &self,
        line: &LineString<f64>,
        resolver: &CatalogResolver<'_>,
    ) -> Result<Vec<DepartmentOnRoute>> {
        let query = Geometry::LineString(line.clone());
        let mut seen = HashSet::new();
        let mut found: Vec<DepartmentOnRoute> = Vec::new();

        for feature in self.store.departments().candidates(&query) {
            if !line.intersects(&feature.geometry) || !seen.insert(feature.code.as_str()) {
                continue;
            }

            let Some(department) = resolver.department(&feature.code)? else {
                continue;
            };

            found.push(DepartmentOnRoute {
                id: department.id,
                department_code: department.code,
                department_name: department.name,
                order: found.len() + 1,
            });
        }

        Ok(found)
    }
}
