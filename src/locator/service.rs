//! Locator service: validation, dispatch and the outer error boundary.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use super::{LineAnalyzer, PointLocator, PolygonAnalyzer};
use crate::boundary::{BoundaryFeature, BoundaryStore};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{LocatorError, Result};
use crate::models::geometry::{parse_line, parse_point, parse_rings};
use crate::models::{
    AdminLevel, AnalysisResult, Bounds, GeometryInput, GeometryKind, LineAnalysis, PointAnalysis,
    PolygonAnalysis,
};
use crate::projection::MetricProjector;

/// Administrative boundary locator.
///
/// Owns the boundary dataset and the metric projector; the catalog is passed
/// per call. All methods take `&self` and can be called from many threads.
pub struct Locator {
    store: BoundaryStore,
    projector: MetricProjector,
    bounds: Bounds,
}

impl Locator {
    pub fn new(store: BoundaryStore, projector: MetricProjector, bounds: Bounds) -> Self {
        Self {
            store,
            projector,
            bounds,
        }
    }

    /// Build a locator from config. Boundary files are read on first use.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            BoundaryStore::from_config(&config.boundaries),
            MetricProjector::new(&config.projection),
            config.bounds,
        )
    }

    /// Validate and analyze a raw `[lng, lat]` point
    pub fn analyze_point(&self, raw: &[f64], catalog: &dyn Catalog) -> Result<PointAnalysis> {
        let coordinate = parse_point(raw, &self.bounds)?;
        guarded(GeometryKind::Point, || {
            PointLocator::new(&self.store, &self.projector).locate(coordinate, catalog)
        })
    }

    /// Validate and analyze a raw `[[lng, lat], ...]` line
    pub fn analyze_line(&self, raw: &[Vec<f64>], catalog: &dyn Catalog) -> Result<LineAnalysis> {
        let coordinates = parse_line(raw, &self.bounds)?;
        guarded(GeometryKind::Line, || {
            LineAnalyzer::new(&self.store, &self.projector).analyze(&coordinates, catalog)
        })
    }

    /// Validate and analyze raw polygon rings; only the outer ring is used
    pub fn analyze_polygon(
        &self,
        rings: &[Vec<Vec<f64>>],
        catalog: &dyn Catalog,
    ) -> Result<PolygonAnalysis> {
        let rings = parse_rings(rings, &self.bounds)?;
        guarded(GeometryKind::Polygon, || {
            PolygonAnalyzer::new(&self.store, &self.projector).analyze(&rings, catalog)
        })
    }

    /// Analyze geometry that was validated by the caller
    pub fn analyze(&self, input: &GeometryInput, catalog: &dyn Catalog) -> Result<AnalysisResult> {
        let kind = input.kind();
        guarded(kind, || match input {
            GeometryInput::Point(c) => PointLocator::new(&self.store, &self.projector)
                .locate(*c, catalog)
                .map(AnalysisResult::Point),
            GeometryInput::Line(coords) => LineAnalyzer::new(&self.store, &self.projector)
                .analyze(coords, catalog)
                .map(AnalysisResult::Line),
            GeometryInput::Polygon(rings) => PolygonAnalyzer::new(&self.store, &self.projector)
                .analyze(rings, catalog)
                .map(AnalysisResult::Polygon),
        })
    }

    /// Boundary geometry for an administrative code
    pub fn boundary(&self, level: AdminLevel, code: &str) -> Option<&BoundaryFeature> {
        self.store.collection(level).get(code)
    }

    /// Get the boundary store (for stats/preloading)
    pub fn store(&self) -> &BoundaryStore {
        &self.store
    }
}

/// Run an analysis, turning any failure into a processing error
fn guarded<T>(kind: GeometryKind, f: impl FnOnce() -> Result<T>) -> Result<T> {
    debug!("Analyzing {}", kind);

    let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected failure".to_string());
            Err(LocatorError::processing(kind, message))
        }
    };

    if let Err(e) = &result {
        error!("{} analysis failed: {}", kind, e);
    }

    result
}
