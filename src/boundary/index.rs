//! Indexed collection of boundary features.

use geo::{BoundingRect, Geometry};
use hashbrown::HashMap;
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use super::BoundaryFeature;

/// R-tree entry pointing back at a feature's dataset position
#[derive(Clone)]
struct IndexedEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Immutable feature collection for one administrative level.
///
/// Features keep their dataset order. The R-tree only narrows the set of
/// features an analyzer has to test; candidates always come back in dataset
/// order, so results match a full linear scan.
pub struct BoundaryCollection {
    features: Vec<BoundaryFeature>,
    tree: RTree<IndexedEnvelope>,
    by_code: HashMap<String, usize>,
}

impl BoundaryCollection {
    /// Build the collection and its indexes
    pub fn build(features: Vec<BoundaryFeature>) -> Self {
        let entries: Vec<IndexedEnvelope> = features
            .iter()
            .enumerate()
            .filter_map(|(position, f)| {
                let (min_x, min_y, max_x, max_y) = f.bbox()?;
                Some(IndexedEnvelope {
                    position,
                    envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
                })
            })
            .collect();

        // First occurrence of a code owns the index slot
        let mut by_code = HashMap::with_capacity(features.len());
        for (position, f) in features.iter().enumerate() {
            by_code.entry(f.code.clone()).or_insert(position);
        }

        let tree = RTree::bulk_load(entries);

        info!(
            "Boundary index built with {} features ({} distinct codes)",
            features.len(),
            by_code.len()
        );

        Self {
            features,
            tree,
            by_code,
        }
    }

    pub fn empty() -> Self {
        Self::build(Vec::new())
    }

    /// Iterate over all features in dataset order
    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    /// Look up a feature by administrative code
    pub fn get(&self, code: &str) -> Option<&BoundaryFeature> {
        self.by_code.get(code).map(|&idx| &self.features[idx])
    }

    /// Features whose envelope overlaps the geometry's envelope, in dataset order
    pub fn candidates(&self, geometry: &Geometry<f64>) -> Vec<&BoundaryFeature> {
        let Some(rect) = geometry.bounding_rect() else {
            return Vec::new();
        };
        let query = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.position)
            .collect();
        positions.sort_unstable();

        positions.into_iter().map(|idx| &self.features[idx]).collect()
    }

    /// Get total number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, MultiPolygon, Point};

    fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: min_x, y: min_y),
            (x: min_x + size, y: min_y),
            (x: min_x + size, y: min_y + size),
            (x: min_x, y: min_y + size),
        ]])
    }

    #[test]
    fn test_candidates_keep_dataset_order() {
        let collection = BoundaryCollection::build(vec![
            BoundaryFeature::department("30", square(2.0, 0.0, 1.0)),
            BoundaryFeature::department("10", square(0.0, 0.0, 1.0)),
            BoundaryFeature::department("20", square(1.0, 0.0, 1.0)),
            BoundaryFeature::department("40", square(10.0, 10.0, 1.0)),
        ]);

        let line: Geometry<f64> = line_string![(x: 0.5, y: 0.5), (x: 2.5, y: 0.5)].into();
        let codes: Vec<&str> = collection
            .candidates(&line)
            .iter()
            .map(|f| f.code.as_str())
            .collect();
        assert_eq!(codes, vec!["30", "10", "20"]);
    }

    #[test]
    fn test_point_candidates() {
        let collection = BoundaryCollection::build(vec![
            BoundaryFeature::department("10", square(0.0, 0.0, 1.0)),
            BoundaryFeature::department("20", square(5.0, 5.0, 1.0)),
        ]);
        let point: Geometry<f64> = Point::new(5.5, 5.5).into();
        let found = collection.candidates(&point);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "20");
    }

    #[test]
    fn test_code_index() {
        let collection = BoundaryCollection::build(vec![
            BoundaryFeature::municipality("11", "001", square(0.0, 0.0, 1.0)),
            BoundaryFeature::municipality("25", "001", square(1.0, 0.0, 1.0)),
        ]);
        assert_eq!(collection.len(), 2);
        assert!(collection.get("25001").is_some());
        assert!(collection.get("25").is_none());
    }

    #[test]
    fn test_empty_collection() {
        let collection = BoundaryCollection::empty();
        assert!(collection.is_empty());
        let point: Geometry<f64> = Point::new(0.0, 0.0).into();
        assert!(collection.candidates(&point).is_empty());
    }
}
