//! Segment-versus-shadow intersection tests.

use geo::{BoundingRect, Intersects, Line};
use rstar::{AABB, RTree, primitives::GeomWithData, primitives::Rectangle};

use super::source::ShadowFeature;

/// Answers whether a segment touches or crosses any shadow
pub trait ShadowLookup: Sync {
    fn is_shaded(&self, segment: &Line<f64>) -> bool;

    fn is_empty(&self) -> bool;
}

type ShadowEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// R-tree over shadow bounding boxes; exact `Intersects` only runs on
/// shadows whose box overlaps the segment's box.
#[derive(Debug, Clone)]
pub struct ShadowIndex {
    features: Vec<ShadowFeature>,
    tree: RTree<ShadowEnvelope>,
}

impl ShadowIndex {
    pub fn new(features: Vec<ShadowFeature>) -> Self {
        let envelopes = features
            .iter()
            .enumerate()
            .filter_map(|(idx, feature)| {
                let rect = feature.geometry.bounding_rect()?;
                Some(ShadowEnvelope::new(
                    Rectangle::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    idx,
                ))
            })
            .collect();

        Self {
            tree: RTree::bulk_load(envelopes),
            features,
        }
    }

    pub fn features(&self) -> &[ShadowFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

impl ShadowLookup for ShadowIndex {
    fn is_shaded(&self, segment: &Line<f64>) -> bool {
        let envelope = AABB::from_corners(
            [segment.start.x, segment.start.y],
            [segment.end.x, segment.end.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|candidate| self.features[candidate.data].geometry.intersects(segment))
    }

    fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Tests every shadow for every segment
#[derive(Debug, Clone, Copy)]
pub struct LinearShadowScan<'a> {
    pub features: &'a [ShadowFeature],
}

impl ShadowLookup for LinearShadowScan<'_> {
    fn is_shaded(&self, segment: &Line<f64>) -> bool {
        self.features
            .iter()
            .any(|feature| feature.geometry.intersects(segment))
    }

    fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, Point, coord, polygon};

    use super::*;

    fn shadows() -> Vec<ShadowFeature> {
        vec![
            ShadowFeature {
                id: 1,
                geometry: polygon![
                    (x: 1.0, y: -1.0), (x: 2.0, y: -1.0), (x: 2.0, y: 1.0), (x: 1.0, y: 1.0)
                ]
                .into(),
            },
            ShadowFeature {
                id: 2,
                geometry: Geometry::Point(Point::new(10.0, 10.0)),
            },
        ]
    }

    fn segment(a: (f64, f64), b: (f64, f64)) -> Line<f64> {
        Line::new(coord! { x: a.0, y: a.1 }, coord! { x: b.0, y: b.1 })
    }

    #[test]
    fn index_and_scan_agree() {
        let features = shadows();
        let index = ShadowIndex::new(features.clone());
        let scan = LinearShadowScan {
            features: &features,
        };

        let cases = [
            (segment((0.0, 0.0), (3.0, 0.0)), true),   // crosses the square
            (segment((0.0, 1.0), (1.0, 1.0)), true),   // touches the top-left corner edge
            (segment((0.0, 2.0), (3.0, 2.0)), false),  // passes above
            (segment((3.0, 0.0), (0.0, 5.0)), false),  // boxes overlap, geometries do not
            (segment((10.0, 0.0), (10.0, 20.0)), true), // through the point shadow
        ];
        for (line, expected) in cases {
            assert_eq!(index.is_shaded(&line), expected, "{line:?}");
            assert_eq!(scan.is_shaded(&line), expected, "{line:?}");
        }
    }

    #[test]
    fn empty_index_shades_nothing() {
        let index = ShadowIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(!index.is_shaded(&segment((0.0, 0.0), (1.0, 1.0))));
    }
}
