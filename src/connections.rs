use nalgebra::{distance_squared, Point3};
use rayon::prelude::*;

use crate::spatial_indexer::SpatialIndexer;

// Pairs (i, j) with i < j at most `max_distance` apart, sorted, plus line segments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionGraph {
    pairs: Vec<(usize, usize)>,
    segments: Vec<f32>,
    max_distance: f32,
}

impl ConnectionGraph {
    fn from_pairs(
        positions: &[Point3<f32>],
        pairs: Vec<(usize, usize)>,
        max_distance: f32,
    ) -> Self {
        let segments = pairs
            .iter()
            .flat_map(|(i, j)| {
                let (a, b) = (positions[*i], positions[*j]);
                [a.x, a.y, a.z, b.x, b.y, b.z]
            })
            .collect();

        ConnectionGraph {
            pairs,
            segments,
            max_distance,
        }
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    // Two xyz endpoints per pair
    pub fn segments(&self) -> &[f32] {
        &self.segments
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// Brute force O(N²) pair test. Fine for clouds in the low thousands, past
// that use `build_connections_indexed`.
pub fn build_connections(positions: &[Point3<f32>], max_distance: f32) -> ConnectionGraph {
    // NaN and negative thresholds connect nothing
    if !(max_distance >= 0.0) {
        return ConnectionGraph::from_pairs(positions, vec![], max_distance);
    }

    let max_squared = max_distance * max_distance;

    let pairs = (0..positions.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let a = positions[i];
            (i + 1..positions.len())
                .filter(move |j| distance_squared(&a, &positions[*j]) <= max_squared)
                .map(move |j| (i, j))
        })
        .collect();

    ConnectionGraph::from_pairs(positions, pairs, max_distance)
}

// Same pairs as `build_connections`, with the radius queries answered by a spatial index
pub fn build_connections_indexed<I>(
    positions: &[Point3<f32>],
    max_distance: f32,
    indexer: &mut I,
) -> ConnectionGraph
where
    I: SpatialIndexer<Point3<f32>> + Sync,
{
    if !(max_distance >= 0.0) {
        return ConnectionGraph::from_pairs(positions, vec![], max_distance);
    }

    indexer.reindex(positions, (0..positions.len()).collect());
    let indexer = &*indexer;

    let pairs = (0..positions.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let mut neighbours: Vec<usize> = indexer
                .get_indices_within(positions, positions[i], max_distance)
                .into_iter()
                .filter(|j| *j > i)
                .collect();
            neighbours.sort_unstable();

            neighbours.into_iter().map(move |j| (i, j))
        })
        .collect();

    ConnectionGraph::from_pairs(positions, pairs, max_distance)
}
