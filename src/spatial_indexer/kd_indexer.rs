use nalgebra::{distance_squared, Point3};

use crate::spatial_indexer::{Positioned, SpatialIndexer};

// KD_LEAF_SIZE controls the max size of leaf nodes
const KD_LEAF_SIZE: usize = 100;

#[derive(Debug, Copy, Clone)]
enum SplitAxis {
    X,
    Y,
    Z,
}

impl SplitAxis {
    fn next(&self) -> SplitAxis {
        match self {
            SplitAxis::X => SplitAxis::Y,
            SplitAxis::Y => SplitAxis::Z,
            SplitAxis::Z => SplitAxis::X,
        }
    }

    fn component(&self, v: &Point3<f32>) -> f32 {
        match self {
            SplitAxis::X => v.x,
            SplitAxis::Y => v.y,
            SplitAxis::Z => v.z,
        }
    }
}

#[derive(Debug)]
enum KdTree {
    Leaf(Vec<usize>),
    Node(KdNode),
}

// Items below the midpoint live on the right
#[derive(Debug)]
struct KdNode {
    axis: SplitAxis,
    midpoint: f32,

    right: Box<KdTree>,
    left: Box<KdTree>,
}

fn construct<P: Positioned>(items: &[P], indices: Vec<usize>, axis: SplitAxis) -> KdTree {
    if indices.len() < KD_LEAF_SIZE {
        return KdTree::Leaf(indices);
    }

    let (midpoint, left, right) = split(items, &indices, axis);

    // Every item on one side (duplicates, or all equal along this axis). Try the
    // other axes before settling for an oversized leaf
    if left.is_empty() || right.is_empty() {
        let (next, last) = (axis.next(), axis.next().next());
        for candidate in [next, last] {
            let (_, l, r) = split(items, &indices, candidate);
            if !l.is_empty() && !r.is_empty() {
                return construct(items, indices, candidate);
            }
        }

        return KdTree::Leaf(indices);
    }

    let (left_node, right_node) = (
        construct(items, left, axis.next()),
        construct(items, right, axis.next()),
    );

    KdTree::Node(KdNode {
        axis,
        midpoint,
        right: Box::new(right_node),
        left: Box::new(left_node),
    })
}

fn split<P: Positioned>(
    items: &[P],
    indices: &[usize],
    axis: SplitAxis,
) -> (f32, Vec<usize>, Vec<usize>) {
    let midpoint = indices
        .iter()
        .map(|i| axis.component(&items[*i].position()))
        .sum::<f32>()
        / (indices.len() as f32);

    let (right, left): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|i| axis.component(&items[**i].position()) < midpoint);

    (midpoint, left, right)
}

fn get_items_in_radius<P: Positioned>(
    items: &[P],
    tree: &KdTree,
    origin: Point3<f32>,
    radius: f32,
    found: &mut Vec<usize>,
) {
    match tree {
        KdTree::Leaf(l) => {
            for i in l {
                if distance_squared(&items[*i].position(), &origin) <= radius * radius {
                    found.push(*i)
                }
            }
        }
        KdTree::Node(n) => {
            let component = n.axis.component(&origin);

            if component + radius >= n.midpoint {
                get_items_in_radius(items, &n.left, origin, radius, found)
            }

            if component - radius < n.midpoint {
                get_items_in_radius(items, &n.right, origin, radius, found)
            }
        }
    }
}

// KdIndexer uses a KdTree to provide spatial indexing
#[derive(Debug)]
pub struct KdIndexer {
    root: KdTree,
}

impl Default for KdIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl KdIndexer {
    pub fn new() -> Self {
        KdIndexer {
            root: KdTree::Leaf(vec![]),
        }
    }

    pub fn from_items<P: Positioned>(items: &[P]) -> Self {
        let mut indexer = Self::new();
        indexer.reindex(items, (0..items.len()).collect());
        indexer
    }
}

impl<P: Positioned> SpatialIndexer<P> for KdIndexer {
    fn reindex(&mut self, items: &[P], indices: Vec<usize>) {
        self.root = construct(items, indices, SplitAxis::X)
    }

    fn get_indices_within(&self, items: &[P], origin: Point3<f32>, radius: f32) -> Vec<usize> {
        let mut indices = vec![];

        get_items_in_radius(items, &self.root, origin, radius, &mut indices);

        indices
    }
}
