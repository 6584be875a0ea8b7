use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::KdError;
use crate::point::KdPoint;

/// Fraction of the current subset sampled to approximate the median during
/// construction. Sampling is with replacement, so a point may be drawn more
/// than once.
const MEDIAN_SAMPLE_FRACTION: f64 = 0.01;

/// Seed used by [`KdTree::build`]. Building twice from identical input
/// always yields an identical tree.
const DEFAULT_BUILD_SEED: u64 = 0;

/// Sentinel handle marking an absent parent or child.
pub(crate) const NO_NODE: u32 = u32::MAX;

/// One node of the tree, stored in a flat arena.
///
/// `parent`, `left` and `right` are handles (indices) into the owning tree's
/// node arena, with `u32::MAX` marking absence; `point` indexes the tree's
/// point arena. Handles replace back-pointers so the arena stays the sole
/// owner of every node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdNode {
    pub(crate) point: u32,
    pub(crate) depth: u32,
    pub(crate) axis: u32,
    pub(crate) parent: u32,
    pub(crate) left: u32,
    pub(crate) right: u32,
}

impl KdNode {
    /// Index of this node's point in [`KdTree::points`].
    pub fn point_index(&self) -> usize {
        self.point as usize
    }

    /// Depth of this node; the root sits at depth 0.
    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    /// Split axis of this node, always `depth % dimension_count`.
    pub fn axis(&self) -> usize {
        self.axis as usize
    }

    /// Handle of the parent node, if any.
    pub fn parent(&self) -> Option<u32> {
        (self.parent != NO_NODE).then_some(self.parent)
    }

    /// Handle of the left subtree root, if any.
    pub fn left(&self) -> Option<u32> {
        (self.left != NO_NODE).then_some(self.left)
    }

    /// Handle of the right subtree root, if any.
    pub fn right(&self) -> Option<u32> {
        (self.right != NO_NODE).then_some(self.right)
    }

    pub fn is_leaf(&self) -> bool {
        self.left == NO_NODE && self.right == NO_NODE
    }

    pub fn number_of_children(&self) -> usize {
        (self.left != NO_NODE) as usize + (self.right != NO_NODE) as usize
    }
}

/// An immutable k-d tree over an owned set of points.
///
/// The tree is built exactly once and never mutated afterwards, so any number
/// of solvers may traverse it concurrently without locking.
#[derive(Debug)]
pub struct KdTree {
    dimension_count: usize,
    points: Vec<KdPoint>,
    nodes: Vec<KdNode>,
}

impl KdTree {
    /// Builds a tree from the provided points with the default seed.
    ///
    /// Fails with [`KdError::InvalidPointCount`] if `points` is empty, and
    /// with [`KdError::InvalidPointDimensions`] if the first point's axis
    /// value count does not equal `dimension_count`.
    pub fn build(dimension_count: usize, points: Vec<KdPoint>) -> Result<Self, KdError> {
        Self::build_seeded(dimension_count, points, DEFAULT_BUILD_SEED)
    }

    /// Builds a tree using the provided seed for pivot sampling.
    ///
    /// The seed feeds a single generator threaded through the whole recursive
    /// construction, so identical input and seed reproduce the exact same
    /// arena layout.
    pub fn build_seeded(
        dimension_count: usize,
        points: Vec<KdPoint>,
        seed: u64,
    ) -> Result<Self, KdError> {
        if points.is_empty() {
            return Err(KdError::InvalidPointCount);
        }

        // Quick dimension check on the very first point only. All other
        // points are assumed to span the same number of axes; full
        // validation is traded away for build speed.
        if points[0].dimensions() != dimension_count {
            return Err(KdError::InvalidPointDimensions);
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let mut nodes = Vec::with_capacity(points.len());
        let point_ids: Vec<u32> = (0..points.len() as u32).collect();

        build_node(
            &mut nodes,
            &points,
            dimension_count,
            NO_NODE,
            point_ids,
            0,
            &mut rng,
        );

        Ok(KdTree {
            dimension_count,
            points,
            nodes,
        })
    }

    /// Number of dimensions this tree splits on.
    pub fn dimension_count(&self) -> usize {
        self.dimension_count
    }

    /// Split axis used at the provided depth.
    pub fn axis_for_depth(&self, depth: usize) -> usize {
        depth % self.dimension_count
    }

    /// The points owned by this tree, in the order they were provided.
    pub fn points(&self) -> &[KdPoint] {
        &self.points
    }

    /// Handle of the root node. The root is always created first, so its
    /// handle is stable across builds.
    pub fn root_handle(&self) -> u32 {
        0
    }

    /// Node behind the provided handle.
    ///
    /// Panics if the handle does not belong to this tree.
    pub fn node(&self, handle: u32) -> &KdNode {
        &self.nodes[handle as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }
}

/// Recursively builds the subtree covering `point_ids` and returns its root
/// handle, or [`NO_NODE`] for an empty subset.
fn build_node(
    nodes: &mut Vec<KdNode>,
    points: &[KdPoint],
    dimension_count: usize,
    parent: u32,
    point_ids: Vec<u32>,
    depth: u32,
    rng: &mut StdRng,
) -> u32 {
    if point_ids.is_empty() {
        return NO_NODE;
    }

    let axis = depth as usize % dimension_count;

    let pivot = approximate_median(points, &point_ids, axis, rng);
    let pivot_value = points[pivot as usize].axis_value(axis);

    let handle = nodes.len() as u32;
    nodes.push(KdNode {
        point: pivot,
        depth,
        axis: axis as u32,
        parent,
        left: NO_NODE,
        right: NO_NODE,
    });

    // Partition the remaining points around the pivot. The pivot itself is
    // excluded by identity (its arena index), never by value, so duplicate
    // valued points stay in. Ties on the split axis go left.
    let mut left_ids = Vec::with_capacity(point_ids.len() / 2);
    let mut right_ids = Vec::with_capacity(point_ids.len() / 2);

    for &point_id in &point_ids {
        if point_id == pivot {
            continue;
        }

        if points[point_id as usize].axis_value(axis) > pivot_value {
            right_ids.push(point_id);
        } else {
            left_ids.push(point_id);
        }
    }

    let left = build_node(nodes, points, dimension_count, handle, left_ids, depth + 1, rng);
    let right = build_node(nodes, points, dimension_count, handle, right_ids, depth + 1, rng);

    nodes[handle as usize].left = left;
    nodes[handle as usize].right = right;

    handle
}

/// Picks a point approximating the median of `point_ids` on the given axis.
///
/// Draws a small sample (1% of the subset, at least one point) uniformly with
/// replacement, sorts it by axis value and takes the lower-middle element.
/// This keeps pivot selection O(n) expected at the cost of only approximate
/// balance, a deliberate accuracy/speed trade-off.
fn approximate_median(points: &[KdPoint], point_ids: &[u32], axis: usize, rng: &mut StdRng) -> u32 {
    let sample_size = ((point_ids.len() as f64 * MEDIAN_SAMPLE_FRACTION).round() as usize).max(1);

    let mut sample: Vec<u32> = (0..sample_size)
        .map(|_| point_ids[rng.gen_range(0..point_ids.len())])
        .collect();

    sample.sort_unstable_by(|&a, &b| {
        let va = points[a as usize].axis_value(axis);
        let vb = points[b as usize].axis_value(axis);
        va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
    });

    sample[(sample.len() - 1) / 2]
}
