use crate::point::KdPoint;
use crate::tree::{KdTree, NO_NODE};

/// Answers exact nearest neighbour queries against one tree.
///
/// The solver is bound to its tree for its whole lifetime and keeps no state
/// between calls; every query runs an independent descend/unwind pass.
pub struct NnSolver<'t> {
    tree: &'t KdTree,
}

impl<'t> NnSolver<'t> {
    pub fn new(tree: &'t KdTree) -> Self {
        Self { tree }
    }

    /// Returns the tree point nearest to the provided target, or `None` if
    /// no valid candidate exists.
    ///
    /// The target's own slot is excluded by identity: passing a reference to
    /// a point owned by the tree asks for the nearest *other* point, while a
    /// coordinate-equal but separately constructed target may legitimately
    /// receive a zero-distance answer.
    pub fn find_nearest(&self, target: &KdPoint) -> Option<&'t KdPoint> {
        if self.tree.nodes().is_empty() {
            return None;
        }

        let mut search = Search {
            tree: self.tree,
            target,
            best: None,
            best_distance_squared: f64::INFINITY,
        };

        search.solve(self.tree.root_handle());

        search.best.map(|id| &self.tree.points()[id as usize])
    }
}

/// Accumulator state for a single query.
struct Search<'t, 'q> {
    tree: &'t KdTree,
    target: &'q KdPoint,
    /// Point arena index of the best candidate so far.
    best: Option<u32>,
    best_distance_squared: f64,
}

impl Search<'_, '_> {
    /// Full solve pass over the subtree rooted at `node`: descend to a leaf,
    /// take it as a candidate, then unwind back up checking ancestors and
    /// pruned siblings.
    fn solve(&mut self, node: u32) {
        let leaf = self.find_leaf(node);

        self.update_best(self.tree.nodes()[leaf as usize].point);

        self.unwind(leaf, node);
    }

    /// Walks down from `node` to a leaf, guided by axis value comparisons.
    /// Ties go left, consistent with construction; a single-child node is
    /// always entered through that child.
    fn find_leaf(&self, node: u32) -> u32 {
        let n = self.tree.nodes()[node as usize];

        match n.number_of_children() {
            0 => node,
            1 => {
                let child = if n.left != NO_NODE { n.left } else { n.right };
                self.find_leaf(child)
            }
            _ => {
                let axis = n.axis();
                let node_value = self.tree.points()[n.point_index()].axis_value(axis);

                if self.target.axis_value(axis) > node_value {
                    self.find_leaf(n.right)
                } else {
                    self.find_leaf(n.left)
                }
            }
        }
    }

    /// Takes the point behind `point_id` as a candidate, unless it is the
    /// target's own slot or not strictly closer than the current best.
    /// Strict comparison keeps the first-found point on equal distances.
    fn update_best(&mut self, point_id: u32) {
        let candidate = &self.tree.points()[point_id as usize];

        if std::ptr::eq(candidate, self.target) {
            return;
        }

        let distance_squared = candidate.distance_squared(self.target);

        if distance_squared < self.best_distance_squared {
            self.best = Some(point_id);
            self.best_distance_squared = distance_squared;
        }
    }

    /// Moves from `leaf` back up to `top` (the root of the current solve
    /// call), checking every ancestor on the way and descending into the
    /// untraversed sibling whenever the splitting hyperplane lies closer
    /// than the current best.
    fn unwind(&mut self, leaf: u32, top: u32) {
        let stop = self.tree.nodes()[top as usize].parent;

        let mut working = leaf;

        while self.tree.nodes()[working as usize].parent != stop {
            let parent_handle = self.tree.nodes()[working as usize].parent;
            let parent = self.tree.nodes()[parent_handle as usize];

            self.update_best(parent.point);

            // Squared perpendicular distance from the target to the parent's
            // splitting hyperplane. The axis alignment reduces the
            // sphere/plane intersection test to a value comparison.
            let axis = parent.axis();
            let delta = self.tree.points()[parent.point_index()].axis_value(axis)
                - self.target.axis_value(axis);
            let hyperplane_distance_squared = delta * delta;

            if hyperplane_distance_squared < self.best_distance_squared
                && parent.number_of_children() == 2
            {
                // The other side of the hyperplane may hold a closer point.
                // Run the full solve pass on whichever child we did not just
                // come up from.
                let sibling = if parent.left == working {
                    parent.right
                } else {
                    parent.left
                };

                self.solve(sibling);
            }

            working = parent_handle;
        }
    }
}
