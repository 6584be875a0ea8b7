//! # kdnn
//!
//! `kdnn` answers exact euclidean nearest neighbour queries over a large,
//! immutable set of reference points. A balanced k-d tree is built once with
//! randomized approximate-median pivots, then shared read-only by any number
//! of solvers running in parallel.
//!
//! ## Features
//!
//! - **Exact answers**: descend-then-backtrack search with hyperplane
//!   pruning never trades correctness for speed.
//! - **Near-linear construction**: pivots are approximated from a small
//!   random sample instead of an exact median select; builds are
//!   reproducible via a seeded generator.
//! - **Parallel batches**: [`NnOrchestrator`] splits a query batch across a
//!   fixed number of workers and reassembles results in input order, with
//!   cooperative cancellation through a [`CancelToken`].
//!
//! ## Main Interface
//!
//! Build a [`KdTree`] from points, query it through an [`NnSolver`], or fan
//! out whole batches with an [`NnOrchestrator`].

mod batch;
mod error;
mod point;
mod solver;
mod tree;

pub use batch::CancelToken;
pub use batch::NnOrchestrator;
pub use error::KdError;
pub use point::KdPoint;
pub use solver::NnSolver;
pub use tree::KdNode;
pub use tree::KdTree;
