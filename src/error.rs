use thiserror::Error;

/// Errors surfaced by tree construction and batch solving.
///
/// None of these are retried internally; each one is fatal to the operation
/// in progress and propagates to the caller unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum KdError {
    /// Tree construction requires at least one point.
    #[error("at least one point is required to build a tree")]
    InvalidPointCount,

    /// The first point's axis value count does not match the requested
    /// dimension count. Only the first point is checked.
    #[error("point dimensions do not match the tree dimension count")]
    InvalidPointDimensions,

    /// A batch call was cancelled while its workers were still running.
    /// Any partial worker results are discarded.
    #[error("batch solve was cancelled")]
    Cancelled,
}
