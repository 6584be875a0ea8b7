/// A single point in k-dimensional space.
///
/// Equality is by value: two points holding the same axis values compare
/// equal even when they are distinct instances. The solver's self-exclusion
/// rule instead relies on identity, i.e. the address of the slot owning the
/// point inside a [`crate::KdTree`].
#[derive(Clone, Debug, PartialEq)]
pub struct KdPoint {
    axis_values: Vec<f64>,
}

impl KdPoint {
    pub fn new(axis_values: Vec<f64>) -> Self {
        Self { axis_values }
    }

    /// Value on the axis with the provided index.
    ///
    /// Panics if `axis_index` is out of range for this point.
    pub fn axis_value(&self, axis_index: usize) -> f64 {
        self.axis_values[axis_index]
    }

    /// All axis values, in axis order.
    pub fn axis_values(&self) -> &[f64] {
        &self.axis_values
    }

    /// Number of dimensions this point spans.
    pub fn dimensions(&self) -> usize {
        self.axis_values.len()
    }

    /// Squared euclidean distance to the other point.
    ///
    /// The square root is never taken; only the relative ordering of
    /// distances matters for nearest neighbour searches.
    pub fn distance_squared(&self, other: &KdPoint) -> f64 {
        self.axis_values
            .iter()
            .zip(&other.axis_values)
            .map(|(a, b)| {
                let delta = a - b;
                delta * delta
            })
            .sum()
    }
}

impl From<Vec<f64>> for KdPoint {
    fn from(axis_values: Vec<f64>) -> Self {
        Self::new(axis_values)
    }
}
