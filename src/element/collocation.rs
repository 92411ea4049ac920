use super::{shape_fns::EdgePartition, space::V3D, ElementError, Triangle};
use std::fmt;

/// Relative offset (β) of collocation points toward the element centroid
///
/// β = 0 puts the points on the nodes; β → 1 collapses them onto the centroid.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct CentroidOffset(f64);

/// Offset used when none is configured
pub const DEFAULT_OFFSET: CentroidOffset = CentroidOffset(0.125);

impl CentroidOffset {
    pub fn new(beta: f64) -> Result<Self, ElementError> {
        if beta.is_finite() && (0.0..1.0).contains(&beta) {
            Ok(Self(beta))
        } else {
            Err(ElementError::InvalidOffset(beta))
        }
    }

    /// Points exactly on the nodes
    pub const fn none() -> Self {
        Self(0.0)
    }

    pub const fn beta(&self) -> f64 {
        self.0
    }
}

impl Default for CentroidOffset {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for CentroidOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "β = {}", self.0)
    }
}

/// The 6 collocation points of a quadratic element
///
/// Points 0, 1, 2 belong to the vertices; point `n + 3` belongs to the edge opposite vertex `n`,
/// placed between the edge's vertices according to the partition.
/// Every point is then moved toward the centroid by `offset`.
pub fn collocation_points(
    triangle: &Triangle,
    partition: &EdgePartition,
    offset: CentroidOffset,
) -> [V3D; 6] {
    let beta = offset.beta();
    let centroid = triangle.centroid();
    let v = &triangle.vertices;
    let mut points = [V3D::zero(); 6];

    for n in 0..3 {
        let m = (n + 1) % 3;
        let l = (m + 1) % 3;

        let edge_node = match partition {
            EdgePartition::Uniform => (v[m] + v[l]) * 0.5,
            EdgePartition::NonUniform(w) => (v[m] * w[m] + v[l] * w[l]) / (w[m] + w[l]),
        };

        points[n] = v[n].lerp(&centroid, beta);
        points[n + 3] = edge_node.lerp(&centroid, beta);
    }

    points
}
