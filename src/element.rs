/// 3D vectors and 3 by 3 matrices in Real Space
pub mod space;

/// The orthonormal frame attached to an element (origin at its first vertex)
///
/// The rotation is stored by rows (e1, e2, e3), so it maps global coordinates to local ones.
/// Every consumer of the rotation in this crate uses it in that direction.
pub mod frame;

/// The complex-valued map between an element's local plane and the master triangle
///
/// ```text
///     η
///     |
///   (0,1) 2
///     |   \
///     4    3
///     |      \
///   (0,0) 0--5--1 (1,0)   ξ
/// ```
/// Vertex nodes sit on the master triangle's corners; edge node `n + 3` sits on the edge opposite vertex `n`.
pub mod conformal;

/// Quadratic (6-node) shape function coefficients in the complex monomial basis [1, τ, τ̄, τ², τ̄², ττ̄]
pub mod shape_fns;

/// Translation of the quadratic monomial basis to an arbitrary complex origin
pub mod shift;

/// Collocation points (vertex + edge nodes, optionally pulled toward the centroid)
pub mod collocation;

/// Field point coordinates relative to an element
pub mod localize;

/// All of the local geometry of one element, computed once
pub mod basis;

use basis::ElementBasis;
use collocation::CentroidOffset;
use conformal::ConformalMap;
use frame::LocalFrame;
use localize::HZ;
use shape_fns::{EdgePartition, ShapeFnMatrix};
use space::V3D;

use std::fmt;
use thiserror::Error;

/// Relative size below which edge vectors, normals and determinants are treated as zero.
pub const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Maximum deviation of a local frame from orthonormality before a warning is logged.
pub const ORTHONORMALITY_TOLERANCE: f64 = 1e-10;

/// A flat triangular boundary element: an ordered triple of vertices in Real Space
///
/// The first vertex is the origin of the element's local coordinate system.
/// The vertex ordering determines the orientation of the local normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [V3D; 3],
}

impl Triangle {
    pub const fn new(vertices: [V3D; 3]) -> Self {
        Self { vertices }
    }

    pub fn from_coords(coords: [[f64; 3]; 3]) -> Self {
        Self {
            vertices: coords.map(V3D::from),
        }
    }

    pub fn centroid(&self) -> V3D {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// Edge vectors from the first vertex to the second and third
    pub fn edge_vectors(&self) -> [V3D; 2] {
        [
            self.vertices[1] - self.vertices[0],
            self.vertices[2] - self.vertices[0],
        ]
    }

    pub fn area(&self) -> f64 {
        let [a1, a2] = self.edge_vectors();
        a1.cross(&a2).norm() / 2.0
    }

    pub fn frame(&self) -> Result<LocalFrame, ElementError> {
        LocalFrame::new(self)
    }

    pub fn conformal_map(&self) -> Result<ConformalMap, ElementError> {
        ConformalMap::from_triangle(self)
    }

    pub fn shape_fn_matrix(&self, partition: &EdgePartition) -> Result<ShapeFnMatrix, ElementError> {
        ShapeFnMatrix::new(self, partition)
    }

    pub fn collocation_points(&self, partition: &EdgePartition, offset: CentroidOffset) -> [V3D; 6] {
        collocation::collocation_points(self, partition, offset)
    }

    /// Local (h, z) coordinates of an arbitrary point
    pub fn localize(&self, point: V3D) -> Result<HZ, ElementError> {
        Ok(self.frame()?.localize(point))
    }

    pub fn basis(&self, partition: &EdgePartition) -> Result<ElementBasis, ElementError> {
        ElementBasis::new(self, partition)
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Triangle [{} {} {}]",
            self.vertices[0], self.vertices[1], self.vertices[2]
        )
    }
}

/// The step of the local geometry computation which found a degenerate element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryStage {
    /// first edge has (near) zero length
    FirstEdge,
    /// the normal vector has (near) zero length
    Normal,
    /// the conformal map's determinant is (near) zero
    Determinant,
}

impl fmt::Display for GeometryStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FirstEdge => write!(f, "first edge"),
            Self::Normal => write!(f, "normal"),
            Self::Determinant => write!(f, "conformal map determinant"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ElementError {
    #[error("Element is degenerate (vanishing {stage}); Cannot compute local geometry!")]
    DegenerateElement { stage: GeometryStage },
    #[error("Vertex weight {vertex} is {weight}; Edge partition weights must be positive and finite!")]
    InvalidWeight { vertex: usize, weight: f64 },
    #[error("Centroid offset {0} is outside [0, 1); Cannot place collocation points!")]
    InvalidOffset(f64),
}

#[cfg(test)]
pub(crate) mod test_triangles {
    use super::Triangle;

    /// right isosceles triangle in the XY plane
    pub fn unit_right() -> Triangle {
        Triangle::from_coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }

    /// generic triangle, tilted out of every coordinate plane
    pub fn tilted() -> Triangle {
        Triangle::from_coords([[0.1, -0.3, 0.7], [1.9, 0.4, 0.2], [0.6, 1.7, 1.3]])
    }

    /// flat element with no edge along a coordinate axis
    pub fn skewed() -> Triangle {
        Triangle::from_coords([[0.0, 0.1, 0.0], [1.8, 0.0, 0.0], [1.2, 1.8, 0.0]])
    }

    pub fn colinear() -> Triangle {
        Triangle::from_coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]])
    }
}

#[cfg(test)]
mod tests {
    use super::test_triangles::*;
    use super::*;

    #[test]
    fn triangle_measures() {
        let t = unit_right();
        assert!((t.area() - 0.5).abs() < 1e-15);
        let c = t.centroid();
        assert!((c.x() - 1.0 / 3.0).abs() < 1e-15);
        assert!((c.y() - 1.0 / 3.0).abs() < 1e-15);
        assert_eq!(colinear().area(), 0.0);
    }

    #[test]
    fn degenerate_triangle_has_no_geometry() {
        let t = colinear();
        assert!(matches!(
            t.frame(),
            Err(ElementError::DegenerateElement { .. })
        ));
        assert!(matches!(
            t.conformal_map(),
            Err(ElementError::DegenerateElement { .. })
        ));
        assert!(t.shape_fn_matrix(&EdgePartition::Uniform).is_err());
        assert!(t.localize(V3D::zero()).is_err());
    }

    #[test]
    fn error_messages() {
        let e = ElementError::DegenerateElement {
            stage: GeometryStage::Normal,
        };
        assert_eq!(
            e.to_string(),
            "Element is degenerate (vanishing normal); Cannot compute local geometry!"
        );
    }
}
