use super::{
    localize::HZ,
    space::{M3D, V3D},
    ElementError, GeometryStage, Triangle, DEGENERACY_TOLERANCE, ORTHONORMALITY_TOLERANCE,
};
use num_complex::Complex64;

/// An element's local Cartesian coordinate system
///
/// * `origin`: the element's first vertex
/// * `rotation`: rows are e1 (along the first edge), e2 (in plane), and e3 (the element normal)
///
/// `rotation * (p - origin)` gives the local coordinates of a global point `p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFrame {
    pub origin: V3D,
    pub rotation: M3D,
}

impl LocalFrame {
    /// Build the frame of a triangle
    ///
    /// Returns an error if the first edge or the normal vanishes (coincident or colinear vertices)
    pub fn new(triangle: &Triangle) -> Result<Self, ElementError> {
        let [a1, a2] = triangle.edge_vectors();
        let scale = a1.norm().max(a2.norm());
        let min_norm = DEGENERACY_TOLERANCE * scale;

        let e1 = a1.normalize(min_norm).ok_or(ElementError::DegenerateElement {
            stage: GeometryStage::FirstEdge,
        })?;
        let e3 = e1
            .cross(&a2)
            .normalize(min_norm)
            .ok_or(ElementError::DegenerateElement {
                stage: GeometryStage::Normal,
            })?;
        // e3 and e1 are unit and orthogonal; normalizing again only removes round-off
        let e2 = e3
            .cross(&e1)
            .normalize(0.0)
            .ok_or(ElementError::DegenerateElement {
                stage: GeometryStage::Normal,
            })?;

        let frame = Self {
            origin: triangle.vertices[0],
            rotation: M3D::from_rows(e1, e2, e3),
        };

        warn_if_not_orthonormal(&frame.rotation, triangle);

        Ok(frame)
    }

    pub fn e1(&self) -> V3D {
        self.rotation.u
    }

    pub fn e2(&self) -> V3D {
        self.rotation.v
    }

    /// Unit normal of the element
    pub fn normal(&self) -> V3D {
        self.rotation.w
    }

    /// The transposed rotation: maps local coordinates back to global ones
    pub fn to_global_rotation(&self) -> M3D {
        self.rotation.transpose()
    }

    /// max |R Rᵀ - I|
    pub fn orthonormality_defect(&self) -> f64 {
        orthonormality_defect(&self.rotation)
    }

    /// Local coordinates of a global point
    pub fn point_to_local(&self, point: V3D) -> V3D {
        self.rotation * (point - self.origin)
    }

    /// Global coordinates of a local point
    pub fn point_to_global(&self, local: V3D) -> V3D {
        self.to_global_rotation() * local + self.origin
    }

    /// Rotate a (free) vector, such as a displacement discontinuity, into the local frame
    pub fn vector_to_local(&self, vector: V3D) -> V3D {
        self.rotation * vector
    }

    pub fn vector_to_global(&self, local: V3D) -> V3D {
        self.to_global_rotation() * local
    }

    /// Complex in-plane coordinate (x + iy) of a global point; the out-of-plane part is dropped
    pub fn tau(&self, point: V3D) -> Complex64 {
        let local = self.point_to_local(point);
        Complex64::new(local.x(), local.y())
    }

    /// Complex in-plane coordinates of the triangle's vertices: [0, z1, z2]
    pub fn vertex_tau(&self, triangle: &Triangle) -> [Complex64; 3] {
        triangle.vertices.map(|v| self.tau(v))
    }

    /// (h, z) coordinates of an arbitrary point (see [HZ])
    pub fn localize(&self, point: V3D) -> HZ {
        HZ::from_local(self.point_to_local(point))
    }
}

/// max |R Rᵀ - I|
pub fn orthonormality_defect(rotation: &M3D) -> f64 {
    (*rotation * rotation.transpose()).max_abs_diff(&M3D::identity())
}

/// Log a warning if `rotation` exceeds [ORTHONORMALITY_TOLERANCE]; returns whether it did
fn warn_if_not_orthonormal(rotation: &M3D, triangle: &Triangle) -> bool {
    let defect = orthonormality_defect(rotation);
    if defect > ORTHONORMALITY_TOLERANCE {
        log::warn!(
            "Local frame of {} deviates from orthonormality by {:.3e}; proceeding with it",
            triangle,
            defect
        );
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_triangles::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_right_frame_is_identity() {
        let frame = LocalFrame::new(&unit_right()).unwrap();
        assert_abs_diff_eq!(frame.rotation.max_abs_diff(&M3D::identity()), 0.0, epsilon = 1e-15);
        assert_eq!(frame.origin, V3D::zero());
    }

    #[test]
    fn frames_are_orthonormal_and_right_handed() {
        for t in [unit_right(), tilted(), skewed()] {
            let frame = t.frame().unwrap();
            assert!(frame.orthonormality_defect() < 1e-10);
            assert_abs_diff_eq!(frame.rotation.det(), 1.0, epsilon = 1e-10);
            assert_abs_diff_eq!(frame.e1().cross(&frame.e2()).dot_with(&frame.normal()), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn frame_axes_follow_vertices() {
        let t = tilted();
        let frame = t.frame().unwrap();
        let [a1, a2] = t.edge_vectors();

        // e1 along the first edge, normal perpendicular to both edges
        assert_abs_diff_eq!(frame.e1().dot_with(&a1), a1.norm(), epsilon = 1e-12);
        assert_abs_diff_eq!(frame.normal().dot_with(&a1), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(frame.normal().dot_with(&a2), 0.0, epsilon = 1e-12);

        // the third vertex lies on the positive e2 side
        assert!(frame.point_to_local(t.vertices[2]).y() > 0.0);
    }

    #[test]
    fn reversed_ordering_flips_normal() {
        let t = tilted();
        let r = Triangle::new([t.vertices[0], t.vertices[2], t.vertices[1]]);
        let n = t.frame().unwrap().normal();
        let n_r = r.frame().unwrap().normal();
        assert_abs_diff_eq!(n.dot_with(&n_r), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn local_global_round_trip() {
        let frame = tilted().frame().unwrap();
        let p = V3D::from([3.0, -2.0, 0.5]);
        let q = frame.point_to_global(frame.point_to_local(p));
        assert_abs_diff_eq!((p - q).norm(), 0.0, epsilon = 1e-12);

        let d = V3D::from([0.2, 0.1, -0.4]);
        let d_rt = frame.vector_to_global(frame.vector_to_local(d));
        assert_abs_diff_eq!((d - d_rt).norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn colinear_vertices_fail() {
        assert_eq!(
            LocalFrame::new(&colinear()),
            Err(ElementError::DegenerateElement {
                stage: GeometryStage::Normal
            })
        );

        let coincident = Triangle::from_coords([[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [0.0, 2.0, 0.0]]);
        assert_eq!(
            LocalFrame::new(&coincident),
            Err(ElementError::DegenerateElement {
                stage: GeometryStage::FirstEdge
            })
        );
    }

    #[test]
    fn perturbed_rotation_is_flagged() {
        let t = tilted();
        let frame = t.frame().unwrap();
        assert!(!warn_if_not_orthonormal(&frame.rotation, &t));

        let mut perturbed = frame.rotation;
        perturbed.u = perturbed.u * (1.0 + 1e-8);
        assert!(orthonormality_defect(&perturbed) > ORTHONORMALITY_TOLERANCE);
        assert!(warn_if_not_orthonormal(&perturbed, &t));

        // below the tolerance nothing is reported
        let mut within = frame.rotation;
        within.w = within.w * (1.0 + 1e-13);
        assert!(!warn_if_not_orthonormal(&within, &t));
    }

    #[test]
    #[should_panic]
    fn nearly_colinear_vertices_fail() {
        Triangle::from_coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 1e-14, 0.0]])
            .frame()
            .unwrap();
    }
}
