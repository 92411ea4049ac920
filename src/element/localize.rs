use super::space::V3D;
use num_complex::Complex64;
use std::fmt;

/// Coordinates of a field point relative to an element's local frame
///
/// * `h`: distance from the element's plane, measured against the normal (`h = -z_local`)
/// * `z`: in-plane complex coordinate (`x_local + i y_local`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HZ {
    pub h: f64,
    pub z: Complex64,
}

impl HZ {
    pub fn from_local(local: V3D) -> Self {
        Self {
            h: -local.z(),
            z: Complex64::new(local.x(), local.y()),
        }
    }

    /// Whether the point lies in the element's plane
    pub fn is_in_plane(&self, tolerance: f64) -> bool {
        self.h.abs() <= tolerance
    }
}

impl fmt::Display for HZ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(h: {:.10}, z: {:.10})", self.h, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_triangles::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn vertices_localize_in_plane() {
        let t = tilted();
        let frame = t.frame().unwrap();
        let map = t.conformal_map().unwrap();

        let hz_0 = frame.localize(t.vertices[0]);
        assert_eq!(hz_0.z, Complex64::new(0.0, 0.0));
        assert_eq!(hz_0.h, 0.0);

        let hz_1 = frame.localize(t.vertices[1]);
        assert_abs_diff_eq!(hz_1.h, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!((hz_1.z - map.z1()).norm(), 0.0, epsilon = 1e-12);
        // the first edge lies along the local x axis
        assert_abs_diff_eq!(hz_1.z.im, 0.0, epsilon = 1e-12);

        let hz_2 = frame.localize(t.vertices[2]);
        assert!(hz_2.is_in_plane(1e-12));
        assert_abs_diff_eq!((hz_2.z - map.z2()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn height_is_measured_against_the_normal() {
        let t = unit_right();
        let hz = t.localize(V3D::from([0.25, 0.5, 2.0])).unwrap();
        assert_eq!(hz.h, -2.0);
        assert_eq!(hz.z, Complex64::new(0.25, 0.5));

        let t = tilted();
        let frame = t.frame().unwrap();
        let above = t.centroid() + frame.normal() * 0.75;
        let hz = frame.localize(above);
        assert_abs_diff_eq!(hz.h, -0.75, epsilon = 1e-12);
        assert_abs_diff_eq!((hz.z - frame.tau(t.centroid())).norm(), 0.0, epsilon = 1e-12);
    }
}
