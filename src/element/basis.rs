use super::{
    conformal::ConformalMap,
    frame::LocalFrame,
    localize::HZ,
    shape_fns::{EdgePartition, ShapeFnMatrix},
    space::V3D,
    ElementError, Triangle,
};
use nalgebra::Matrix6;
use num_complex::Complex64;

/// The local geometry of one element: frame, conformal map, vertex coordinates and shape functions
///
/// This is everything kernel integration needs from an element, so it is computed once per element
/// and shared between all of the element's pairings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementBasis {
    pub triangle: Triangle,
    pub frame: LocalFrame,
    pub map: ConformalMap,
    pub sfm: ShapeFnMatrix,
}

impl ElementBasis {
    pub fn new(triangle: &Triangle, partition: &EdgePartition) -> Result<Self, ElementError> {
        let frame = LocalFrame::new(triangle)?;
        let map = ConformalMap::new(triangle, &frame)?;
        let sfm = ShapeFnMatrix::from_map(&map, partition);

        Ok(Self {
            triangle: *triangle,
            frame,
            map,
            sfm,
        })
    }

    /// Complex local coordinates of the vertices: [0, z1, z2]
    pub fn vertex_tau(&self) -> [Complex64; 3] {
        self.map.vertex_tau()
    }

    pub fn localize(&self, point: V3D) -> HZ {
        self.frame.localize(point)
    }

    /// Field point coordinates and the shape functions re-centered at that point
    pub fn relative_to(&self, point: V3D) -> (HZ, Matrix6<Complex64>) {
        let hz = self.localize(point);
        (hz, self.sfm.shifted(hz.z))
    }
}
