/// Geometry and quadratic basis of flat triangular boundary elements
pub mod element;
/// Triangulated surfaces, their topology, degrees of freedom and solution state
pub mod mesh;
/// Numerical parameters
pub mod config;
/// Dense linear solvers
pub mod linalg;

pub use config::NumParams;
pub use element::{
    basis::ElementBasis,
    collocation::CentroidOffset,
    conformal::ConformalMap,
    frame::LocalFrame,
    localize::HZ,
    shape_fns::{EdgePartition, ShapeFnMatrix, VertexWeights},
    shift::shift_matrix,
    space::{M3D, V3D},
    ElementError, Triangle,
};
pub use mesh::{
    dof::{ApproxOrder, DoF, DoFHandle, TipType},
    state::{MeshData, TipEdge},
    Mesh, MeshError,
};
