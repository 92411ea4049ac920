/// Degrees of Freedom: global numbering of each element's nodal unknowns
pub mod dof;
/// The evolving state of a simulation over a Mesh (active elements, crack front, unknowns)
pub mod state;

use crate::element::{
    basis::ElementBasis,
    collocation::CentroidOffset,
    shape_fns::EdgePartition,
    space::V3D,
    ElementError, Triangle,
};

use rayon::prelude::*;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Undirected edges (sorted node pairs) mapped to the ids of their adjacent elements
///
/// A manifold surface has 1 or 2 elements per edge, so the adjacency lists usually stay on the stack.
pub type EdgeMap = BTreeMap<[usize; 2], SmallVec<[usize; 2]>>;

/// Local vertex pairs of the edges of a triangle; edge `n` is opposite vertex `n`
pub const EDGE_IDX_DEFS: [[usize; 2]; 3] = [[1, 2], [2, 0], [0, 1]];

/// A triangulated surface in Real Space
///
/// * `nodes`: node positions
/// * `connectivity`: the 3 node ids of each element (in order; the first is the element's local origin)
///
/// Elements may share nodes freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    nodes: Vec<V3D>,
    connectivity: Vec<[usize; 3]>,
}

impl Mesh {
    /// Build a Mesh, checking that every connectivity entry refers to an existing node
    pub fn new(nodes: Vec<V3D>, connectivity: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        for (elem_id, node_ids) in connectivity.iter().enumerate() {
            if let Some(node_id) = node_ids.iter().find(|id| **id >= nodes.len()) {
                return Err(MeshError::InvalidNodeIndex {
                    elem_id,
                    node_id: *node_id,
                    num_nodes: nodes.len(),
                });
            }
        }

        Ok(Self {
            nodes,
            connectivity,
        })
    }

    pub fn from_coords(coords: &[[f64; 3]], connectivity: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        Self::new(coords.iter().map(|c| V3D::from(*c)).collect(), connectivity)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_elems(&self) -> usize {
        self.connectivity.len()
    }

    pub fn nodes(&self) -> &[V3D] {
        &self.nodes
    }

    pub fn connectivity(&self) -> &[[usize; 3]] {
        &self.connectivity
    }

    /// The node ids of an element
    pub fn elem_nodes(&self, elem_id: usize) -> Result<[usize; 3], MeshError> {
        self.connectivity
            .get(elem_id)
            .copied()
            .ok_or(MeshError::ElemDoesntExist(elem_id))
    }

    /// The geometry of an element
    pub fn element(&self, elem_id: usize) -> Result<Triangle, MeshError> {
        let node_ids = self.elem_nodes(elem_id)?;
        Ok(self.triangle(node_ids))
    }

    /// Iterate over the geometry of all elements
    pub fn elements(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.connectivity.iter().map(|node_ids| self.triangle(*node_ids))
    }

    fn triangle(&self, node_ids: [usize; 3]) -> Triangle {
        Triangle::new(node_ids.map(|id| self.nodes[id]))
    }

    /// All edges of the mesh with their adjacent elements
    pub fn edges(&self) -> EdgeMap {
        self.edges_of(0..self.num_elems())
    }

    /// Edges of a subset of the elements, with adjacency restricted to that subset
    pub fn subset_edges(&self, subset: &BTreeSet<usize>) -> EdgeMap {
        self.edges_of(subset.iter().copied().filter(|id| *id < self.num_elems()))
    }

    fn edges_of(&self, elem_ids: impl Iterator<Item = usize>) -> EdgeMap {
        let mut edges = EdgeMap::new();
        for elem_id in elem_ids {
            let node_ids = self.connectivity[elem_id];
            for [a, b] in EDGE_IDX_DEFS {
                edges
                    .entry(sorted_pair(node_ids[a], node_ids[b]))
                    .or_default()
                    .push(elem_id);
            }
        }
        edges
    }

    /// Edges with exactly one adjacent element
    pub fn boundary_edges(&self) -> Vec<[usize; 2]> {
        boundary_of(&self.edges())
    }

    /// Edges with exactly one adjacent element from `subset`
    pub fn subset_boundary_edges(&self, subset: &BTreeSet<usize>) -> Vec<[usize; 2]> {
        boundary_of(&self.subset_edges(subset))
    }

    /// Nodes touching a boundary edge
    pub fn boundary_nodes(&self) -> BTreeSet<usize> {
        self.boundary_edges().into_iter().flatten().collect()
    }

    pub fn subset_boundary_nodes(&self, subset: &BTreeSet<usize>) -> BTreeSet<usize> {
        self.subset_boundary_edges(subset).into_iter().flatten().collect()
    }

    /// Compute the local geometry and shape functions of every element (in parallel)
    ///
    /// Fails on the first degenerate element encountered
    pub fn element_bases(&self, partition: &EdgePartition) -> Result<Vec<ElementBasis>, MeshError> {
        log::debug!(
            "Computing {} element bases with {} edge partitioning",
            self.num_elems(),
            partition
        );

        self.connectivity
            .par_iter()
            .enumerate()
            .map(|(elem_id, node_ids)| {
                self.triangle(*node_ids)
                    .basis(partition)
                    .map_err(|source| MeshError::ElementGeometry { elem_id, source })
            })
            .collect()
    }

    /// The 6 collocation points of every element, in element order
    pub fn collocation_points(&self, partition: &EdgePartition, offset: CentroidOffset) -> Vec<V3D> {
        self.elements()
            .flat_map(|triangle| triangle.collocation_points(partition, offset))
            .collect()
    }
}

pub(crate) fn sorted_pair(a: usize, b: usize) -> [usize; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}

fn boundary_of(edges: &EdgeMap) -> Vec<[usize; 2]> {
    edges
        .iter()
        .filter(|(_, adj_elems)| adj_elems.len() == 1)
        .map(|(node_ids, _)| *node_ids)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("Element {elem_id} references node {node_id}, but the Mesh only has {num_nodes} nodes!")]
    InvalidNodeIndex {
        elem_id: usize,
        node_id: usize,
        num_nodes: usize,
    },
    #[error("Element {0} does not exist!")]
    ElemDoesntExist(usize),
    #[error("Invalid DoF handle: {0}")]
    InvalidDoFHandle(String),
    #[error("Vector has length {found}; expected {expected}!")]
    LengthMismatch { expected: usize, found: usize },
    #[error("Element {elem_id}: {source}")]
    ElementGeometry {
        elem_id: usize,
        #[source]
        source: ElementError,
    },
}

#[cfg(test)]
pub(crate) mod test_meshes {
    use super::Mesh;

    /// Hexagon around the origin in the XY plane, split into 6 elements sharing node 0
    pub fn hexagon() -> Mesh {
        let mut coords = vec![[0.0, 0.0, 0.0]];
        for k in 0..6 {
            let angle = std::f64::consts::PI / 3.0 * k as f64;
            coords.push([angle.cos(), angle.sin(), 0.0]);
        }
        let connectivity = (0..6).map(|k| [0, k + 1, (k + 1) % 6 + 1]).collect();
        Mesh::from_coords(&coords, connectivity).unwrap()
    }

    /// Two elements sharing the edge (1, 2), folded about it
    pub fn folded_pair() -> Mesh {
        Mesh::from_coords(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.5],
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap()
    }
}
