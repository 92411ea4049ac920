use super::{Mesh, MeshError, EDGE_IDX_DEFS};
use std::collections::BTreeSet;
use std::fmt;

/// Number of displacement discontinuity components per node (opening and two shear components)
pub const DD_COMPONENTS: usize = 3;

/// Number of fluid pressure components per node
pub const PP_COMPONENTS: usize = 1;

/// A single nodal unknown: either numbered in the global system or eliminated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoF {
    Free(usize),
    Fixed,
}

impl DoF {
    pub fn free_id(&self) -> Option<usize> {
        match self {
            Self::Free(id) => Some(*id),
            Self::Fixed => None,
        }
    }
}

impl fmt::Display for DoF {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Free(id) => write!(f, "{}", id),
            Self::Fixed => write!(f, "-"),
        }
    }
}

/// Which nodes on the crack front have their unknowns fixed (zero DD at the tip)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TipType {
    /// nothing is fixed
    None,
    /// vertex nodes lying on the front
    VertexNodes,
    /// vertex nodes lying on the front and edge nodes on front edges
    AllNodes,
}

impl Default for TipType {
    fn default() -> Self {
        Self::VertexNodes
    }
}

/// Polynomial order of the unknowns over each element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproxOrder {
    /// 1 node at the centroid
    Constant,
    /// 3 vertex nodes
    Linear,
    /// 3 vertex nodes and 3 edge nodes
    Quadratic,
}

impl ApproxOrder {
    pub fn nodes_per_elem(&self) -> usize {
        match self {
            Self::Constant => 1,
            Self::Linear => 3,
            Self::Quadratic => 6,
        }
    }

    /// Construct from the polynomial degree (0, 1 or 2)
    pub fn from_degree(degree: u8) -> Option<Self> {
        match degree {
            0 => Some(Self::Constant),
            1 => Some(Self::Linear),
            2 => Some(Self::Quadratic),
            _ => None,
        }
    }

    pub fn degree(&self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::Linear => 1,
            Self::Quadratic => 2,
        }
    }
}

impl Default for ApproxOrder {
    fn default() -> Self {
        Self::Quadratic
    }
}

/// Global numbering of the unknowns of every element
///
/// Each element carries `nodes_per_elem * components` unknowns, stored node-major:
/// local DoF `node * components + component`.
#[derive(Clone, Debug, PartialEq)]
pub struct DoFHandle {
    dofs: Vec<DoF>,
    nodes_per_elem: usize,
    components: usize,
    n_dof: usize,
}

impl DoFHandle {
    /// Every unknown of every element is free
    pub fn free(num_elems: usize, order: ApproxOrder, components: usize) -> Result<Self, MeshError> {
        Self::numbered(num_elems, order, components, |_, _| false)
    }

    /// Unknowns of an isolated crack covering the whole Mesh
    ///
    /// The crack front is the boundary of the Mesh; nodes on it are fixed according to `tip`.
    pub fn crack(
        mesh: &Mesh,
        order: ApproxOrder,
        components: usize,
        tip: TipType,
    ) -> Result<Self, MeshError> {
        let all: BTreeSet<usize> = (0..mesh.num_elems()).collect();
        Self::for_active(mesh, &all, order, components, tip)
    }

    /// Unknowns of a crack made of the `active` elements
    ///
    /// Elements outside the active set are fully fixed; the front is the boundary of the active set.
    pub fn for_active(
        mesh: &Mesh,
        active: &BTreeSet<usize>,
        order: ApproxOrder,
        components: usize,
        tip: TipType,
    ) -> Result<Self, MeshError> {
        let front_edges: BTreeSet<[usize; 2]> =
            mesh.subset_boundary_edges(active).into_iter().collect();
        let front_nodes: BTreeSet<usize> = front_edges.iter().flatten().copied().collect();

        let handle = Self::numbered(mesh.num_elems(), order, components, |elem_id, node| {
            if !active.contains(&elem_id) {
                return true;
            }
            let node_ids = mesh.connectivity[elem_id];
            match (tip, order, node) {
                (TipType::None, _, _) | (_, ApproxOrder::Constant, _) => false,
                (_, _, 0..=2) => front_nodes.contains(&node_ids[node]),
                (TipType::AllNodes, ApproxOrder::Quadratic, _) => {
                    let [a, b] = EDGE_IDX_DEFS[node - 3];
                    front_edges.contains(&super::sorted_pair(node_ids[a], node_ids[b]))
                }
                _ => false,
            }
        })?;

        log::debug!(
            "DoF handle: {} of {} unknowns free over {} active elements ({} front edges)",
            handle.n_dof,
            handle.dofs.len(),
            active.len(),
            front_edges.len()
        );

        Ok(handle)
    }

    /// Number the unknowns consecutively in (element, node, component) order, skipping fixed nodes
    fn numbered(
        num_elems: usize,
        order: ApproxOrder,
        components: usize,
        is_fixed: impl Fn(usize, usize) -> bool,
    ) -> Result<Self, MeshError> {
        check_components(components)?;
        let nodes_per_elem = order.nodes_per_elem();
        let mut dofs = Vec::with_capacity(num_elems * nodes_per_elem * components);
        let mut n_dof = 0;

        for elem_id in 0..num_elems {
            for node in 0..nodes_per_elem {
                let fixed = is_fixed(elem_id, node);
                for _ in 0..components {
                    if fixed {
                        dofs.push(DoF::Fixed);
                    } else {
                        dofs.push(DoF::Free(n_dof));
                        n_dof += 1;
                    }
                }
            }
        }

        Ok(Self {
            dofs,
            nodes_per_elem,
            components,
            n_dof,
        })
    }

    /// Build a handle from an existing numbering
    ///
    /// `dofs` holds the unknowns of every element in order. The free ids must be exactly `0..n_dof`
    /// with no repeats.
    pub fn from_raw(dofs: Vec<DoF>, order: ApproxOrder, components: usize) -> Result<Self, MeshError> {
        check_components(components)?;
        let nodes_per_elem = order.nodes_per_elem();
        let dofs_per_elem = nodes_per_elem * components;
        if dofs.len() % dofs_per_elem != 0 {
            return Err(MeshError::InvalidDoFHandle(format!(
                "{} entries cannot be split into elements of {} unknowns",
                dofs.len(),
                dofs_per_elem
            )));
        }

        let free_ids: Vec<usize> = dofs.iter().filter_map(|dof| dof.free_id()).collect();
        let n_dof = free_ids.len();
        let mut seen = vec![false; n_dof];
        for id in free_ids {
            match seen.get_mut(id) {
                Some(seen_id) if !*seen_id => *seen_id = true,
                Some(_) => {
                    return Err(MeshError::InvalidDoFHandle(format!(
                        "global id {} is repeated",
                        id
                    )))
                }
                None => {
                    return Err(MeshError::InvalidDoFHandle(format!(
                        "global id {} is out of range for {} free unknowns",
                        id, n_dof
                    )))
                }
            }
        }

        Ok(Self {
            dofs,
            nodes_per_elem,
            components,
            n_dof,
        })
    }

    /// Number of free (global) unknowns
    pub fn n_dof(&self) -> usize {
        self.n_dof
    }

    pub fn num_elems(&self) -> usize {
        self.dofs.len() / self.dofs_per_elem()
    }

    pub fn nodes_per_elem(&self) -> usize {
        self.nodes_per_elem
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn dofs_per_elem(&self) -> usize {
        self.nodes_per_elem * self.components
    }

    /// The unknowns of every element, in (element, node, component) order
    pub fn dofs(&self) -> &[DoF] {
        &self.dofs
    }

    /// The unknown of `component` at local `node` of an element
    pub fn get(&self, elem_id: usize, node: usize, component: usize) -> Option<DoF> {
        if node >= self.nodes_per_elem || component >= self.components {
            return None;
        }
        self.dofs
            .get(elem_id * self.dofs_per_elem() + node * self.components + component)
            .copied()
    }

    /// All unknowns of an element
    pub fn elem_dofs(&self, elem_id: usize) -> Option<&[DoF]> {
        let dpe = self.dofs_per_elem();
        self.dofs.get(elem_id * dpe..(elem_id + 1) * dpe)
    }

    /// Iterate over `(elem_id, node, component, global id)` of every free unknown
    pub fn free_dofs(&self) -> impl Iterator<Item = (usize, usize, usize, usize)> + '_ {
        let dpe = self.dofs_per_elem();
        self.dofs.iter().enumerate().filter_map(move |(idx, dof)| {
            dof.free_id().map(|id| {
                let local = idx % dpe;
                (idx / dpe, local / self.components, local % self.components, id)
            })
        })
    }
}

fn check_components(components: usize) -> Result<(), MeshError> {
    if components == 0 {
        Err(MeshError::InvalidDoFHandle(String::from(
            "every node needs at least one component",
        )))
    } else {
        Ok(())
    }
}

impl fmt::Display for DoFHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "DoF handle ({} free unknowns)", self.n_dof)?;
        for (elem_id, elem_dofs) in self.dofs.chunks(self.dofs_per_elem()).enumerate() {
            write!(f, "{}:", elem_id)?;
            for dof in elem_dofs {
                write!(f, " {}", dof)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
