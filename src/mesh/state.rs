use super::{
    dof::{ApproxOrder, DoF, DoFHandle, TipType, DD_COMPONENTS, PP_COMPONENTS},
    EdgeMap, Mesh, MeshError,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// An edge of the crack front, seen from the active element it belongs to
///
/// `local_vertices` follow the element's orientation, so walking every tip edge from its first to
/// its second vertex traverses each front in a consistent direction. `prev` and `next` index the
/// neighboring tip edges along the front (`None` where no neighbor shares the vertex).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TipEdge {
    pub elem_id: usize,
    pub local_vertices: [usize; 2],
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl fmt::Display for TipEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let link = |l: Option<usize>| l.map_or_else(|| String::from("-"), |id| id.to_string());
        write!(
            f,
            "Elem {} [{} -> {}] (prev: {}, next: {})",
            self.elem_id,
            self.local_vertices[0],
            self.local_vertices[1],
            link(self.prev),
            link(self.next)
        )
    }
}

/// The solution state of a fault or fracture over a Mesh
///
/// Elements are "active" once they have slipped or opened and "filled" once fluid has reached them.
/// Displacement discontinuities (3 per node) and pressures (1 per node) are kept for every node of
/// every element; the DoF handles select the free ones.
#[derive(Clone, Debug)]
pub struct MeshData<'m> {
    mesh: &'m Mesh,
    order: ApproxOrder,
    tip_type: TipType,
    pub time: f64,
    active: BTreeSet<usize>,
    filled: BTreeSet<usize>,
    tips: Vec<TipEdge>,
    dof_dd: DoFHandle,
    dof_pp: DoFHandle,
    pub dd: Vec<[f64; DD_COMPONENTS]>,
    pub pp: Vec<f64>,
}

impl<'m> MeshData<'m> {
    /// State of an undisturbed fault at time 0: only the injection elements are active and filled
    pub fn pristine_fault(
        mesh: &'m Mesh,
        order: ApproxOrder,
        injection_elems: impl IntoIterator<Item = usize>,
    ) -> Result<Self, MeshError> {
        let num_nodes = mesh.num_elems() * order.nodes_per_elem();
        let mut data = Self {
            mesh,
            order,
            tip_type: TipType::default(),
            time: 0.0,
            active: BTreeSet::new(),
            filled: BTreeSet::new(),
            tips: Vec::new(),
            dof_dd: DoFHandle::free(0, order, DD_COMPONENTS)?,
            dof_pp: DoFHandle::free(0, order, PP_COMPONENTS)?,
            dd: vec![[0.0; DD_COMPONENTS]; num_nodes],
            pp: vec![0.0; num_nodes],
        };

        data.fill(injection_elems)?;
        data.rebuild(data.tip_type)?;

        Ok(data)
    }

    pub fn mesh(&self) -> &'m Mesh {
        self.mesh
    }

    pub fn order(&self) -> ApproxOrder {
        self.order
    }

    pub fn tip_type(&self) -> TipType {
        self.tip_type
    }

    pub fn active(&self) -> &BTreeSet<usize> {
        &self.active
    }

    pub fn filled(&self) -> &BTreeSet<usize> {
        &self.filled
    }

    pub fn tips(&self) -> &[TipEdge] {
        &self.tips
    }

    pub fn dof_dd(&self) -> &DoFHandle {
        &self.dof_dd
    }

    pub fn dof_pp(&self) -> &DoFHandle {
        &self.dof_pp
    }

    /// Index of an element's local node in `dd` and `pp`
    pub fn node_index(&self, elem_id: usize, node: usize) -> usize {
        elem_id * self.order.nodes_per_elem() + node
    }

    /// Mark elements as active (slipped or opened)
    ///
    /// The tip list and DoF handles are only updated by [`MeshData::rebuild`]
    pub fn activate(&mut self, elem_ids: impl IntoIterator<Item = usize>) -> Result<(), MeshError> {
        for elem_id in elem_ids {
            self.check_elem(elem_id)?;
            self.active.insert(elem_id);
        }
        Ok(())
    }

    /// Mark elements as filled with fluid (filled elements are also active)
    pub fn fill(&mut self, elem_ids: impl IntoIterator<Item = usize>) -> Result<(), MeshError> {
        for elem_id in elem_ids {
            self.check_elem(elem_id)?;
            self.active.insert(elem_id);
            self.filled.insert(elem_id);
        }
        Ok(())
    }

    fn check_elem(&self, elem_id: usize) -> Result<(), MeshError> {
        if elem_id < self.mesh.num_elems() {
            Ok(())
        } else {
            Err(MeshError::ElemDoesntExist(elem_id))
        }
    }

    pub fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }

    /// Recompute the crack front and both DoF handles from the current active and filled sets
    pub fn rebuild(&mut self, tip_type: TipType) -> Result<(), MeshError> {
        self.dof_dd = DoFHandle::for_active(self.mesh, &self.active, self.order, DD_COMPONENTS, tip_type)?;
        self.dof_pp = DoFHandle::for_active(self.mesh, &self.filled, self.order, PP_COMPONENTS, TipType::None)?;
        self.tip_type = tip_type;
        self.tips = tip_edges(self.mesh, &self.active);

        log::debug!(
            "Rebuilt mesh data at t = {}: {} active, {} filled, {} tip edges, {} + {} unknowns",
            self.time,
            self.active.len(),
            self.filled.len(),
            self.tips.len(),
            self.dof_dd.n_dof(),
            self.dof_pp.n_dof()
        );

        Ok(())
    }

    /// Number of unknowns in a gathered vector
    pub fn vector_len(&self, include_pp: bool) -> usize {
        self.dof_dd.n_dof() + if include_pp { self.dof_pp.n_dof() } else { 0 }
    }

    /// Gather the free DDs (and optionally pressures, after all DDs) into one vector
    pub fn dd_vector(&self, include_pp: bool) -> Vec<f64> {
        let mut v = vec![0.0; self.vector_len(include_pp)];

        for (elem_id, node, component, id) in self.dof_dd.free_dofs() {
            v[id] = self.dd[self.node_index(elem_id, node)][component];
        }
        if include_pp {
            let offset = self.dof_dd.n_dof();
            for (elem_id, node, _, id) in self.dof_pp.free_dofs() {
                v[offset + id] = self.pp[self.node_index(elem_id, node)];
            }
        }

        v
    }

    /// Scatter a vector laid out as in [`MeshData::dd_vector`] back onto the nodes
    ///
    /// Fixed unknowns are set to zero
    pub fn write_dd_vector(&mut self, v: &[f64], include_pp: bool) -> Result<(), MeshError> {
        let expected = self.vector_len(include_pp);
        if v.len() != expected {
            return Err(MeshError::LengthMismatch {
                expected,
                found: v.len(),
            });
        }

        for (idx, dof) in self.dof_dd.dofs().iter().enumerate() {
            self.dd[idx / DD_COMPONENTS][idx % DD_COMPONENTS] = match dof {
                DoF::Free(id) => v[*id],
                DoF::Fixed => 0.0,
            };
        }
        if include_pp {
            let offset = self.dof_dd.n_dof();
            for (node_idx, dof) in self.dof_pp.dofs().iter().enumerate() {
                self.pp[node_idx] = match dof {
                    DoF::Free(id) => v[offset + id],
                    DoF::Fixed => 0.0,
                };
            }
        }

        Ok(())
    }
}

/// The oriented boundary edges of the `active` elements, linked along the front
fn tip_edges(mesh: &Mesh, active: &BTreeSet<usize>) -> Vec<TipEdge> {
    let front = mesh.subset_edges(active);

    // tip edge ids keyed by (element, undirected edge)
    let mut tips = Vec::new();
    let mut tip_ids: BTreeMap<(usize, [usize; 2]), usize> = BTreeMap::new();
    for elem_id in active.iter().copied().filter(|id| *id < mesh.num_elems()) {
        let node_ids = mesh.connectivity[elem_id];
        for a in 0..3 {
            let b = (a + 1) % 3;
            let edge = super::sorted_pair(node_ids[a], node_ids[b]);
            if front.get(&edge).map_or(false, |adj_elems| adj_elems.len() == 1) {
                tip_ids.insert((elem_id, edge), tips.len());
                tips.push(TipEdge {
                    elem_id,
                    local_vertices: [a, b],
                    prev: None,
                    next: None,
                });
            }
        }
    }

    let successors: Vec<Option<usize>> = (0..tips.len())
        .map(|tip_id| successor(mesh, &front, &tip_ids, &tips, tip_id, active.len()))
        .collect();
    for (tip_id, next) in successors.into_iter().enumerate() {
        tips[tip_id].next = next;
        if let Some(next_id) = next {
            tips[next_id].prev = Some(tip_id);
        }
    }

    tips
}

/// The tip edge following tip `tip_id` along the front
///
/// Rotates about the tip's end node through the active elements, crossing interior edges, until
/// another front edge is reached. Elements touching only at that node are never linked.
fn successor(
    mesh: &Mesh,
    front: &EdgeMap,
    tip_ids: &BTreeMap<(usize, [usize; 2]), usize>,
    tips: &[TipEdge],
    tip_id: usize,
    max_steps: usize,
) -> Option<usize> {
    let tip = &tips[tip_id];
    let node_ids = mesh.connectivity[tip.elem_id];
    let pivot = node_ids[tip.local_vertices[1]];
    let mut elem_id = tip.elem_id;
    let mut from = node_ids[tip.local_vertices[0]];

    for _ in 0..max_steps {
        let node_ids = mesh.connectivity[elem_id];
        let to = *node_ids.iter().find(|n| **n != pivot && **n != from)?;
        let edge = super::sorted_pair(pivot, to);
        let adj_elems = front.get(&edge)?;

        match adj_elems.len() {
            1 => {
                // inconsistently oriented neighbors do not continue the front
                let next_id = *tip_ids.get(&(elem_id, edge))?;
                let next_start = node_ids[tips[next_id].local_vertices[0]];
                return if next_start == pivot { Some(next_id) } else { None };
            }
            2 => {
                elem_id = if adj_elems[0] == elem_id { adj_elems[1] } else { adj_elems[0] };
                from = to;
            }
            _ => return None,
        }
    }

    None
}
