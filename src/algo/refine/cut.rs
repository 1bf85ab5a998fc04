//! Cut-edge planning.
//!
//! Every selected element asks for its longest edge(s) to be bisected. Edges
//! are recorded once in a mesh-wide set keyed by `(min node, max node)`, so two
//! elements sharing an edge see the same cut and no crack opens between them.

use std::collections::HashSet;

use crate::error::{RefineError, Result};
use crate::mesh::{BoundarySurface, TetMesh, TET_EDGES};

use super::cases::edge_bit;
use super::geometry::{edge_lengths, longest_edge_indices};

/// Set of mesh edges to bisect in one iteration.
///
/// Keys are normalised so the first node index is the smaller one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutEdgeSet {
    num_nodes: usize,
    edges: HashSet<(usize, usize)>,
}

impl CutEdgeSet {
    /// Empty set for a mesh with `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            edges: HashSet::new(),
        }
    }

    /// Number of nodes of the mesh the set was planned on.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Mark the edge between `a` and `b`. Returns `false` if already marked.
    pub fn insert(&mut self, a: usize, b: usize) -> bool {
        self.edges.insert((a.min(b), a.max(b)))
    }

    /// Whether the edge between `a` and `b` is marked, in either order.
    #[inline]
    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.edges.contains(&(a.min(b), a.max(b)))
    }

    /// Number of marked edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if no edge is marked.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Marked edges as `(min, max)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    /// 6-bit case code of an element: bit `5 - k` is set when edge `k` is cut.
    pub fn case_code(&self, nodes: [usize; 4]) -> usize {
        let mut code = 0;
        for (k, &(a, b)) in TET_EDGES.iter().enumerate() {
            if self.contains(nodes[a], nodes[b]) {
                code |= edge_bit(k) as usize;
            }
        }
        code
    }
}

/// Record the longest edge(s) of every element in `elems_to_split`.
///
/// With a `boundary`, elements having any corner on the boundary surface are
/// skipped entirely.
///
/// # Errors
/// - Any [`TetMesh::validate`] error
/// - [`RefineError::InvalidParameter`] if an entry of `elems_to_split` is not
///   an element of `mesh`
/// - [`RefineError::NoLongestEdge`] if an element has no positive longest edge
pub fn plan_cut_edges(
    mesh: &TetMesh,
    elems_to_split: &[usize],
    boundary: Option<&BoundarySurface>,
) -> Result<CutEdgeSet> {
    mesh.validate()?;
    if let Some(&ei) = elems_to_split.iter().find(|&&ei| ei >= mesh.num_elems()) {
        return Err(RefineError::invalid_param(
            "elems_to_split",
            ei,
            "element index out of range",
        ));
    }

    let mut cut = CutEdgeSet::new(mesh.num_nodes());
    let mut skipped = 0usize;

    for &ei in elems_to_split {
        let nodes = mesh.elem(ei);
        let points = mesh.elem_points(ei);

        if let Some(surface) = boundary {
            if points.iter().any(|p| surface.touches(p)) {
                skipped += 1;
                continue;
            }
        }

        let longest = longest_edge_indices(&edge_lengths(&points))?;
        if longest.is_empty() {
            return Err(RefineError::NoLongestEdge { elem: ei });
        }

        for k in longest {
            let (a, b) = TET_EDGES[k];
            cut.insert(nodes[a], nodes[b]);
        }
    }

    if skipped > 0 {
        log::debug!("{} selected elements touch the boundary and were skipped", skipped);
    }

    Ok(cut)
}
