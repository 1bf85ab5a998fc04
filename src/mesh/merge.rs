//! Node and element merging ("join").
//!
//! Local refinement synthesizes the midpoint of a shared edge once per
//! adjacent element, so a freshly subdivided mesh contains coincident nodes.
//! [`join`] welds nodes closer than a tolerance, renumbers nodes by first
//! reference, and drops elements that repeat an already emitted node set.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use super::tetmesh::TetMesh;
use crate::error::{RefineError, Result};

/// Default welding tolerance for coincident nodes.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-6;

/// Statistics from a [`join`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Nodes welded onto an earlier coincident node.
    pub merged_nodes: usize,
    /// Nodes dropped because no element references them.
    pub dropped_nodes: usize,
    /// Elements dropped because an element with the same nodes was already emitted.
    pub duplicate_elems: usize,
    /// Elements dropped because welding made two of their corners identical.
    pub collapsed_elems: usize,
}

type Cell = (i64, i64, i64);

#[inline]
fn pos_to_cell(p: &Point3<f64>, cell_size: f64) -> Cell {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

/// Merge coincident nodes and drop duplicate elements.
///
/// Elements are visited in order. Each referenced node is mapped to the
/// closest output node within `tolerance`, or appended as a new output node.
/// The first element with a given (unordered) node set keeps its field value;
/// later copies are dropped.
///
/// # Errors
/// - [`RefineError::InvalidParameter`] for a non-positive or non-finite
///   `tolerance`
/// - Any [`TetMesh::validate`] error
pub fn join(mesh: &TetMesh, tolerance: f64) -> Result<(TetMesh, MergeStats)> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(RefineError::invalid_param(
            "merge_tolerance",
            tolerance,
            "must be positive and finite",
        ));
    }
    mesh.validate()?;

    let tolerance_sq = tolerance * tolerance;
    let mut stats = MergeStats::default();

    let mut output = TetMesh::with_capacity(mesh.num_nodes(), mesh.num_elems());
    let mut spatial_hash: HashMap<Cell, Vec<usize>> = HashMap::new();
    let mut local_to_global: Vec<Option<usize>> = vec![None; mesh.num_nodes()];
    let mut seen_elems: HashSet<[usize; 4]> = HashSet::with_capacity(mesh.num_elems());

    for (ei, elem) in mesh.elems().iter().enumerate() {
        let mut new_nodes = [0usize; 4];

        for (slot, &n) in elem.iter().enumerate() {
            if let Some(g) = local_to_global[n] {
                new_nodes[slot] = g;
                continue;
            }

            let p = mesh.node(n);
            let cell = pos_to_cell(p, tolerance);

            // Check 3x3x3 neighborhood for the closest existing node.
            let mut closest: Option<(usize, f64)> = None;
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(candidates) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                        else {
                            continue;
                        };
                        for &c in candidates {
                            let d = (output.node(c) - p).norm_squared();
                            if d < tolerance_sq && closest.map_or(true, |(_, best)| d < best) {
                                closest = Some((c, d));
                            }
                        }
                    }
                }
            }

            let g = match closest {
                Some((c, _)) => {
                    stats.merged_nodes += 1;
                    c
                }
                None => {
                    let g = output.add_point(*p);
                    spatial_hash.entry(cell).or_default().push(g);
                    g
                }
            };
            local_to_global[n] = Some(g);
            new_nodes[slot] = g;
        }

        let mut key = new_nodes;
        key.sort_unstable();
        if key[0] == key[1] || key[1] == key[2] || key[2] == key[3] {
            log::warn!("element {} collapsed while merging nodes; dropped", ei);
            stats.collapsed_elems += 1;
            continue;
        }
        if !seen_elems.insert(key) {
            stats.duplicate_elems += 1;
            continue;
        }

        output.add_elem(new_nodes, mesh.value(ei));
    }

    stats.dropped_nodes = local_to_global.iter().filter(|g| g.is_none()).count();

    log::debug!(
        "join: {} -> {} nodes, {} -> {} elements ({:?})",
        mesh.num_nodes(),
        output.num_nodes(),
        mesh.num_elems(),
        output.num_elems(),
        stats
    );

    Ok((output, stats))
}
