//! Template-driven tetrahedron subdivision.
//!
//! Every element is visited once. Its case code is read off the cut-edge set;
//! code 0 copies the element, any other code emits the children of the
//! matching case-table row. Midpoints are synthesized per element, so an edge
//! shared by `k` split elements gets `k` coincident nodes until [`join`]
//! welds them.

use nalgebra::Point3;

use crate::error::{RefineError, Result};
use crate::mesh::{join, MergeStats, TetMesh};

use super::cases::{CaseTable, SlotSource, CENTROID_SLOT};
use super::cut::CutEdgeSet;
use super::geometry::signed_volume;

/// Split every element touching a cut edge. Does not merge.
///
/// Node `i` of `mesh` is node `i` of the result; new nodes are appended.
/// Children carry their parent's field value.
///
/// # Errors
/// - Any [`TetMesh::validate`] error
/// - [`RefineError::CutEdgeExtentMismatch`] if `cut` was planned on a mesh
///   with a different node count
/// - [`RefineError::CaseCodeOutOfRange`] from the table lookup
pub fn split_elements(mesh: &TetMesh, cut: &CutEdgeSet, table: &CaseTable) -> Result<TetMesh> {
    mesh.validate()?;
    if cut.num_nodes() != mesh.num_nodes() {
        return Err(RefineError::CutEdgeExtentMismatch {
            extent: cut.num_nodes(),
            nodes: mesh.num_nodes(),
        });
    }

    let mut output = TetMesh::with_capacity(
        mesh.num_nodes() + 6 * cut.len(),
        mesh.num_elems() + 4 * cut.len(),
    );
    for p in mesh.nodes() {
        output.add_point(*p);
    }

    let mut split = 0usize;

    for ei in 0..mesh.num_elems() {
        let nodes = mesh.elem(ei);
        let value = mesh.value(ei);
        let code = cut.case_code(nodes);

        if code == 0 {
            output.add_elem(nodes, value);
            continue;
        }

        let corners = mesh.elem_points(ei);
        let row = table.lookup_oriented(code, signed_volume(&corners))?;
        // New node per synthesized slot, created on first use.
        let mut synthesized = [None; CENTROID_SLOT as usize + 1];

        for template in row.case.templates() {
            let mut child = [0usize; 4];
            for (c, &slot) in child.iter_mut().zip(template) {
                *c = match row.slot_source(slot) {
                    Some(SlotSource::Corner(k)) => nodes[k],
                    Some(source) => *synthesized[slot as usize].get_or_insert_with(|| {
                        let p = match source {
                            SlotSource::Midpoint(a, b) => {
                                Point3::from((corners[a].coords + corners[b].coords) * 0.5)
                            }
                            _ => centroid(&corners),
                        };
                        output.add_point(p)
                    }),
                    None => return Err(RefineError::CaseCodeOutOfRange { code }),
                };
            }
            output.add_elem(child, value);
        }
        split += 1;
    }

    log::debug!(
        "split {} of {} elements into {} ({} new nodes before merge)",
        split,
        mesh.num_elems(),
        output.num_elems(),
        output.num_nodes() - mesh.num_nodes()
    );

    Ok(output)
}

fn centroid(corners: &[Point3<f64>; 4]) -> Point3<f64> {
    let sum = corners[0].coords + corners[1].coords + corners[2].coords + corners[3].coords;
    Point3::from(sum * 0.25)
}

/// Split elements along the cut edges, then weld coincident nodes and drop
/// duplicate elements.
pub fn subdivide(
    mesh: &TetMesh,
    cut: &CutEdgeSet,
    table: &CaseTable,
    merge_tolerance: f64,
) -> Result<(TetMesh, MergeStats)> {
    let split = split_elements(mesh, cut, table)?;
    join(&split, merge_tolerance)
}
