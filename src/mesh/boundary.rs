//! Boundary surface extraction.
//!
//! The boundary of a tetrahedral mesh is the set of faces used by exactly one
//! element. [`BoundarySurface`] keeps those faces together with their nodes and
//! a kd-tree over the nodes, so the refinement can ask whether an element
//! corner lies on the outer surface.

use std::collections::HashMap;
use std::fmt;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;

use super::tetmesh::TetMesh;

/// Triangulated boundary surface of a tetrahedral mesh.
pub struct BoundarySurface {
    /// Boundary node positions.
    nodes: Vec<Point3<f64>>,
    /// Index of each boundary node in the source mesh.
    source_nodes: Vec<usize>,
    /// Boundary triangles, indexing into `nodes`, wound as in the source element.
    faces: Vec<[usize; 3]>,
    /// Kd-tree over `nodes`; item `i` is boundary node `i`. Immutable, since
    /// whole planes of nodes may share one coordinate.
    tree: Option<ImmutableKdTree<f64, 3>>,
}

impl BoundarySurface {
    /// Extract the boundary surface of a mesh.
    pub fn extract(mesh: &TetMesh) -> Self {
        // Count face occurrences by sorted node triple, remembering the first winding.
        let mut face_uses: HashMap<[usize; 3], (usize, [usize; 3])> = HashMap::new();
        let mut face_order: Vec<[usize; 3]> = Vec::new();

        for e in 0..mesh.num_elems() {
            for face in mesh.elem_faces(e) {
                let mut key = face;
                key.sort_unstable();
                face_uses
                    .entry(key)
                    .and_modify(|(count, _)| *count += 1)
                    .or_insert_with(|| {
                        face_order.push(key);
                        (1, face)
                    });
            }
        }

        let mut local: HashMap<usize, usize> = HashMap::new();
        let mut nodes = Vec::new();
        let mut source_nodes = Vec::new();
        let mut faces = Vec::new();

        for key in &face_order {
            let (count, face) = face_uses[key];
            if count != 1 {
                continue;
            }
            let tri = face.map(|n| {
                *local.entry(n).or_insert_with(|| {
                    nodes.push(*mesh.node(n));
                    source_nodes.push(n);
                    nodes.len() - 1
                })
            });
            faces.push(tri);
        }

        let entries: Vec<[f64; 3]> = nodes.iter().map(|p| [p.x, p.y, p.z]).collect();
        let tree = (!entries.is_empty()).then(|| ImmutableKdTree::new_from_slice(&entries));
        log::debug!(
            "boundary surface: {} faces, {} nodes",
            faces.len(),
            nodes.len()
        );

        Self {
            nodes,
            source_nodes,
            faces,
            tree,
        }
    }

    /// Number of boundary nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of boundary triangles.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Boundary node positions.
    pub fn nodes(&self) -> &[Point3<f64>] {
        &self.nodes
    }

    /// Boundary triangles.
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Source-mesh index of a boundary node.
    pub fn source_node(&self, index: usize) -> usize {
        self.source_nodes[index]
    }

    /// Closest boundary node to `point`, as (boundary node index, distance).
    ///
    /// Returns `None` only when the surface has no nodes.
    pub fn closest_node(&self, point: &Point3<f64>) -> Option<(usize, f64)> {
        self.nearest_squared(point).map(|(i, d2)| (i, d2.sqrt()))
    }

    /// Returns true if `point` coincides exactly with a boundary node.
    pub fn touches(&self, point: &Point3<f64>) -> bool {
        matches!(self.nearest_squared(point), Some((_, d2)) if d2 == 0.0)
    }

    fn nearest_squared(&self, point: &Point3<f64>) -> Option<(usize, f64)> {
        let tree = self.tree.as_ref()?;
        let nearest = tree.nearest_one::<SquaredEuclidean>(&[point.x, point.y, point.z]);
        Some((nearest.item as usize, nearest.distance))
    }
}

impl fmt::Debug for BoundarySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundarySurface")
            .field("nodes", &self.nodes.len())
            .field("faces", &self.faces.len())
            .finish_non_exhaustive()
    }
}
