//! Tetrahedral volume mesh with one scalar value per element.

use nalgebra::Point3;

use crate::error::{RefineError, Result};

/// Local corner pairs of the six tetrahedron edges, in canonical order I..VI.
///
/// I = (0,1), II = (1,2), III = (0,2), IV = (0,3), V = (1,3), VI = (2,3).
pub const TET_EDGES: [(usize, usize); 6] = [(0, 1), (1, 2), (0, 2), (0, 3), (1, 3), (2, 3)];

/// Local corner triples of the four faces.
///
/// Normals computed as `(b - a) x (c - a)` point outward when the element
/// has positive signed volume.
pub const TET_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];

/// A tetrahedral volume mesh.
///
/// Nodes and elements live in append-only arenas; indices are assigned at
/// insertion and stay stable for the lifetime of the mesh. Every element
/// carries exactly one scalar field value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TetMesh {
    nodes: Vec<Point3<f64>>,
    elems: Vec<[usize; 4]>,
    values: Vec<f64>,
}

impl TetMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with preallocated storage.
    pub fn with_capacity(num_nodes: usize, num_elems: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(num_nodes),
            elems: Vec::with_capacity(num_elems),
            values: Vec::with_capacity(num_elems),
        }
    }

    /// Assemble a mesh from raw arrays without validation.
    ///
    /// Use [`validate`](Self::validate) or the functions in
    /// [`builder`](crate::mesh::build_tet_mesh) for checked construction.
    pub(crate) fn from_parts(
        nodes: Vec<Point3<f64>>,
        elems: Vec<[usize; 4]>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            nodes,
            elems,
            values,
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements.
    #[inline]
    pub fn num_elems(&self) -> usize {
        self.elems.len()
    }

    /// Returns true if the mesh has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Position of a node.
    #[inline]
    pub fn node(&self, index: usize) -> &Point3<f64> {
        &self.nodes[index]
    }

    /// All node positions.
    #[inline]
    pub fn nodes(&self) -> &[Point3<f64>] {
        &self.nodes
    }

    /// Move a node.
    #[inline]
    pub fn set_node(&mut self, index: usize, position: Point3<f64>) {
        self.nodes[index] = position;
    }

    /// Append a node and return its index.
    #[inline]
    pub fn add_point(&mut self, position: Point3<f64>) -> usize {
        self.nodes.push(position);
        self.nodes.len() - 1
    }

    /// Append an element with its field value and return its index.
    #[inline]
    pub fn add_elem(&mut self, nodes: [usize; 4], value: f64) -> usize {
        self.elems.push(nodes);
        self.values.push(value);
        self.elems.len() - 1
    }

    /// Node indices of an element, in local order 0..3.
    #[inline]
    pub fn elem(&self, index: usize) -> [usize; 4] {
        self.elems[index]
    }

    /// All elements.
    #[inline]
    pub fn elems(&self) -> &[[usize; 4]] {
        &self.elems
    }

    /// Field value of an element.
    #[inline]
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Set the field value of an element.
    #[inline]
    pub fn set_value(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    /// All field values, one per element.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Corner positions of an element.
    pub fn elem_points(&self, index: usize) -> [Point3<f64>; 4] {
        let [a, b, c, d] = self.elems[index];
        [self.nodes[a], self.nodes[b], self.nodes[c], self.nodes[d]]
    }

    /// The four faces of an element as global node triples.
    pub fn elem_faces(&self, index: usize) -> [[usize; 3]; 4] {
        let e = self.elems[index];
        TET_FACES.map(|[a, b, c]| [e[a], e[b], e[c]])
    }

    /// Signed volume of an element (positive for the canonical winding).
    pub fn signed_volume(&self, index: usize) -> f64 {
        crate::algo::refine::signed_volume(&self.elem_points(index))
    }

    /// Axis-aligned bounding box of all nodes.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.nodes.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.nodes[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }

    /// Check the structural invariants the refinement relies on.
    ///
    /// The mesh must have at least one element, exactly one field value per
    /// element, in-range node indices and four distinct nodes per element.
    pub fn validate(&self) -> Result<()> {
        if self.elems.is_empty() {
            return Err(RefineError::EmptyMesh);
        }
        if self.values.len() != self.elems.len() {
            return Err(RefineError::FieldNotPerElement {
                values: self.values.len(),
                elems: self.elems.len(),
            });
        }
        for (ei, elem) in self.elems.iter().enumerate() {
            for &n in elem {
                if n >= self.nodes.len() {
                    return Err(RefineError::InvalidNodeIndex { elem: ei, node: n });
                }
            }
            for i in 0..4 {
                for j in (i + 1)..4 {
                    if elem[i] == elem[j] {
                        return Err(RefineError::DegenerateElement { elem: ei });
                    }
                }
            }
        }
        Ok(())
    }

    /// Convenience check for [`validate`](Self::validate).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> TetMesh {
        let mut mesh = TetMesh::new();
        mesh.add_point(Point3::new(0.0, 0.0, 0.0));
        mesh.add_point(Point3::new(1.0, 0.0, 0.0));
        mesh.add_point(Point3::new(0.0, 1.0, 0.0));
        mesh.add_point(Point3::new(0.0, 0.0, 1.0));
        mesh.add_elem([0, 1, 2, 3], 2.5);
        mesh
    }

    #[test]
    fn test_add_returns_stable_indices() {
        let mut mesh = unit_tet();
        assert_eq!(mesh.add_point(Point3::new(1.0, 1.0, 1.0)), 4);
        assert_eq!(mesh.add_elem([1, 2, 3, 4], 0.0), 1);
        assert_eq!(mesh.num_nodes(), 5);
        assert_eq!(mesh.num_elems(), 2);
        assert_eq!(mesh.value(0), 2.5);
        assert_eq!(mesh.elem(1), [1, 2, 3, 4]);
    }

    #[test]
    fn test_set_node_moves_geometry_only() {
        let mut mesh = unit_tet();
        mesh.set_node(3, Point3::new(0.0, 0.0, 2.0));
        assert_eq!(*mesh.node(3), Point3::new(0.0, 0.0, 2.0));
        assert_eq!(mesh.elem(0), [0, 1, 2, 3]);
        assert!((mesh.signed_volume(0) - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_volume() {
        let mesh = unit_tet();
        assert!((mesh.signed_volume(0) - 1.0 / 6.0).abs() < 1e-12);

        let mut flipped = TetMesh::new();
        for p in mesh.nodes() {
            flipped.add_point(*p);
        }
        flipped.add_elem([1, 0, 2, 3], 0.0);
        assert!((flipped.signed_volume(0) + 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_faces_point_outward() {
        let mesh = unit_tet();
        let centroid = Point3::new(0.25, 0.25, 0.25);
        for [a, b, c] in mesh.elem_faces(0) {
            let pa = mesh.node(a);
            let n = (mesh.node(b) - pa).cross(&(mesh.node(c) - pa));
            assert!(n.dot(&(pa - centroid)) > 0.0);
        }
    }

    #[test]
    fn test_validate() {
        let mesh = unit_tet();
        assert!(mesh.is_valid());

        assert!(matches!(TetMesh::new().validate(), Err(RefineError::EmptyMesh)));

        let mut bad = unit_tet();
        bad.add_elem([0, 1, 1, 3], 0.0);
        assert!(matches!(
            bad.validate(),
            Err(RefineError::DegenerateElement { elem: 1 })
        ));

        let mut bad = unit_tet();
        bad.add_elem([0, 1, 2, 9], 0.0);
        assert!(matches!(
            bad.validate(),
            Err(RefineError::InvalidNodeIndex { elem: 1, node: 9 })
        ));

        let bad = TetMesh::from_parts(mesh.nodes().to_vec(), vec![[0, 1, 2, 3]], vec![]);
        assert!(matches!(
            bad.validate(),
            Err(RefineError::FieldNotPerElement { values: 0, elems: 1 })
        ));
    }

    #[test]
    fn test_bounding_box() {
        let mesh = unit_tet();
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
        assert!(TetMesh::new().bounding_box().is_none());
    }
}
