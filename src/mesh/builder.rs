//! Mesh construction utilities.
//!
//! This module provides functions for building tetrahedral meshes from
//! vertex/element lists, and a generator for structured box meshes used by
//! the CLI and the benchmarks.

use nalgebra::{Point3, Vector3};

use super::tetmesh::TetMesh;
use crate::algo::refine::signed_volume;
use crate::error::{RefineError, Result};

/// Build a tetrahedral mesh from vertices, elements and per-element values.
///
/// # Arguments
/// * `vertices` - List of node positions
/// * `elems` - List of tetrahedra, each as [n0, n1, n2, n3] indices
/// * `values` - One scalar field value per element
///
/// # Returns
/// A validated mesh, or an error if the input is invalid.
///
/// # Example
/// ```
/// use tetrefine::mesh::build_tet_mesh;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let mesh = build_tet_mesh(&vertices, &[[0, 1, 2, 3]], &[1.0]).unwrap();
/// assert_eq!(mesh.num_nodes(), 4);
/// assert_eq!(mesh.num_elems(), 1);
/// ```
pub fn build_tet_mesh(
    vertices: &[Point3<f64>],
    elems: &[[usize; 4]],
    values: &[f64],
) -> Result<TetMesh> {
    let mesh = TetMesh::from_parts(vertices.to_vec(), elems.to_vec(), values.to_vec());
    mesh.validate()?;
    Ok(mesh)
}

/// Build a tetrahedral mesh from general cells.
///
/// Every cell must name exactly four nodes; anything else is rejected with
/// [`RefineError::NotTetrahedral`].
pub fn build_from_cells(
    vertices: &[Point3<f64>],
    cells: &[Vec<usize>],
    values: &[f64],
) -> Result<TetMesh> {
    let mut elems = Vec::with_capacity(cells.len());
    for (ci, cell) in cells.iter().enumerate() {
        match cell.as_slice() {
            &[a, b, c, d] => elems.push([a, b, c, d]),
            _ => {
                return Err(RefineError::NotTetrahedral {
                    elem: ci,
                    nodes: cell.len(),
                })
            }
        }
    }
    build_tet_mesh(vertices, &elems, values)
}

/// Dimensions of a structured box mesh.
#[derive(Debug, Clone, Copy)]
pub struct BoxSpec {
    /// Number of cubes along x, y and z.
    pub cells: [usize; 3],
    /// Minimum corner of the box.
    pub origin: Point3<f64>,
    /// Edge lengths of the box.
    pub size: Vector3<f64>,
}

impl BoxSpec {
    /// A box of `n`^3 cubes spanning the unit cube.
    pub fn unit(n: usize) -> Self {
        Self {
            cells: [n, n, n],
            origin: Point3::origin(),
            size: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Set the number of cubes per axis.
    pub fn with_cells(mut self, nx: usize, ny: usize, nz: usize) -> Self {
        self.cells = [nx, ny, nz];
        self
    }

    /// Set the box edge lengths.
    pub fn with_size(mut self, size: Vector3<f64>) -> Self {
        self.size = size;
        self
    }

    /// Set the minimum corner.
    pub fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }
}

/// Freudenthal paths through a unit cube: each permutation of the axes gives
/// one tetrahedron from corner (0,0,0) to corner (1,1,1).
const AXIS_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Build a conforming tetrahedralisation of a box.
///
/// Each cube is split into six tetrahedra sharing its main diagonal, so
/// neighbouring cubes agree on their shared faces. Every element is emitted
/// with positive signed volume. `value_fn` receives the element centroid and
/// returns its field value.
pub fn build_box_mesh<F>(spec: &BoxSpec, value_fn: F) -> Result<TetMesh>
where
    F: Fn(&Point3<f64>) -> f64,
{
    let [nx, ny, nz] = spec.cells;
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(RefineError::invalid_param(
            "cells",
            format!("{}x{}x{}", nx, ny, nz),
            "every axis needs at least one cell",
        ));
    }
    if !(spec.size.x > 0.0 && spec.size.y > 0.0 && spec.size.z > 0.0) {
        return Err(RefineError::invalid_param(
            "size",
            format!("{:?}", spec.size),
            "box extents must be positive",
        ));
    }

    let node_index = |i: usize, j: usize, k: usize| (k * (ny + 1) + j) * (nx + 1) + i;
    let step = Vector3::new(
        spec.size.x / nx as f64,
        spec.size.y / ny as f64,
        spec.size.z / nz as f64,
    );

    let mut mesh = TetMesh::with_capacity((nx + 1) * (ny + 1) * (nz + 1), nx * ny * nz * 6);

    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                mesh.add_point(spec.origin + step.component_mul(&Vector3::new(i as f64, j as f64, k as f64)));
            }
        }
    }

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for order in &AXIS_ORDERS {
                    let mut corner = [i, j, k];
                    let mut tet = [node_index(i, j, k); 4];
                    for (slot, &axis) in order.iter().enumerate() {
                        corner[axis] += 1;
                        tet[slot + 1] = node_index(corner[0], corner[1], corner[2]);
                    }

                    let points = tet.map(|n| *mesh.node(n));
                    if signed_volume(&points) < 0.0 {
                        tet.swap(1, 2);
                    }

                    let centroid = Point3::from(
                        (points[0].coords + points[1].coords + points[2].coords + points[3].coords)
                            * 0.25,
                    );
                    let value = value_fn(&centroid);
                    mesh.add_elem(tet, value);
                }
            }
        }
    }

    Ok(mesh)
}
