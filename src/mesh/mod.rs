//! Core mesh data structures.
//!
//! This module provides the tetrahedral volume mesh and the collaborators the
//! refinement needs around it.
//!
//! # Overview
//!
//! The primary type is [`TetMesh`], an append-only arena of nodes and
//! tetrahedral elements with one scalar field value per element ("constant
//! per element" data). Node and element indices are plain `usize` values
//! assigned at insertion.
//!
//! Around it:
//! - [`build_tet_mesh`], [`build_from_cells`] and [`build_box_mesh`] construct
//!   validated meshes
//! - [`BoundarySurface`] extracts the outer surface and answers closest-node queries
//! - [`join`] welds coincident nodes and drops duplicate elements
//!
//! # Construction
//!
//! ```
//! use tetrefine::mesh::{build_tet_mesh, TetMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let mesh: TetMesh = build_tet_mesh(&vertices, &[[0, 1, 2, 3]], &[0.0]).unwrap();
//! assert!(mesh.signed_volume(0) > 0.0);
//! ```

mod boundary;
mod builder;
mod merge;
mod tetmesh;

pub use boundary::BoundarySurface;
pub use builder::{build_box_mesh, build_from_cells, build_tet_mesh, BoxSpec};
pub use merge::{join, MergeStats, DEFAULT_MERGE_TOLERANCE};
pub use tetmesh::{TetMesh, TET_EDGES, TET_FACES};
