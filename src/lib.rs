//! # tetrefine
//!
//! Local refinement of tetrahedral volume meshes.
//!
//! tetrefine splits the tetrahedra selected by a per-element criterion (field
//! value, edge length, volume or dihedral angles) by bisecting their longest
//! edges. A 63-row case table maps every pattern of cut edges to one of twelve
//! subdivision templates, so neighbouring elements are split consistently and
//! the mesh stays conforming. Iterations repeat until nothing is selected or
//! an iteration cap is hit.
//!
//! ## Features
//!
//! - **Tetrahedral mesh arena**: nodes, elements and one scalar per element
//! - **Four selection criteria**: with an optional field-value preselection mask
//! - **Boundary suppression**: leave elements touching the outer surface alone
//! - **Either winding**: a run-scoped case table for inverted element ordering
//! - **Node welding**: coincident midpoints merged after every pass
//!
//! ## Quick Start
//!
//! ```
//! use tetrefine::prelude::*;
//!
//! // A unit cube of 2x2x2 cells; elements left of x = 0.5 carry value 1.
//! let mesh = build_box_mesh(&BoxSpec::unit(2), |c| if c.x < 0.5 { 1.0 } else { 0.0 }).unwrap();
//!
//! let options = RefineOptions::matching(1.0).with_max_iterations(2);
//! let result = refine(&mesh, &options).unwrap();
//!
//! println!("{} -> {} elements", mesh.num_elems(), result.mesh.num_elems());
//! for remark in &result.report.remarks {
//!     println!("{}", remark);
//! }
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use tetrefine::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//!
//! let mesh = build_tet_mesh(&vertices, &[[0, 1, 2, 3]], &[0.0]).unwrap();
//! assert_eq!(mesh.num_nodes(), 4);
//! assert_eq!(mesh.num_elems(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use tetrefine::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::refine::{
        refine, refine_with_progress, RefineOptions, RefineReport, RefinementCriterion,
        Refinement, Remark, Termination,
    };
    pub use crate::algo::Progress;
    pub use crate::error::{RefineError, Result};
    pub use crate::mesh::{
        build_box_mesh, build_from_cells, build_tet_mesh, BoundarySurface, BoxSpec, TetMesh,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
