//! Error types for tetrefine.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::mesh::TetMesh;

/// Result type alias using [`RefineError`].
pub type Result<T> = std::result::Result<T, RefineError>;

/// Errors that can occur while building or refining a tetrahedral mesh.
#[derive(Error, Debug)]
pub enum RefineError {
    /// The mesh has no elements.
    #[error("mesh has no elements")]
    EmptyMesh,

    /// A cell does not name exactly four nodes.
    #[error("cell {elem} has {nodes} nodes, only tetrahedra are supported")]
    NotTetrahedral {
        /// The cell index.
        elem: usize,
        /// Number of nodes the cell names.
        nodes: usize,
    },

    /// An element references a node that does not exist.
    #[error("element {elem} references invalid node index {node}")]
    InvalidNodeIndex {
        /// The element index.
        elem: usize,
        /// The invalid node index.
        node: usize,
    },

    /// An element repeats a node index.
    #[error("element {elem} is degenerate (has duplicate nodes)")]
    DegenerateElement {
        /// The element index.
        elem: usize,
    },

    /// The scalar field is not stored one value per element.
    #[error("field has {values} values but the mesh has {elems} elements; data must be constant per element")]
    FieldNotPerElement {
        /// Number of field values.
        values: usize,
        /// Number of mesh elements.
        elems: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// The selection vector does not cover the element collection.
    #[error("selection vector has length {actual}, expected {expected}")]
    SelectionLengthMismatch {
        /// Number of mesh elements.
        expected: usize,
        /// Length of the selection vector.
        actual: usize,
    },

    /// A case code outside the table was looked up.
    #[error("case code {code} is not in the subdivision table (valid: 1..=63)")]
    CaseCodeOutOfRange {
        /// The offending code.
        code: usize,
    },

    /// The cut-edge set was built for a mesh with a different node count.
    #[error("cut-edge set spans {extent} nodes but the mesh has {nodes}")]
    CutEdgeExtentMismatch {
        /// Node extent recorded in the cut-edge set.
        extent: usize,
        /// Node count of the mesh being subdivided.
        nodes: usize,
    },

    /// The longest-edge query produced no candidate.
    #[error("no longest edge found for element {elem}")]
    NoLongestEdge {
        /// The element index.
        elem: usize,
    },

    /// The longest-edge query was given the wrong number of edge lengths.
    #[error("expected 6 edge lengths, got {actual}")]
    EdgeCount {
        /// Number of lengths supplied.
        actual: usize,
    },

    /// A refinement iteration failed after earlier iterations completed.
    ///
    /// `mesh` is the last fully merged mesh, i.e. the result of iteration
    /// `iteration - 1` (or the input mesh when the first iteration failed).
    #[error("refinement iteration {iteration} failed: {source}")]
    Interrupted {
        /// The 1-based iteration that failed.
        iteration: usize,
        /// Last fully merged mesh.
        mesh: Box<TetMesh>,
        /// The underlying failure.
        #[source]
        source: Box<RefineError>,
    },
}

impl RefineError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        RefineError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// The last fully merged mesh, if this error interrupted a running refinement.
    pub fn partial_mesh(&self) -> Option<&TetMesh> {
        match self {
            RefineError::Interrupted { mesh, .. } => Some(mesh.as_ref()),
            _ => None,
        }
    }
}
