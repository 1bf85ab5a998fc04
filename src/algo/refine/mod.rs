//! Local refinement of tetrahedral meshes.
//!
//! Selected tetrahedra are split by bisecting their longest edge(s). Each
//! iteration runs four stages:
//!
//! 1. **Select**: evaluate the [`RefinementCriterion`] on every element
//! 2. **Plan**: record the longest edge(s) of every selected element in a
//!    mesh-wide [`CutEdgeSet`]
//! 3. **Subdivide**: split every element touching a cut edge with the
//!    template the [`CaseTable`] gives for its cut pattern
//! 4. **Merge**: weld the midpoints neighbours synthesized independently
//!
//! Neighbours of a split element see the same cut edges, so they are split
//! too (with a smaller template) and the mesh stays conforming. The loop stops
//! when nothing is selected, no edge is cut, or the iteration cap is reached.
//!
//! Field values are piecewise constant: children inherit their parent's value.
//!
//! # Example
//!
//! ```
//! use tetrefine::algo::refine::{refine, RefineOptions, RefinementCriterion};
//! use tetrefine::mesh::{build_box_mesh, BoxSpec};
//!
//! let mesh = build_box_mesh(&BoxSpec::unit(2), |_| 0.0).unwrap();
//! let options = RefineOptions::new(RefinementCriterion::EdgeLength)
//!     .with_edge_length(0.5)
//!     .with_max_iterations(2);
//!
//! let result = refine(&mesh, &options).unwrap();
//! assert!(result.mesh.num_elems() > mesh.num_elems());
//! ```
//!
//! # References
//!
//! - Ruprecht, D. & Müller, H. (1994). "A Scheme for Edge-based Adaptive
//!   Tetrahedron Subdivision." Mathematical Visualization, 61-70.
//! - Thompson, D. C. & Pébay, P. P. (2006). "Embarrassingly parallel mesh
//!   refinement by edge subdivision." Engineering with Computers, 22, 75-93.

mod cases;
mod cut;
mod driver;
mod geometry;
mod select;
mod subdivide;

pub use cases::{
    edge_bit, edge_index, CanonicalCase, CaseRow, CaseTable, Orientation, SlotSource,
    CENTROID_SLOT, MAX_CASE_CODE,
};
pub use cut::{plan_cut_edges, CutEdgeSet};
pub use driver::{refine, refine_with_progress, Refinement, RefineReport, Remark, Termination};
pub use geometry::{
    dihedral_angle_range, dihedral_angles, edge_lengths, longest_edge_indices, signed_volume,
};
pub use select::{select_elements, Selection, PRESELECTION_VALUE};
pub use subdivide::{split_elements, subdivide};

use crate::error::{RefineError, Result};
use crate::mesh::DEFAULT_MERGE_TOLERANCE;

/// Per-element test deciding which tetrahedra are split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefinementCriterion {
    /// Field value equals [`RefineOptions::iso_value`] exactly.
    #[default]
    IsoValue,
    /// Longest edge is longer than [`RefineOptions::edge_length`].
    EdgeLength,
    /// Signed volume is larger than [`RefineOptions::volume`].
    Volume,
    /// All dihedral angles lie within
    /// `[dihedral_min, dihedral_max]` (degrees, inclusive).
    DihedralAngle,
}

impl RefinementCriterion {
    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            RefinementCriterion::IsoValue => "iso value",
            RefinementCriterion::EdgeLength => "edge length",
            RefinementCriterion::Volume => "volume",
            RefinementCriterion::DihedralAngle => "dihedral angle",
        }
    }
}

impl TryFrom<i32> for RefinementCriterion {
    type Error = RefineError;

    /// Numeric selector as used by option panels: 0 iso value, 1 edge
    /// length, 2 volume, 3 dihedral angle.
    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(RefinementCriterion::IsoValue),
            1 => Ok(RefinementCriterion::EdgeLength),
            2 => Ok(RefinementCriterion::Volume),
            3 => Ok(RefinementCriterion::DihedralAngle),
            _ => Err(RefineError::invalid_param(
                "criterion",
                value,
                "must be in 0..=3",
            )),
        }
    }
}

/// Options for local refinement.
#[derive(Debug, Clone)]
pub struct RefineOptions {
    /// Which per-element test selects elements.
    pub criterion: RefinementCriterion,

    /// Target field value for [`RefinementCriterion::IsoValue`].
    pub iso_value: f64,

    /// Threshold for [`RefinementCriterion::EdgeLength`].
    pub edge_length: f64,

    /// Threshold for [`RefinementCriterion::Volume`].
    pub volume: f64,

    /// Smallest allowed dihedral angle in degrees (default: 0).
    pub dihedral_min: f64,

    /// Largest allowed dihedral angle in degrees (default: 180).
    pub dihedral_max: f64,

    /// Never split elements with a corner on the boundary of the input mesh.
    pub skip_surface_elements: bool,

    /// Input elements are wound with negative signed volume.
    pub inverted_ordering: bool,

    /// Treat elements whose field value is [`PRESELECTION_VALUE`] as a
    /// preselection mask.
    ///
    /// With [`RefinementCriterion::IsoValue`] the mask is used as is when
    /// `iso_value` is also 1 and selects nothing otherwise. With the geometric
    /// criteria an element is split only if it is in the mask and passes the
    /// test.
    pub use_field_preselection: bool,

    /// Maximum number of refinement iterations (default: 5).
    pub max_iterations: usize,

    /// Distance under which nodes are welded after each iteration.
    pub merge_tolerance: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            criterion: RefinementCriterion::IsoValue,
            iso_value: 0.0,
            edge_length: 0.0,
            volume: 0.0,
            dihedral_min: 0.0,
            dihedral_max: 180.0,
            skip_surface_elements: false,
            inverted_ordering: false,
            use_field_preselection: false,
            max_iterations: 5,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            parallel: true,
        }
    }
}

impl RefineOptions {
    /// Create default options for the given criterion.
    pub fn new(criterion: RefinementCriterion) -> Self {
        Self {
            criterion,
            ..Default::default()
        }
    }

    /// Split elements whose value equals `value`.
    pub fn matching(value: f64) -> Self {
        Self::new(RefinementCriterion::IsoValue).with_iso_value(value)
    }

    /// Split elements whose longest edge exceeds `length`.
    pub fn longer_than(length: f64) -> Self {
        Self::new(RefinementCriterion::EdgeLength).with_edge_length(length)
    }

    /// Set the selection criterion.
    pub fn with_criterion(mut self, criterion: RefinementCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the target value for the iso-value criterion.
    pub fn with_iso_value(mut self, value: f64) -> Self {
        self.iso_value = value;
        self
    }

    /// Set the edge-length threshold.
    pub fn with_edge_length(mut self, length: f64) -> Self {
        self.edge_length = length;
        self
    }

    /// Set the volume threshold.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Set the inclusive dihedral angle bounds in degrees.
    pub fn with_dihedral_range(mut self, min: f64, max: f64) -> Self {
        self.dihedral_min = min;
        self.dihedral_max = max;
        self
    }

    /// Set whether elements touching the boundary are left alone.
    pub fn with_skip_surface_elements(mut self, skip: bool) -> Self {
        self.skip_surface_elements = skip;
        self
    }

    /// Set whether input elements have negative orientation.
    pub fn with_inverted_ordering(mut self, inverted: bool) -> Self {
        self.inverted_ordering = inverted;
        self
    }

    /// Set whether the field is used as a preselection mask.
    pub fn with_field_preselection(mut self, preselect: bool) -> Self {
        self.use_field_preselection = preselect;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the node welding tolerance.
    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that numeric options are usable.
    ///
    /// Thresholds may be any number except NaN; the merge tolerance must be
    /// positive and finite.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("iso_value", self.iso_value),
            ("edge_length", self.edge_length),
            ("volume", self.volume),
            ("dihedral_min", self.dihedral_min),
            ("dihedral_max", self.dihedral_max),
        ];
        for (name, value) in thresholds {
            if value.is_nan() {
                return Err(RefineError::invalid_param(name, value, "must not be NaN"));
            }
        }
        if !(self.merge_tolerance.is_finite() && self.merge_tolerance > 0.0) {
            return Err(RefineError::invalid_param(
                "merge_tolerance",
                self.merge_tolerance,
                "must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Element winding the case table is built for.
    pub fn orientation(&self) -> Orientation {
        Orientation::from_inverted(self.inverted_ordering)
    }
}
