//! Element selection.

use rayon::prelude::*;

use crate::mesh::TetMesh;

use super::geometry::{dihedral_angle_range, edge_lengths, signed_volume};
use super::{RefineOptions, RefinementCriterion};

/// Field value marking an element as preselected.
pub const PRESELECTION_VALUE: f64 = 1.0;

/// Per-element split decisions for one iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// One flag per element, `true` to split.
    pub flags: Vec<bool>,
    /// Number of `true` flags.
    pub count: usize,
    /// Elements with zero or negative volume seen by the volume criterion.
    pub non_positive_volumes: usize,
}

impl Selection {
    /// Indices of selected elements, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Outcome of the live criterion on one element.
#[derive(Debug, Clone, Copy)]
struct Metric {
    pass: bool,
    non_positive_volume: bool,
}

fn evaluate(mesh: &TetMesh, elem: usize, options: &RefineOptions) -> Metric {
    let points = mesh.elem_points(elem);
    match options.criterion {
        RefinementCriterion::IsoValue => Metric {
            pass: mesh.value(elem) == options.iso_value,
            non_positive_volume: false,
        },
        RefinementCriterion::EdgeLength => {
            let longest = edge_lengths(&points)
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max);
            Metric {
                pass: longest > options.edge_length,
                non_positive_volume: false,
            }
        }
        RefinementCriterion::Volume => {
            let volume = signed_volume(&points);
            Metric {
                pass: volume > options.volume,
                non_positive_volume: volume <= 0.0,
            }
        }
        RefinementCriterion::DihedralAngle => {
            let (min, max) = dihedral_angle_range(&points);
            Metric {
                pass: min >= options.dihedral_min && max <= options.dihedral_max,
                non_positive_volume: false,
            }
        }
    }
}

/// Decide which elements of `mesh` to split.
///
/// Without preselection an element is selected iff it passes the criterion.
/// With [`RefineOptions::use_field_preselection`], elements whose value is
/// [`PRESELECTION_VALUE`] form a mask. An iso-value run uses the mask
/// directly (or selects nothing when `iso_value` is not the preselection
/// value); a geometric run keeps a masked element only while it also passes
/// the criterion.
pub fn select_elements(mesh: &TetMesh, options: &RefineOptions) -> Selection {
    let n = mesh.num_elems();
    let preselect = options.use_field_preselection;
    let mut flags = vec![false; n];
    let mut count: isize = 0;

    if preselect || options.criterion == RefinementCriterion::IsoValue {
        let mask_disabled = preselect
            && options.criterion == RefinementCriterion::IsoValue
            && options.iso_value != PRESELECTION_VALUE;
        if !mask_disabled {
            let target = if preselect {
                PRESELECTION_VALUE
            } else {
                options.iso_value
            };
            for (flag, &value) in flags.iter_mut().zip(mesh.values()) {
                if value == target {
                    *flag = true;
                    count += 1;
                }
            }
        }
    }

    let mut non_positive_volumes = 0;

    if options.criterion != RefinementCriterion::IsoValue {
        let metrics: Vec<Metric> = if options.parallel {
            (0..n)
                .into_par_iter()
                .map(|e| evaluate(mesh, e, options))
                .collect()
        } else {
            (0..n).map(|e| evaluate(mesh, e, options)).collect()
        };

        for (flag, metric) in flags.iter_mut().zip(&metrics) {
            if metric.non_positive_volume {
                non_positive_volumes += 1;
            }
            let masked_in = *flag && preselect;
            match (metric.pass, masked_in) {
                (true, _) if !preselect => {
                    *flag = true;
                    count += 1;
                }
                (false, true) => {
                    *flag = false;
                    count -= 1;
                }
                (true, true) => {}
                _ => *flag = false,
            }
        }
    }

    if non_positive_volumes > 0 {
        log::debug!(
            "{} elements have zero or negative volume",
            non_positive_volumes
        );
    }

    let count = count.max(0) as usize;
    debug_assert_eq!(count, flags.iter().filter(|&&f| f).count());
    log::debug!(
        "selected {} of {} elements by {}",
        count,
        n,
        options.criterion.name()
    );

    Selection {
        flags,
        count,
        non_positive_volumes,
    }
}
