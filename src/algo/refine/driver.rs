//! Refinement iteration control.

use std::fmt;

use crate::algo::{Progress, RefineStage};
use crate::error::{RefineError, Result};
use crate::mesh::{BoundarySurface, TetMesh};

use super::cases::CaseTable;
use super::cut::{plan_cut_edges, CutEdgeSet};
use super::select::{select_elements, Selection};
use super::subdivide::subdivide;
use super::RefineOptions;

/// Why the iteration loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The criterion selected no element.
    NothingSelected,
    /// Elements were selected but every one was vetoed (boundary suppression).
    NoEdgesToCut,
    /// `max_iterations` passes completed.
    IterationCap,
}

/// Non-fatal observation made during refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remark {
    /// The volume criterion met elements with zero or negative volume.
    NonPositiveVolume {
        /// 1-based iteration.
        iteration: usize,
        /// Number of affected elements.
        elements: usize,
    },
    /// Nothing left to split.
    NoMoreElementsToSplit {
        /// 1-based iteration that selected nothing.
        iteration: usize,
    },
    /// Selected elements produced no cut edge.
    NoEdgesToCut {
        /// 1-based iteration.
        iteration: usize,
        /// Number of selected elements.
        selected: usize,
    },
    /// The iteration cap stopped the loop.
    IterationCapReached {
        /// Completed passes.
        iterations: usize,
    },
    /// Summary of completed passes.
    Completed {
        /// Completed passes.
        iterations: usize,
    },
}

impl Remark {
    /// Whether the remark points at a likely problem with the input.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Remark::NonPositiveVolume { .. })
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remark::NonPositiveVolume {
                iteration,
                elements,
            } => write!(
                f,
                "iteration {}: {} elements have zero or negative volume; \
                 negative elements need inverted ordering, zero ones are flat",
                iteration, elements
            ),
            Remark::NoMoreElementsToSplit { iteration } => {
                write!(f, "iteration {}: no (more) elements need to be split", iteration)
            }
            Remark::NoEdgesToCut {
                iteration,
                selected,
            } => write!(
                f,
                "iteration {}: none of the {} selected elements can be split",
                iteration, selected
            ),
            Remark::IterationCapReached { iterations } => {
                write!(f, "stopped after the maximum of {} iterations", iterations)
            }
            Remark::Completed { iterations } => {
                write!(f, "{} iterations until the selection criterion was reached", iterations)
            }
        }
    }
}

/// Summary of a refinement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineReport {
    /// Completed subdivision passes.
    pub iterations: usize,
    /// Why the loop stopped.
    pub termination: Termination,
    /// Remarks in the order they were raised.
    pub remarks: Vec<Remark>,
    /// Node count of the output mesh.
    pub nodes: usize,
    /// Element count of the output mesh.
    pub elems: usize,
}

/// Output of [`refine`].
#[derive(Debug, Clone)]
pub struct Refinement {
    /// The refined, merged mesh.
    pub mesh: TetMesh,
    /// What happened.
    pub report: RefineReport,
}

enum State {
    Selecting,
    Planning(Selection),
    Subdividing(CutEdgeSet),
    Merged,
    Terminated(Termination),
}

/// Refine a tetrahedral mesh.
///
/// See [`refine_with_progress`].
pub fn refine(mesh: &TetMesh, options: &RefineOptions) -> Result<Refinement> {
    refine_with_progress(mesh, options, &Progress::none())
}

/// Refine a tetrahedral mesh with progress reporting.
///
/// The input is never modified. Each iteration selects elements on the
/// current mesh, bisects their longest edges, and merges the result; the
/// merged mesh feeds the next iteration.
///
/// # Errors
/// Invalid input or options are reported before any work is done. A failure
/// inside an iteration is returned as [`RefineError::Interrupted`], which
/// carries the last fully merged mesh.
pub fn refine_with_progress(
    mesh: &TetMesh,
    options: &RefineOptions,
    progress: &Progress,
) -> Result<Refinement> {
    options.validate()?;
    mesh.validate()?;

    let table = CaseTable::new(options.orientation());
    let boundary = options
        .skip_surface_elements
        .then(|| BoundarySurface::extract(mesh));

    let max = options.max_iterations;
    let mut current = mesh.clone();
    let mut remarks = Vec::new();
    let mut iterations = 0;

    log::info!(
        "refining {} elements by {} (at most {} iterations)",
        mesh.num_elems(),
        options.criterion.name(),
        max
    );

    let mut state = if max == 0 {
        push_remark(&mut remarks, Remark::IterationCapReached { iterations: 0 });
        State::Terminated(Termination::IterationCap)
    } else {
        State::Selecting
    };

    let termination = loop {
        let iteration = iterations + 1;
        state = match state {
            State::Selecting => {
                progress.report_stage(iterations, max, RefineStage::Selecting);
                let selection = select_elements(&current, options);
                if selection.non_positive_volumes > 0 {
                    push_remark(
                        &mut remarks,
                        Remark::NonPositiveVolume {
                            iteration,
                            elements: selection.non_positive_volumes,
                        },
                    );
                }
                if selection.flags.len() != current.num_elems() {
                    let err = RefineError::SelectionLengthMismatch {
                        expected: current.num_elems(),
                        actual: selection.flags.len(),
                    };
                    return Err(interrupted(iteration, current, err));
                }
                if selection.is_empty() {
                    push_remark(&mut remarks, Remark::NoMoreElementsToSplit { iteration });
                    State::Terminated(Termination::NothingSelected)
                } else {
                    State::Planning(selection)
                }
            }
            State::Planning(selection) => {
                progress.report_stage(iterations, max, RefineStage::Planning);
                let selected = selection.selected_indices();
                let cut = match plan_cut_edges(&current, &selected, boundary.as_ref()) {
                    Ok(cut) => cut,
                    Err(err) => return Err(interrupted(iteration, current, err)),
                };
                log::debug!(
                    "iteration {}: {} edges to cut for {} selected elements",
                    iteration,
                    cut.len(),
                    selected.len()
                );
                if cut.is_empty() {
                    push_remark(
                        &mut remarks,
                        Remark::NoEdgesToCut {
                            iteration,
                            selected: selected.len(),
                        },
                    );
                    State::Terminated(Termination::NoEdgesToCut)
                } else {
                    State::Subdividing(cut)
                }
            }
            State::Subdividing(cut) => {
                progress.report_stage(iterations, max, RefineStage::Subdividing);
                match subdivide(&current, &cut, &table, options.merge_tolerance) {
                    Ok((next, stats)) => {
                        log::debug!("iteration {}: {:?}", iteration, stats);
                        current = next;
                        iterations += 1;
                        State::Merged
                    }
                    Err(err) => return Err(interrupted(iteration, current, err)),
                }
            }
            State::Merged => {
                // `iterations` already counts the pass that just finished.
                progress.report_stage(iterations - 1, max, RefineStage::Merged);
                log::info!(
                    "iteration {}: {} nodes, {} elements",
                    iterations,
                    current.num_nodes(),
                    current.num_elems()
                );
                if iterations >= max {
                    push_remark(&mut remarks, Remark::IterationCapReached { iterations });
                    State::Terminated(Termination::IterationCap)
                } else {
                    State::Selecting
                }
            }
            State::Terminated(termination) => break termination,
        };
    };

    if iterations > 0 {
        push_remark(&mut remarks, Remark::Completed { iterations });
    }
    progress.report_stage(iterations, max, RefineStage::Terminated);

    let report = RefineReport {
        iterations,
        termination,
        remarks,
        nodes: current.num_nodes(),
        elems: current.num_elems(),
    };

    Ok(Refinement {
        mesh: current,
        report,
    })
}

fn push_remark(remarks: &mut Vec<Remark>, remark: Remark) {
    if remark.is_advisory() {
        log::warn!("{}", remark);
    } else {
        log::info!("{}", remark);
    }
    remarks.push(remark);
}

fn interrupted(iteration: usize, mesh: TetMesh, source: RefineError) -> RefineError {
    log::error!("refinement iteration {} failed: {}", iteration, source);
    RefineError::Interrupted {
        iteration,
        mesh: Box::new(mesh),
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::refine::RefinementCriterion;
    use crate::mesh::{build_box_mesh, build_tet_mesh, BoxSpec};
    use nalgebra::Point3;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    fn regular_tet(value: f64) -> TetMesh {
        let vertices = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        build_tet_mesh(&vertices, &[[0, 1, 2, 3]], &[value]).unwrap()
    }

    fn face_pair(values: [f64; 2]) -> TetMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 0.5, 1.0),
            Point3::new(2.0, 0.5, -1.0),
        ];
        build_tet_mesh(&vertices, &[[0, 1, 2, 3], [0, 2, 1, 4]], &values).unwrap()
    }

    fn inverted_corner_tet() -> TetMesh {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        build_tet_mesh(&vertices, &[[0, 1, 2, 3]], &[0.0]).unwrap()
    }

    fn total_volume(mesh: &TetMesh) -> f64 {
        (0..mesh.num_elems()).map(|e| mesh.signed_volume(e)).sum()
    }

    #[test]
    fn test_regular_tet_all_edges_cut() {
        let mesh = regular_tet(0.0);
        let edge = 8.0_f64.sqrt();
        let options = RefineOptions::longer_than(edge - 0.1).with_max_iterations(1);

        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.mesh.num_elems(), 12);
        assert_eq!(result.mesh.num_nodes(), 11);
        assert_eq!(result.report.iterations, 1);
        assert_eq!(result.report.termination, Termination::IterationCap);

        let keys: HashSet<[usize; 4]> = result
            .mesh
            .elems()
            .iter()
            .map(|e| {
                let mut k = *e;
                k.sort_unstable();
                k
            })
            .collect();
        assert_eq!(keys.len(), 12);
    }

    #[test]
    fn test_unmatched_iso_value_returns_input() {
        let mesh = regular_tet(0.0);
        let result = refine(&mesh, &RefineOptions::matching(3.0)).unwrap();
        assert_eq!(result.mesh, mesh);
        assert_eq!(result.report.iterations, 0);
        assert_eq!(result.report.termination, Termination::NothingSelected);
        assert_eq!(
            result.report.remarks,
            vec![Remark::NoMoreElementsToSplit { iteration: 1 }]
        );
    }

    #[test]
    fn test_shared_face_midpoint_not_duplicated() {
        let mesh = face_pair([1.0, 0.0]);
        let options = RefineOptions::matching(1.0).with_max_iterations(1);
        let result = refine(&mesh, &options).unwrap();

        // The neighbour is split along the shared edge too.
        assert_eq!(result.mesh.num_nodes(), 6);
        assert_eq!(result.mesh.num_elems(), 4);

        let on_mid = |p: &Point3<f64>| (p - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-12;
        assert_eq!(result.mesh.nodes().iter().filter(|p| on_mid(p)).count(), 1);
        assert!((total_volume(&result.mesh) - total_volume(&mesh)).abs() < 1e-12);
    }

    #[test]
    fn test_volume_criterion() {
        let mesh = regular_tet(0.0);
        let options = RefineOptions::new(RefinementCriterion::Volume)
            .with_volume(0.0)
            .with_max_iterations(1);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.iterations, 1);
        assert!(result.mesh.num_elems() > 1);

        let mesh = inverted_corner_tet();
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.iterations, 0);
        assert_eq!(result.mesh, mesh);
        assert!(result.report.remarks.contains(&Remark::NonPositiveVolume {
            iteration: 1,
            elements: 1
        }));
        assert!(result.report.remarks.iter().any(Remark::is_advisory));
    }

    #[test]
    fn test_dihedral_full_range_always_selects() {
        let mesh = build_box_mesh(&BoxSpec::unit(1), |_| 0.0).unwrap();
        let options = RefineOptions::new(RefinementCriterion::DihedralAngle).with_max_iterations(1);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.iterations, 1);
        assert!(result.mesh.num_elems() > mesh.num_elems());
    }

    #[test]
    fn test_zero_iterations_returns_input() {
        let mesh = regular_tet(0.0);
        let options = RefineOptions::longer_than(0.0).with_max_iterations(0);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.mesh, mesh);
        assert_eq!(result.report.iterations, 0);
        assert_eq!(result.report.termination, Termination::IterationCap);
        assert!(!result
            .report
            .remarks
            .iter()
            .any(|r| matches!(r, Remark::Completed { .. })));
    }

    #[test]
    fn test_terminates_at_iteration_cap() {
        let mesh = build_box_mesh(&BoxSpec::unit(1), |_| 0.0).unwrap();
        let options = RefineOptions::longer_than(0.0).with_max_iterations(3);
        let result = refine(&mesh, &options).unwrap();

        assert_eq!(result.report.iterations, 3);
        assert_eq!(result.report.termination, Termination::IterationCap);
        assert_eq!(result.report.elems, result.mesh.num_elems());
        assert_eq!(result.report.nodes, result.mesh.num_nodes());
        assert!(result
            .report
            .remarks
            .contains(&Remark::Completed { iterations: 3 }));
        assert!((total_volume(&result.mesh) - 1.0).abs() < 1e-10);
        for e in 0..result.mesh.num_elems() {
            assert!(result.mesh.signed_volume(e) > 0.0);
        }
    }

    #[test]
    fn test_refinement_stops_when_edges_are_short() {
        let mesh = build_box_mesh(&BoxSpec::unit(1), |_| 0.0).unwrap();
        // Only the cube diagonal is longer than 1.5; once it is cut the
        // longest edges are face diagonals.
        let options = RefineOptions::longer_than(1.5).with_max_iterations(10);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.iterations, 1);
        assert_eq!(result.report.termination, Termination::NothingSelected);
        assert_eq!(result.mesh.num_elems(), 12);
    }

    #[test]
    fn test_skip_surface_elements() {
        let mesh = build_box_mesh(&BoxSpec::unit(1), |_| 0.0).unwrap();
        let options = RefineOptions::longer_than(0.0).with_skip_surface_elements(true);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.termination, Termination::NoEdgesToCut);
        assert_eq!(result.mesh, mesh);

        // Interior elements of a 3x3x3 box are refined, surface ones are not.
        let mesh = build_box_mesh(&BoxSpec::unit(3), |_| 0.0).unwrap();
        let options = options.with_max_iterations(1);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.iterations, 1);
        assert!(result.mesh.num_elems() > mesh.num_elems());
    }

    #[test]
    fn test_inverted_ordering_yields_positive_children() {
        let mesh = inverted_corner_tet();
        let options = RefineOptions::longer_than(0.0)
            .with_inverted_ordering(true)
            .with_max_iterations(2);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.iterations, 2);
        for e in 0..result.mesh.num_elems() {
            assert!(result.mesh.signed_volume(e) > 0.0);
        }
        assert!((total_volume(&result.mesh) + total_volume(&mesh)).abs() < 1e-12);
    }

    #[test]
    fn test_preselection_follows_children() {
        let mesh = face_pair([1.0, 0.0]);
        let options = RefineOptions::longer_than(0.0)
            .with_field_preselection(true)
            .with_max_iterations(2);
        let result = refine(&mesh, &options).unwrap();
        assert_eq!(result.report.iterations, 2);
        // Children of the preselected element stay preselected.
        assert!(result.mesh.values().iter().filter(|&&v| v == 1.0).count() > 1);
    }

    #[test]
    fn test_invalid_input_is_rejected_up_front() {
        assert!(matches!(
            refine(&TetMesh::new(), &RefineOptions::default()),
            Err(RefineError::EmptyMesh)
        ));

        let options = RefineOptions::default().with_merge_tolerance(0.0);
        assert!(matches!(
            refine(&regular_tet(0.0), &options),
            Err(RefineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_failure_returns_last_merged_mesh() {
        // Four distinct nodes at one position: valid topology, no longest edge.
        let mut mesh = TetMesh::new();
        for _ in 0..4 {
            mesh.add_point(Point3::new(1.0, 1.0, 1.0));
        }
        mesh.add_elem([0, 1, 2, 3], 0.0);

        let options = RefineOptions::longer_than(-1.0);
        let err = refine(&mesh, &options).unwrap_err();
        match &err {
            RefineError::Interrupted {
                iteration, source, ..
            } => {
                assert_eq!(*iteration, 1);
                assert!(matches!(**source, RefineError::NoLongestEdge { elem: 0 }));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.partial_mesh(), Some(&mesh));
    }

    #[test]
    fn test_progress_reaches_completion() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        let mesh = build_box_mesh(&BoxSpec::unit(1), |_| 0.0).unwrap();
        let options = RefineOptions::longer_than(0.0).with_max_iterations(2);
        refine_with_progress(&mesh, &options, &progress).unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(*seen.last().unwrap(), (8, 8));
    }

    #[test]
    fn test_repeated_runs_are_independent() {
        let mesh = build_box_mesh(&BoxSpec::unit(1), |_| 0.0).unwrap();
        let inverted = RefineOptions::longer_than(0.0)
            .with_inverted_ordering(true)
            .with_max_iterations(1);
        let standard = RefineOptions::longer_than(0.0).with_max_iterations(1);

        let a = refine(&mesh, &standard).unwrap();
        refine(&mesh, &inverted).unwrap();
        let b = refine(&mesh, &standard).unwrap();
        assert_eq!(a.mesh, b.mesh);
    }
}
