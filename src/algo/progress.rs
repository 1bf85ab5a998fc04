//! Progress reporting for long-running algorithms.
//!
//! This module provides a simple progress callback mechanism that algorithms
//! can use to report their progress to callers.
//!
//! # Example
//!
//! ```
//! use tetrefine::algo::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 5, "refining");
//! ```

use std::fmt;

/// Stage of a refinement iteration, reported through [`Progress::report_stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStage {
    /// Evaluating the selection criterion on every element.
    Selecting,
    /// Choosing the edges to bisect.
    Planning,
    /// Emitting child elements.
    Subdividing,
    /// Coincident nodes and duplicate elements merged; iteration complete.
    Merged,
    /// The driver stopped.
    Terminated,
}

impl RefineStage {
    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            RefineStage::Selecting => "selecting elements",
            RefineStage::Planning => "planning edge cuts",
            RefineStage::Subdividing => "subdividing",
            RefineStage::Merged => "merged",
            RefineStage::Terminated => "done",
        }
    }
}

impl fmt::Display for RefineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report a refinement stage within an iteration.
    ///
    /// Each iteration is split into four steps (select, plan, subdivide,
    /// merge), so the callback sees `iteration * 4 + step` out of
    /// `max_iterations * 4`. [`RefineStage::Terminated`] always reports
    /// completion.
    pub fn report_stage(&self, iteration: usize, max_iterations: usize, stage: RefineStage) {
        let total = max_iterations.max(1) * 4;
        let current = match stage {
            RefineStage::Selecting => iteration * 4,
            RefineStage::Planning => iteration * 4 + 1,
            RefineStage::Subdividing => iteration * 4 + 2,
            RefineStage::Merged => iteration * 4 + 3,
            RefineStage::Terminated => total,
        };
        let message = format!("iteration {}: {}", iteration + 1, stage);
        (self.callback)(current.min(total), total, &message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
