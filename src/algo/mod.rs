//! Mesh processing algorithms.
//!
//! - **Refinement**: local, criterion-driven longest-edge refinement of
//!   tetrahedral meshes ([`refine`])
//! - **Progress**: callbacks for long-running operations ([`Progress`])

pub mod progress;
pub mod refine;

pub use progress::{Progress, RefineStage};
