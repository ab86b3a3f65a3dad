#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mra-derivative
//!
//! mra-derivative computes spatial derivatives of functions stored as sparse,
//! adaptively refined trees of multiwavelet (Legendre scaling function)
//! coefficients, with the tree spread over a set of cooperating workers.
//!
//! ## Features
//! - `TreeKey` addressing, pure ownership maps and boundary-aware neighbor resolution
//! - Per-axis, per-side boundary conditions (zero, periodic, free, Dirichlet,
//!   Neumann, nonzero-derivative) validated at construction
//! - Precomputed derivative stencils with one-sided boundary blocks
//! - A continuation-driven traversal that never blocks on a remote value and
//!   handles neighbors refined deeper than the node itself
//! - Serial (deterministic) and threaded schedulers behind one `World` handle
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! mra-derivative = "0.1"
//! # Optional features:
//! # features = ["rayon"]
//! ```
//!
//! ```ignore
//! use mra_derivative::prelude::*;
//!
//! let world = World::serial(4);
//! let f = project_uniform::<1, _>(&world, &TreeConfig::unit(6, 1), 4, |x| {
//!     (std::f64::consts::TAU * x[0]).sin()
//! })?;
//! let df = Derivative::<1>::periodic(6, 0)?.apply(&world, &f)?;
//! ```
//!
//! ## Determinism
//!
//! `SerialWorld` drains its queues in a fixed order, so runs on it are
//! reproducible. Results never depend on scheduling order or priority hints;
//! `ThreadWorld` yields the same output trees.

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod mra_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use mra_error::{ErrorKind, MraError};

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Priority, Scheduler, SerialWorld, ThreadWorld, World};
    pub use crate::algs::derivative::{BoundaryPreset, Derivative, DerivativeConfig, gradient};
    pub use crate::algs::future::Future;
    pub use crate::algs::kernel::{DiffKernel, Neighborhood};
    pub use crate::algs::stats::StatsSnapshot;
    pub use crate::data::cell::SimulationCell;
    pub use crate::data::coeffs::CoeffBlock;
    pub use crate::data::projection::{RefineOptions, project_refined, project_uniform};
    pub use crate::data::tree::{FunctionTree, TreeConfig, TreeNode};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mra_error::{ErrorKind, MraError};
    pub use crate::topology::bc::{BoundaryCode, BoundaryConds, Side};
    pub use crate::topology::key::TreeKey;
    pub use crate::topology::ownership::ProcessMap;
}
