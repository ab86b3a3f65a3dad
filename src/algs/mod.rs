//! Re-export public algorithms.

pub mod communicator;
pub mod derivative;
pub mod future;
pub mod kernel;
pub mod stats;
pub mod stencil;
pub mod traversal;

pub use communicator::{Priority, Scheduler, SerialWorld, ThreadWorld, World};
pub use derivative::{BoundaryPreset, Derivative, DerivativeConfig, gradient};
pub use future::Future;
pub use kernel::{DerivativeKernel, DiffKernel, KernelOutput, Neighborhood};
pub use stats::StatsSnapshot;
pub use stencil::DerivativeStencil;
pub use traversal::Traversal;
