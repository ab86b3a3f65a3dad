//! Data module: coefficient blocks, basis functions and function trees.

pub mod cell;
pub mod coeffs;
pub mod legendre;
pub mod projection;
pub mod tree;

pub use cell::SimulationCell;
pub use coeffs::{CoeffBlock, Matrix};
pub use legendre::{MAX_K, TwoScale};
pub use projection::{Quadrature, RefineOptions, project_refined, project_uniform};
pub use tree::{FunctionTree, NodeData, TreeConfig, TreeForm, TreeNode};
