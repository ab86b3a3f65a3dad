//! Tree addressing: keys, ownership, boundary conditions and neighbors.

pub mod bc;
pub mod key;
pub mod neighbor;
pub mod ownership;

pub use bc::{BoundaryCode, BoundaryConds, Side};
pub use key::{Level, Translation, TreeKey};
pub use ownership::{ProcessMap, Rank};
