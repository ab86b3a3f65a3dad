use crate::data::tree::FunctionTree;
use crate::mra_error::MraError;
use crate::topology::bc::{BoundaryCode, BoundaryConds};

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MraError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

impl<const D: usize> DebugInvariants for FunctionTree<D> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "function tree");
    }

    fn validate_invariants(&self) -> Result<(), MraError> {
        self.verify()
    }
}

impl<const D: usize> DebugInvariants for BoundaryConds<D> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "boundary conditions");
    }

    fn validate_invariants(&self) -> Result<(), MraError> {
        for axis in 0..D {
            let (l, r) = self.axis(axis)?;
            if (l == BoundaryCode::Periodic) != (r == BoundaryCode::Periodic) {
                return Err(MraError::UnpairedPeriodic { axis });
            }
        }
        Ok(())
    }
}
