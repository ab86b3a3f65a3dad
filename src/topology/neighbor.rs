//! Boundary-aware neighbor resolution along one axis.
//!
//! Stepping off the domain either wraps around (periodic axes) or yields
//! "no neighbor" (every other code). Both functions here are pure.

use crate::mra_error::MraError;
use crate::topology::bc::{BoundaryCode, BoundaryConds};
use crate::topology::key::{Level, Translation, TreeKey};

/// Apply the boundary codes of one axis to a stepped translation.
///
/// Returns `Ok(Some(l'))` with the (possibly wrapped) translation,
/// `Ok(None)` when the step leaves the domain through a non-periodic side,
/// and an error when a periodic wrap is requested on an axis whose other
/// side is not periodic.
pub fn enforce_bc(
    axis: usize,
    left: BoundaryCode,
    right: BoundaryCode,
    level: Level,
    l: Translation,
) -> Result<Option<Translation>, MraError> {
    let two2n: Translation = 1 << level;
    let (code, wrapped) = if l < 0 {
        (left, l + two2n)
    } else if l >= two2n {
        (right, l - two2n)
    } else {
        return Ok(Some(l));
    };
    match code {
        BoundaryCode::Periodic => {
            if left != right {
                return Err(MraError::PeriodicMismatch {
                    axis,
                    left: left.name(),
                    right: right.name(),
                });
            }
            Ok(Some(wrapped))
        }
        BoundaryCode::Zero
        | BoundaryCode::Free
        | BoundaryCode::Dirichlet
        | BoundaryCode::Neumann
        | BoundaryCode::NonzeroDerivative => Ok(None),
    }
}

/// Neighbor of `key` at distance `step` along `axis`, or the invalid key.
pub fn neighbor<const D: usize>(
    key: &TreeKey<D>,
    axis: usize,
    step: Translation,
    bc: &BoundaryConds<D>,
) -> Result<TreeKey<D>, MraError> {
    let (left, right) = bc.axis(axis)?;
    if key.is_invalid() {
        return Ok(TreeKey::invalid());
    }
    let l = key.translation()[axis] + step;
    Ok(match enforce_bc(axis, left, right, key.level(), l)? {
        Some(l) => key.with_translation(axis, l),
        None => TreeKey::invalid(),
    })
}
