//! Simulation cell: the physical box the unit tree is mapped onto.

use crate::mra_error::MraError;

/// Axis-aligned physical domain `[lo_d, hi_d]` per axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationCell<const D: usize> {
    bounds: [(f64, f64); D],
}

impl<const D: usize> SimulationCell<D> {
    pub fn new(bounds: [(f64, f64); D]) -> Result<Self, MraError> {
        for (axis, &(lo, hi)) in bounds.iter().enumerate() {
            if !(lo.is_finite() && hi.is_finite() && hi > lo) {
                return Err(MraError::InvalidCell(format!(
                    "axis {axis} has bounds [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { bounds })
    }

    /// Unit cube `[0, 1]^D`.
    pub fn unit() -> Self {
        Self {
            bounds: [(0.0, 1.0); D],
        }
    }

    /// Build from a list of bounds, one per axis.
    pub fn from_slice(bounds: &[(f64, f64)]) -> Result<Self, MraError> {
        let arr: [(f64, f64); D] = bounds.try_into().map_err(|_| {
            MraError::InvalidCell(format!("expected {D} axes, got {}", bounds.len()))
        })?;
        Self::new(arr)
    }

    pub fn bounds(&self) -> &[(f64, f64); D] {
        &self.bounds
    }

    pub fn width(&self, axis: usize) -> f64 {
        let (lo, hi) = self.bounds[axis];
        hi - lo
    }

    /// Reciprocal width: converts unit-cell derivatives to physical ones.
    pub fn rcell_width(&self, axis: usize) -> f64 {
        1.0 / self.width(axis)
    }

    /// Physical point to unit-cell coordinates.
    pub fn to_unit(&self, x: &[f64; D]) -> [f64; D] {
        let mut u = [0.0; D];
        for d in 0..D {
            u[d] = (x[d] - self.bounds[d].0) / self.width(d);
        }
        u
    }

    /// Unit-cell coordinates to a physical point.
    pub fn from_unit(&self, u: &[f64; D]) -> [f64; D] {
        let mut x = [0.0; D];
        for d in 0..D {
            x[d] = self.bounds[d].0 + u[d] * self.width(d);
        }
        x
    }
}

impl<const D: usize> Default for SimulationCell<D> {
    fn default() -> Self {
        Self::unit()
    }
}
