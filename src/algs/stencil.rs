//! Derivative stencil blocks in the Legendre scaling basis.
//!
//! For order `k` the derivative of a piecewise-polynomial expansion couples
//! each box only to its two neighbors along the axis. The interior blocks
//! `r0`, `rm`, `rp` act on the center, right and left boxes respectively.
//! At a domain edge the missing neighbor is replaced by one-sided blocks
//! (`left_r0`/`left_rm`, `right_r0`/`right_rp`) chosen by the boundary code,
//! and a prescribed boundary value enters through the source vectors
//! `bv_left`/`bv_right`.
//!
//! Everything here is a pure function of `(k, left code, right code)`.

use crate::data::coeffs::Matrix;
use crate::data::legendre::check_order;
use crate::mra_error::MraError;
use crate::topology::bc::BoundaryCode;

/// Precomputed blocks for one `(k, axis, boundary codes)` combination.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivativeStencil {
    k: usize,
    left: BoundaryCode,
    right: BoundaryCode,
    pub r0: Matrix,
    pub rm: Matrix,
    pub rp: Matrix,
    pub left_rm: Matrix,
    pub left_r0: Matrix,
    pub right_r0: Matrix,
    pub right_rp: Matrix,
    pub bv_left: Vec<f64>,
    pub bv_right: Vec<f64>,
}

// 2 when i > j and i - j is odd.
#[inline]
fn overlap(i: usize, j: usize) -> f64 {
    if i > j && (i - j) % 2 == 1 { 2.0 } else { 0.0 }
}

#[inline]
fn gamma(i: usize, j: usize) -> f64 {
    (((2 * i + 1) * (2 * j + 1)) as f64).sqrt()
}

#[inline]
fn phase(i: usize) -> f64 {
    if i % 2 == 0 { 1.0 } else { -1.0 }
}

impl DerivativeStencil {
    /// Build the blocks for order `k` with the given codes on the two sides
    /// of the differentiation axis.
    pub fn new(k: usize, left: BoundaryCode, right: BoundaryCode) -> Result<Self, MraError> {
        use BoundaryCode::*;
        check_order(k)?;
        let kf = k as f64;
        let k2 = kf * kf;
        let kphase = phase(k);

        let mut s = Self {
            k,
            left,
            right,
            r0: Matrix::zeros(k),
            rm: Matrix::zeros(k),
            rp: Matrix::zeros(k),
            left_rm: Matrix::zeros(k),
            left_r0: Matrix::zeros(k),
            right_r0: Matrix::zeros(k),
            right_rp: Matrix::zeros(k),
            bv_left: vec![0.0; k],
            bv_right: vec![0.0; k],
        };

        // sum_l sqrt(2l+1) K_lj gamma_lj, shared by both derivative-type sides
        let phi_tmp: Vec<f64> = (0..k)
            .map(|j| {
                (0..k)
                    .map(|l| ((2 * l + 1) as f64).sqrt() * overlap(l, j) * gamma(l, j))
                    .sum()
            })
            .collect();

        for i in 0..k {
            let iphase = phase(i);
            let si = ((2 * i + 1) as f64).sqrt();
            for j in 0..k {
                let jphase = phase(j);
                let g = gamma(i, j);
                let kij = overlap(i, j);

                let r0 = 0.5 * (1.0 - iphase * jphase - 2.0 * kij) * g;
                let rm = 0.5 * jphase * g;
                let rp = -0.5 * iphase * g;
                s.r0.set(i, j, r0);
                s.rm.set(i, j, rm);
                s.rp.set(i, j, rp);

                match left {
                    Neumann | NonzeroDerivative => {
                        let shift = 0.5 * (1.0 + iphase * kphase / kf);
                        s.left_rm.set(i, j, jphase * g * shift);
                        let phi_left = -jphase * phi_tmp[j];
                        s.left_r0
                            .set(i, j, (shift - kij) * g + iphase * si * phi_left / k2);
                    }
                    Zero | Dirichlet => {
                        s.left_rm.set(i, j, rm);
                        s.left_r0.set(i, j, (0.5 - kij) * g);
                    }
                    Free => {
                        s.left_rm.set(i, j, rm);
                        s.left_r0.set(i, j, (0.5 - iphase * jphase - kij) * g);
                    }
                    Periodic => {}
                }

                match right {
                    Neumann | NonzeroDerivative => {
                        s.right_rp.set(i, j, -0.5 * (iphase + kphase / kf) * g);
                        s.right_r0.set(
                            i,
                            j,
                            -(0.5 * jphase * (iphase + kphase / kf) + kij) * g + si * phi_tmp[j] / k2,
                        );
                    }
                    Zero | Dirichlet => {
                        s.right_rp.set(i, j, rp);
                        s.right_r0.set(i, j, -(0.5 * iphase * jphase + kij) * g);
                    }
                    Free => {
                        s.right_rp.set(i, j, rp);
                        s.right_r0.set(i, j, (1.0 - 0.5 * iphase * jphase - kij) * g);
                    }
                    Periodic => {}
                }
            }
        }

        // Source vectors: odd-first phase on the left.
        for i in 0..k {
            let si = ((2 * i + 1) as f64).sqrt();
            let iphase = -phase(i);
            s.bv_left[i] = match left {
                Dirichlet => iphase * si,
                NonzeroDerivative => -iphase * si / k2,
                _ => 0.0,
            };
            s.bv_right[i] = match right {
                Dirichlet => si,
                NonzeroDerivative => si / k2,
                _ => 0.0,
            };
        }

        log::debug!("derivative stencil built: k={k}, bc {left}:{right}");
        Ok(s)
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Boundary codes `(left, right)` the blocks were built for.
    pub fn codes(&self) -> (BoundaryCode, BoundaryCode) {
        (self.left, self.right)
    }

    /// Source vector for a boundary side, or `None` if it is identically zero.
    pub fn source(&self, left_side: bool) -> Option<&[f64]> {
        let v = if left_side { &self.bv_left } else { &self.bv_right };
        v.iter().any(|&x| x != 0.0).then_some(v.as_slice())
    }
}
