//! Legendre scaling functions, Gauss–Legendre quadrature and two-scale filters.
//!
//! The basis on the unit interval is `phi_i(x) = sqrt(2i+1) P_i(2x-1)`,
//! `i < k`, which is orthonormal on `[0, 1]`. A box at level `n` and
//! translation `l` uses `2^(n/2) phi_i(2^n x - l)`.
//!
//! The two-scale filters `H^0`, `H^1` express a parent's coefficients in the
//! basis of its lower and upper child: `s_child = H^c s_parent`. Because the
//! parent space is a subspace of the children's, `sum_c (H^c)^T H^c = I`, so
//! the transposes restrict children back to the parent exactly.

use crate::data::coeffs::{CoeffBlock, Matrix};
use crate::mra_error::MraError;
use crate::topology::key::TreeKey;

/// Largest supported wavelet order.
pub const MAX_K: usize = 30;

/// Check `1 <= k <= MAX_K`.
pub fn check_order(k: usize) -> Result<(), MraError> {
    if (1..=MAX_K).contains(&k) {
        Ok(())
    } else {
        Err(MraError::InvalidOrder(k))
    }
}

/// `P_0(x) .. P_{k-1}(x)` on `[-1, 1]`.
pub fn legendre_polynomials(x: f64, k: usize) -> Vec<f64> {
    let mut p = Vec::with_capacity(k);
    if k == 0 {
        return p;
    }
    p.push(1.0);
    if k > 1 {
        p.push(x);
    }
    for n in 2..k {
        let nf = n as f64;
        let next = ((2.0 * nf - 1.0) * x * p[n - 1] - (nf - 1.0) * p[n - 2]) / nf;
        p.push(next);
    }
    p
}

/// Normalized scaling functions `phi_0(x) .. phi_{k-1}(x)` on `[0, 1]`.
pub fn scaling_functions(x: f64, k: usize) -> Vec<f64> {
    let mut p = legendre_polynomials(2.0 * x - 1.0, k);
    for (i, v) in p.iter_mut().enumerate() {
        *v *= ((2 * i + 1) as f64).sqrt();
    }
    p
}

/// `n`-point Gauss–Legendre rule mapped to `[0, 1]` (weights sum to 1).
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let nf = n as f64;
    for i in 0..n {
        let mut z = (std::f64::consts::PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        for _ in 0..100 {
            let (pn, pn1) = legendre_pair(z, n);
            let dp = nf * (z * pn - pn1) / (z * z - 1.0);
            let dz = pn / dp;
            z -= dz;
            if dz.abs() < 1e-15 {
                break;
            }
        }
        let (pn, pn1) = legendre_pair(z, n);
        let dp = nf * (z * pn - pn1) / (z * z - 1.0);
        // Newton ran from the largest root downwards; store ascending.
        nodes[n - 1 - i] = 0.5 * (z + 1.0);
        weights[n - 1 - i] = 1.0 / ((1.0 - z * z) * dp * dp);
    }
    (nodes, weights)
}

// (P_n(z), P_{n-1}(z))
fn legendre_pair(z: f64, n: usize) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = z;
    if n == 0 {
        return (1.0, 0.0);
    }
    for m in 2..=n {
        let mf = m as f64;
        let p2 = ((2.0 * mf - 1.0) * z * p1 - (mf - 1.0) * p0) / mf;
        p0 = p1;
        p1 = p2;
    }
    (p1, p0)
}

/// Two-scale filters for order `k`.
#[derive(Clone, Debug, PartialEq)]
pub struct TwoScale {
    k: usize,
    h: [Matrix; 2],
    ht: [Matrix; 2],
}

impl TwoScale {
    pub fn new(k: usize) -> Result<Self, MraError> {
        check_order(k)?;
        let (x, w) = gauss_legendre(k);
        let phi_child: Vec<Vec<f64>> = x.iter().map(|&xq| scaling_functions(xq, k)).collect();
        let mut h = [Matrix::zeros(k), Matrix::zeros(k)];
        for (c, hc) in h.iter_mut().enumerate() {
            let phi_parent: Vec<Vec<f64>> = x
                .iter()
                .map(|&xq| scaling_functions(0.5 * (xq + c as f64), k))
                .collect();
            for i in 0..k {
                for j in 0..k {
                    let v: f64 = (0..k)
                        .map(|q| w[q] * phi_child[q][i] * phi_parent[q][j])
                        .sum();
                    hc.set(i, j, v * std::f64::consts::FRAC_1_SQRT_2);
                }
            }
        }
        let ht = [h[0].transpose(), h[1].transpose()];
        Ok(Self { k, h, ht })
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Filter mapping a parent to child `c` (0 = lower half, 1 = upper half).
    pub fn filter(&self, c: usize) -> &Matrix {
        &self.h[c & 1]
    }

    /// Express `s`, attached to `parent`, at the scale of its descendant `child`.
    ///
    /// Returns `s` unchanged when the keys coincide, when `parent` is the
    /// invalid key (implicit zero outside the domain) or when `s` is empty.
    pub fn parent_to_child<const D: usize>(
        &self,
        s: &CoeffBlock,
        parent: &TreeKey<D>,
        child: &TreeKey<D>,
    ) -> Result<CoeffBlock, MraError> {
        if s.is_empty() || parent.is_invalid() || child.is_invalid() || parent == child {
            return Ok(s.clone());
        }
        if !parent.is_ancestor_of(child) {
            return Err(MraError::InvalidTree {
                key: child.to_string(),
                reason: format!("{parent} is not an ancestor"),
            });
        }
        let mut out = s.clone();
        for level in parent.level() + 1..=child.level() {
            let shift = child.level() - level;
            let mats: Vec<&Matrix> = child
                .translation()
                .iter()
                .map(|&l| self.filter(((l >> shift) & 1) as usize))
                .collect();
            out = out.transform_all(&mats)?;
        }
        Ok(out)
    }

    /// Contribution of `child`'s coefficients to its parent's.
    pub fn child_to_parent<const D: usize>(
        &self,
        s: &CoeffBlock,
        child: &TreeKey<D>,
    ) -> Result<CoeffBlock, MraError> {
        let mats: Vec<&Matrix> = child
            .translation()
            .iter()
            .map(|&l| &self.ht[(l & 1) as usize])
            .collect();
        s.transform_all(&mats)
    }
}

/// Evaluate the expansion `s` of box `key` at the unit-cell point `x`.
///
/// `x` must lie inside the box.
pub fn eval_block<const D: usize>(s: &CoeffBlock, key: &TreeKey<D>, x: &[f64; D]) -> f64 {
    let k = s.k();
    let n = key.level();
    let two_n = (1u64 << n) as f64;
    let phis: Vec<Vec<f64>> = (0..D)
        .map(|d| scaling_functions(two_n * x[d] - key.translation()[d] as f64, k))
        .collect();
    let mut sum = 0.0;
    for (flat, &c) in s.as_slice().iter().enumerate() {
        let mut rem = flat;
        let mut prod = c;
        for d in (0..D).rev() {
            prod *= phis[d][rem % k];
            rem /= k;
        }
        sum += prod;
    }
    sum * two_n.powf(D as f64 / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrature_integrates_polynomials_exactly() {
        let (x, w) = gauss_legendre(5);
        let total: f64 = w.iter().sum();
        assert!((total - 1.0).abs() < 1e-14);
        // int_0^1 x^9 dx = 0.1
        let i9: f64 = x.iter().zip(&w).map(|(x, w)| w * x.powi(9)).sum();
        assert!((i9 - 0.1).abs() < 1e-13);
        assert!(x.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn scaling_functions_are_orthonormal() {
        let k = 6;
        let (x, w) = gauss_legendre(k);
        for i in 0..k {
            for j in 0..k {
                let g: f64 = (0..k)
                    .map(|q| {
                        let p = scaling_functions(x[q], k);
                        w[q] * p[i] * p[j]
                    })
                    .sum();
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((g - expect).abs() < 1e-12, "({i},{j}) -> {g}");
            }
        }
    }

    #[test]
    fn restriction_undoes_refinement() {
        let ts = TwoScale::new(4).unwrap();
        let parent = TreeKey::<2>::new(1, [1, 0]).unwrap();
        let s = CoeffBlock::from_vec(4, 2, (0..16).map(|v| v as f64 * 0.25 - 1.0).collect())
            .unwrap();
        let mut back = CoeffBlock::zeros(4, 2);
        for child in parent.children() {
            let c = ts.parent_to_child(&s, &parent, &child).unwrap();
            back.axpy(1.0, &ts.child_to_parent(&c, &child).unwrap())
                .unwrap();
        }
        assert!(back.max_abs_diff(&s) < 1e-12);
    }

    #[test]
    fn refinement_preserves_point_values() {
        let k = 3;
        let ts = TwoScale::new(k).unwrap();
        let parent = TreeKey::<1>::new(1, [1]).unwrap();
        let s = CoeffBlock::from_vec(k, 1, vec![0.7, -0.2, 0.05]).unwrap();
        let grandchild = TreeKey::<1>::new(3, [5]).unwrap();
        let g = ts.parent_to_child(&s, &parent, &grandchild).unwrap();
        let x = [0.69];
        let a = eval_block(&s, &parent, &x);
        let b = eval_block(&g, &grandchild, &x);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn order_is_bounded() {
        assert!(TwoScale::new(0).is_err());
        assert!(TwoScale::new(MAX_K + 1).is_err());
    }
}
