//! Dense coefficient storage.
//!
//! [`CoeffBlock`] is the `k^ndim` array of expansion coefficients attached
//! to one tree box, stored row-major (axis 0 slowest). An *empty* block has
//! no values at all and marks a box whose data lives in its children.
//! [`Matrix`] is a square `k x k` operator block.

use crate::mra_error::MraError;

/// Square row-major matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from row-major values.
    pub fn from_rows(n: usize, data: Vec<f64>) -> Result<Self, MraError> {
        if data.len() != n * n {
            return Err(MraError::BlockShape {
                expected: n * n,
                found: data.len(),
            });
        }
        Ok(Self { n, data })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        self.data[i * self.n + j] = v;
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.n);
        for i in 0..self.n {
            for j in 0..self.n {
                t.set(j, i, self.get(i, j));
            }
        }
        t
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `y = M x` for a length-`n` vector.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|i| (0..self.n).map(|j| self.get(i, j) * x[j]).sum())
            .collect()
    }
}

/// Coefficients of one box: `k` values per axis, `ndim` axes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoeffBlock {
    k: usize,
    ndim: usize,
    data: Vec<f64>,
}

impl CoeffBlock {
    /// The empty block ("no data here").
    pub fn empty() -> Self {
        Self::default()
    }

    /// Zero-filled block of the canonical shape.
    pub fn zeros(k: usize, ndim: usize) -> Self {
        Self {
            k,
            ndim,
            data: vec![0.0; k.pow(ndim as u32)],
        }
    }

    /// Wrap row-major values; `data.len()` must be `k^ndim`.
    pub fn from_vec(k: usize, ndim: usize, data: Vec<f64>) -> Result<Self, MraError> {
        let expected = k.pow(ndim as u32);
        if data.len() != expected || k == 0 {
            return Err(MraError::BlockShape {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { k, ndim, data })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Linear offset of a multi-index.
    #[inline]
    pub fn offset(&self, idx: &[usize]) -> usize {
        idx.iter().fold(0, |acc, &i| acc * self.k + i)
    }

    pub fn get(&self, idx: &[usize]) -> f64 {
        self.data[self.offset(idx)]
    }

    pub fn set(&mut self, idx: &[usize], v: f64) {
        let o = self.offset(idx);
        self.data[o] = v;
    }

    /// Distance in the flat array between consecutive indices along `axis`.
    #[inline]
    fn stride(&self, axis: usize) -> usize {
        self.k.pow((self.ndim - 1 - axis) as u32)
    }

    pub fn scale(&mut self, s: f64) {
        for v in &mut self.data {
            *v *= s;
        }
    }

    pub fn scaled(mut self, s: f64) -> Self {
        self.scale(s);
        self
    }

    /// `self += alpha * other`; an empty `self` adopts `other`'s shape.
    pub fn axpy(&mut self, alpha: f64, other: &CoeffBlock) -> Result<(), MraError> {
        if self.is_empty() {
            *self = other.clone().scaled(alpha);
            return Ok(());
        }
        if other.data.len() != self.data.len() {
            return Err(MraError::BlockShape {
                expected: self.data.len(),
                found: other.data.len(),
            });
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += alpha * b;
        }
        Ok(())
    }

    /// Contract `m` against the index along `axis`:
    /// `out[.., i, ..] = sum_j m[i][j] * self[.., j, ..]`.
    pub fn transform_axis(&self, m: &Matrix, axis: usize) -> Result<CoeffBlock, MraError> {
        if self.is_empty() {
            return Ok(CoeffBlock::empty());
        }
        if axis >= self.ndim {
            return Err(MraError::InvalidAxis {
                axis,
                ndim: self.ndim,
            });
        }
        if m.dim() != self.k {
            return Err(MraError::BlockShape {
                expected: self.k,
                found: m.dim(),
            });
        }
        let k = self.k;
        let stride = self.stride(axis);
        let span = stride * k;
        let mut out = vec![0.0; self.data.len()];
        for base in (0..self.data.len()).step_by(span) {
            for inner in 0..stride {
                let at = |i: usize| base + i * stride + inner;
                for i in 0..k {
                    let mut acc = 0.0;
                    for j in 0..k {
                        acc += m.get(i, j) * self.data[at(j)];
                    }
                    out[at(i)] = acc;
                }
            }
        }
        Ok(CoeffBlock {
            k,
            ndim: self.ndim,
            data: out,
        })
    }

    /// Apply `m` along every axis in turn.
    pub fn transform_all(&self, ms: &[&Matrix]) -> Result<CoeffBlock, MraError> {
        let mut out = self.clone();
        for (axis, m) in ms.iter().enumerate() {
            out = out.transform_axis(m, axis)?;
        }
        Ok(out)
    }

    /// Slice at index `i` along `axis`, as a `(ndim-1)`-dimensional flat vector.
    pub fn slice_axis(&self, axis: usize, i: usize) -> Vec<f64> {
        let stride = self.stride(axis);
        let span = stride * self.k;
        let mut out = Vec::with_capacity(self.data.len() / self.k.max(1));
        for base in (0..self.data.len()).step_by(span.max(1)) {
            for inner in 0..stride {
                out.push(self.data[base + i * stride + inner]);
            }
        }
        out
    }

    /// Inverse of [`CoeffBlock::slice_axis`] for an outer product:
    /// `out[.., i, ..] = v[i] * rest[..]`.
    pub fn outer_along_axis(k: usize, ndim: usize, axis: usize, v: &[f64], rest: &[f64]) -> Self {
        let mut block = CoeffBlock::zeros(k, ndim);
        let stride = block.stride(axis);
        let span = stride * k;
        let mut r = 0;
        for base in (0..block.data.len()).step_by(span) {
            for inner in 0..stride {
                for (i, vi) in v.iter().enumerate() {
                    block.data[base + i * stride + inner] = vi * rest[r];
                }
                r += 1;
            }
        }
        block
    }

    /// Sum of squares of all coefficients.
    pub fn norm2_squared(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    pub fn norm2(&self) -> f64 {
        self.norm2_squared().sqrt()
    }

    /// Largest absolute elementwise difference; `f64::INFINITY` on shape mismatch.
    pub fn max_abs_diff(&self, other: &CoeffBlock) -> f64 {
        if self.data.len() != other.data.len() {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}
