#![allow(dead_code)]

use mra_derivative::algs::stencil::DerivativeStencil;
use mra_derivative::data::coeffs::{CoeffBlock, Matrix};
use mra_derivative::prelude::*;

pub fn key1(level: u32, l: i64) -> TreeKey<1> {
    TreeKey::new(level, [l]).unwrap()
}

/// 1D tree on the unit cell from explicit leaf blocks.
pub fn tree_1d(world: &World, k: usize, leaves: &[(TreeKey<1>, Vec<f64>)]) -> FunctionTree<1> {
    let tree = FunctionTree::new(world, &TreeConfig::unit(k, 1)).unwrap();
    for (key, vals) in leaves {
        tree.insert_leaf(*key, CoeffBlock::from_vec(k, 1, vals.clone()).unwrap())
            .unwrap();
    }
    tree.verify().unwrap();
    tree
}

/// Deterministic, non-trivial coefficients for box `l`.
pub fn sample_block(k: usize, seed: i64) -> Vec<f64> {
    (0..k)
        .map(|i| ((seed * 7 + i as i64 * 3) % 11) as f64 / 11.0 - 0.4)
        .collect()
}

pub fn leaf(tree: &FunctionTree<1>, level: u32, l: i64) -> Vec<f64> {
    tree.get(&key1(level, l))
        .unwrap_or_else(|| panic!("missing ({level}, [{l}])"))
        .coeffs()
        .as_slice()
        .to_vec()
}

pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

pub fn scale(a: &[f64], s: f64) -> Vec<f64> {
    a.iter().map(|x| x * s).collect()
}

pub fn apply(m: &Matrix, x: &[f64]) -> Vec<f64> {
    m.mul_vec(x)
}

/// `rp s[l-1] + r0 s[l] + rm s[l+1]` on a periodic uniform level, scaled to the unit cell.
pub fn periodic_reference(st: &DerivativeStencil, level: u32, s: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = s.len();
    let factor = (1u64 << level) as f64;
    (0..n)
        .map(|l| {
            let left = &s[(l + n - 1) % n];
            let right = &s[(l + 1) % n];
            let d = add(
                &add(&apply(&st.rp, left), &apply(&st.r0, &s[l])),
                &apply(&st.rm, right),
            );
            scale(&d, factor)
        })
        .collect()
}

pub fn max_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}
