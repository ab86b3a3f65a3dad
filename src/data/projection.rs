//! Build function trees from analytic closures.
//!
//! Coefficients of a box are obtained by `k`-point Gauss–Legendre
//! quadrature in each direction. The closure takes physical coordinates.

use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::algs::communicator::World;
use crate::data::cell::SimulationCell;
use crate::data::coeffs::{CoeffBlock, Matrix};
use crate::data::legendre::{check_order, gauss_legendre, scaling_functions};
use crate::data::tree::{FunctionTree, TreeConfig};
use crate::mra_error::MraError;
use crate::topology::key::{Level, MAX_LEVEL, Translation, TreeKey};

/// Quadrature rule and the matrix turning sampled values into coefficients.
#[derive(Clone, Debug)]
pub struct Quadrature {
    k: usize,
    nodes: Vec<f64>,
    // quad[i][q] = w_q phi_i(x_q)
    quad: Matrix,
}

impl Quadrature {
    pub fn new(k: usize) -> Result<Self, MraError> {
        check_order(k)?;
        let (nodes, weights) = gauss_legendre(k);
        let mut quad = Matrix::zeros(k);
        for (q, (&x, &w)) in nodes.iter().zip(&weights).enumerate() {
            for (i, phi) in scaling_functions(x, k).into_iter().enumerate() {
                quad.set(i, q, w * phi);
            }
        }
        Ok(Self { k, nodes, quad })
    }

    /// Coefficients of `f` on box `key`.
    pub fn project_box<const D: usize, F>(
        &self,
        f: &F,
        cell: &SimulationCell<D>,
        key: &TreeKey<D>,
    ) -> Result<CoeffBlock, MraError>
    where
        F: Fn(&[f64; D]) -> f64,
    {
        let k = self.k;
        let h = 1.0 / (1u64 << key.level()) as f64;
        let l = key.translation();
        let mut values = Vec::with_capacity(k.pow(D as u32));
        for idx in (0..D).map(|_| 0..k).multi_cartesian_product() {
            let mut u = [0.0; D];
            for d in 0..D {
                u[d] = (l[d] as f64 + self.nodes[idx[d]]) * h;
            }
            values.push(f(&cell.from_unit(&u)));
        }
        let mut block = CoeffBlock::from_vec(k, D, values)?;
        for axis in 0..D {
            block = block.transform_axis(&self.quad, axis)?;
        }
        block.scale(h.powf(D as f64 / 2.0));
        Ok(block)
    }
}

fn level_keys<const D: usize>(level: Level) -> Vec<TreeKey<D>> {
    let n: Translation = 1 << level;
    (0..D)
        .map(|_| 0..n)
        .multi_cartesian_product()
        .filter_map(|tr| {
            let mut l = [0; D];
            l.copy_from_slice(&tr);
            TreeKey::new(level, l)
        })
        .collect()
}

/// Tree with every box at `level` as a leaf.
pub fn project_uniform<const D: usize, F>(
    world: &World,
    config: &TreeConfig,
    level: Level,
    f: F,
) -> Result<FunctionTree<D>, MraError>
where
    F: Fn(&[f64; D]) -> f64 + Sync,
{
    if level > MAX_LEVEL {
        return Err(MraError::InvalidTree {
            key: format!("level {level}"),
            reason: format!("deeper than {MAX_LEVEL}"),
        });
    }
    let tree = FunctionTree::new(world, config)?;
    let quad = Quadrature::new(config.k)?;
    let cell = *tree.cell();
    let keys = level_keys::<D>(level);

    #[cfg(feature = "rayon")]
    let blocks: Vec<_> = keys
        .par_iter()
        .map(|key| quad.project_box(&f, &cell, key).map(|b| (*key, b)))
        .collect::<Result<_, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let blocks: Vec<_> = keys
        .iter()
        .map(|key| quad.project_box(&f, &cell, key).map(|b| (*key, b)))
        .collect::<Result<_, _>>()?;

    for (key, block) in blocks {
        tree.insert_leaf(key, block)?;
    }
    log::debug!("projected {} boxes at level {level}", tree.leaf_keys().len());
    Ok(tree)
}

/// Refinement controls for [`project_refined`].
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RefineOptions {
    /// Every box above this level is refined.
    pub initial_level: Level,
    /// No box is refined below this level.
    pub max_level: Level,
    /// A box becomes a leaf once its children add less than this in norm.
    pub thresh: f64,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            initial_level: 2,
            max_level: 10,
            thresh: 1e-6,
        }
    }
}

/// Adaptively refined tree: a box is split while refining it changes the
/// representation by more than `opts.thresh`.
pub fn project_refined<const D: usize, F>(
    world: &World,
    config: &TreeConfig,
    opts: RefineOptions,
    f: F,
) -> Result<FunctionTree<D>, MraError>
where
    F: Fn(&[f64; D]) -> f64,
{
    if opts.max_level > MAX_LEVEL || opts.initial_level > opts.max_level {
        return Err(MraError::InvalidTree {
            key: format!("levels {}..{}", opts.initial_level, opts.max_level),
            reason: "invalid refinement range".into(),
        });
    }
    let tree = FunctionTree::new(world, config)?;
    let quad = Quadrature::new(config.k)?;
    let cell = *tree.cell();

    let mut stack = vec![(TreeKey::<D>::root(), quad.project_box(&f, &cell, &TreeKey::root())?)];
    while let Some((key, s)) = stack.pop() {
        if key.level() >= opts.max_level {
            tree.insert_leaf(key, s)?;
            continue;
        }
        let mut kids = Vec::with_capacity(1 << D);
        let mut change = 0.0;
        for child in key.children() {
            let cs = quad.project_box(&f, &cell, &child)?;
            let mut diff = cs.clone();
            diff.axpy(-1.0, &tree.parent_to_child(&s, &key, &child)?)?;
            change += diff.norm2_squared();
            kids.push((child, cs));
        }
        if key.level() >= opts.initial_level && change.sqrt() < opts.thresh {
            tree.insert_leaf(key, s)?;
        } else {
            stack.extend(kids);
        }
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomials_are_represented_exactly() {
        let world = World::serial(2);
        let config = TreeConfig::unit(4, 1);
        let f = project_uniform::<1, _>(&world, &config, 2, |x| 1.0 - 3.0 * x[0] * x[0] * x[0])
            .unwrap();
        for &x in &[0.0, 0.13, 0.5, 0.77, 1.0] {
            let got = f.eval(&[x]).unwrap();
            assert!((got - (1.0 - 3.0 * x * x * x)).abs() < 1e-12, "x={x}");
        }
        f.verify().unwrap();
    }

    #[test]
    fn physical_cell_is_respected() {
        let world = World::serial(1);
        let config = TreeConfig::unit(3, 2).with_cell(vec![(-1.0, 1.0), (0.0, 2.0)]);
        let f = project_uniform::<2, _>(&world, &config, 1, |x| x[0] + 2.0 * x[1]).unwrap();
        assert!((f.eval(&[-0.5, 1.5]).unwrap() - 2.5).abs() < 1e-12);
        assert!(f.eval(&[1.5, 0.0]).is_none());
    }

    #[test]
    fn refinement_concentrates_near_features() {
        let world = World::serial(3);
        let config = TreeConfig::unit(5, 1);
        let opts = RefineOptions {
            initial_level: 1,
            max_level: 8,
            thresh: 1e-7,
        };
        let f = project_refined::<1, _>(&world, &config, opts, |x| (-200.0 * (x[0] - 0.3).powi(2)).exp())
            .unwrap();
        f.verify().unwrap();
        let leaves = f.leaf_keys();
        let deepest = leaves.iter().max_by_key(|k| k.level()).unwrap();
        let shallowest = leaves.iter().min_by_key(|k| k.level()).unwrap();
        assert!(deepest.level() > shallowest.level());
        let x0 = (deepest.translation()[0] as f64 + 0.5) / (1u64 << deepest.level()) as f64;
        assert!((x0 - 0.3).abs() < 0.3);
    }
}
