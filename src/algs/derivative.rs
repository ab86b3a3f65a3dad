//! Derivative operator along one axis.
//!
//! A [`Derivative`] is built once from a [`DerivativeConfig`] (stencil blocks
//! are precomputed at construction) and applied to any number of input
//! trees. Applications run on a [`World`]:
//!
//! ```ignore
//! let world = World::serial(4);
//! let d = Derivative::<1>::periodic(6, 0)?;
//! let df = d.apply(&world, &f)?;
//! ```
//!
//! [`Derivative::apply_deferred`] queues the work and returns the output
//! tree immediately; it is complete after the next [`World::fence`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::algs::communicator::{Priority, World};
use crate::algs::kernel::DerivativeKernel;
use crate::algs::stats::StatsSnapshot;
use crate::algs::stencil::DerivativeStencil;
use crate::algs::traversal::Traversal;
use crate::data::tree::FunctionTree;
use crate::debug_invariants::DebugInvariants;
use crate::mra_error::MraError;
use crate::topology::bc::BoundaryConds;

/// Which boundary conditions an operator uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPreset<const D: usize> {
    /// No constraint on any side.
    Free,
    /// Periodic on every axis.
    Periodic,
    Custom(BoundaryConds<D>),
}

impl<const D: usize> BoundaryPreset<D> {
    pub fn resolve(&self) -> BoundaryConds<D> {
        match self {
            BoundaryPreset::Free => BoundaryConds::free(),
            BoundaryPreset::Periodic => BoundaryConds::periodic(),
            BoundaryPreset::Custom(bc) => bc.clone(),
        }
    }
}

impl<const D: usize> From<BoundaryConds<D>> for BoundaryPreset<D> {
    fn from(bc: BoundaryConds<D>) -> Self {
        BoundaryPreset::Custom(bc)
    }
}

fn default_true() -> bool {
    true
}

fn default_chunk() -> usize {
    8
}

/// Construction parameters of a [`Derivative`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivativeConfig<const D: usize> {
    /// Wavelet order; must match the trees the operator is applied to.
    pub k: usize,
    pub axis: usize,
    pub bc: BoundaryPreset<D>,
    /// Reconstruct a compressed input instead of failing.
    #[serde(default)]
    pub allow_reconstruct: bool,
    /// Check the input tree's shape before traversing it.
    #[serde(default)]
    pub verify_tree: bool,
    /// Run neighbor lookups and mismatch recursion at high priority.
    #[serde(default = "default_true")]
    pub high_priority: bool,
    /// Functions per barrier in [`Derivative::apply_many`].
    #[serde(default = "default_chunk")]
    pub chunk_size: usize,
}

impl<const D: usize> DerivativeConfig<D> {
    pub fn new(k: usize, axis: usize, bc: impl Into<BoundaryPreset<D>>) -> Self {
        Self {
            k,
            axis,
            bc: bc.into(),
            allow_reconstruct: false,
            verify_tree: false,
            high_priority: true,
            chunk_size: default_chunk(),
        }
    }

    pub fn allow_reconstruct(mut self, yes: bool) -> Self {
        self.allow_reconstruct = yes;
        self
    }

    pub fn verify_tree(mut self, yes: bool) -> Self {
        self.verify_tree = yes;
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n;
        self
    }

    fn priority(&self) -> Priority {
        if self.high_priority {
            Priority::High
        } else {
            Priority::Normal
        }
    }
}

/// Derivative operator: precomputed stencil plus traversal engine.
#[derive(Clone)]
pub struct Derivative<const D: usize> {
    config: DerivativeConfig<D>,
    bc: BoundaryConds<D>,
    traversal: Traversal<D, DerivativeKernel<D>>,
}

impl<const D: usize> Derivative<D> {
    pub fn new(config: DerivativeConfig<D>) -> Result<Self, MraError> {
        Self::with_boundary_values(config, None, None)
    }

    /// Operator whose prescribed-value sides take their values from
    /// `g_left` and `g_right`. A missing function contributes zero.
    pub fn with_boundary_values(
        config: DerivativeConfig<D>,
        g_left: Option<FunctionTree<D>>,
        g_right: Option<FunctionTree<D>>,
    ) -> Result<Self, MraError> {
        if config.axis >= D {
            return Err(MraError::InvalidAxis {
                axis: config.axis,
                ndim: D,
            });
        }
        let bc = config.bc.resolve();
        bc.debug_assert_invariants();
        let (left, right) = bc.axis(config.axis)?;
        let stencil = DerivativeStencil::new(config.k, left, right)?;
        for g in g_left.iter().chain(g_right.iter()) {
            if g.k() != config.k {
                return Err(MraError::IncompatibleTrees(format!(
                    "boundary function has order {}, operator has {}",
                    g.k(),
                    config.k
                )));
            }
            g.reconstruct()?;
        }
        log::debug!(
            "derivative operator: k={}, axis={}, {bc}",
            config.k,
            config.axis
        );
        let priority = config.priority();
        let kernel = DerivativeKernel::new(config.axis, bc.clone(), stencil, g_left, g_right, priority);
        let traversal = Traversal::new(config.axis, bc.clone(), Arc::new(kernel), priority);
        Ok(Self {
            config,
            bc,
            traversal,
        })
    }

    /// No boundary constraint on any side.
    pub fn free_space(k: usize, axis: usize) -> Result<Self, MraError> {
        Self::new(DerivativeConfig::new(k, axis, BoundaryPreset::Free))
    }

    /// Periodic on every axis.
    pub fn periodic(k: usize, axis: usize) -> Result<Self, MraError> {
        Self::new(DerivativeConfig::new(k, axis, BoundaryPreset::Periodic))
    }

    pub fn config(&self) -> &DerivativeConfig<D> {
        &self.config
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn axis(&self) -> usize {
        self.config.axis
    }

    pub fn boundary_conditions(&self) -> &BoundaryConds<D> {
        &self.bc
    }

    pub fn stencil(&self) -> &DerivativeStencil {
        self.traversal.kernel().stencil()
    }

    /// Counters summed over every application of this operator.
    pub fn stats(&self) -> StatsSnapshot {
        self.traversal.stats()
    }

    // Everything that must hold before any task is queued.
    fn check_input(&self, world: &World, f: &FunctionTree<D>) -> Result<(), MraError> {
        if f.k() != self.config.k {
            return Err(MraError::IncompatibleTrees(format!(
                "input has order {}, operator has {}",
                f.k(),
                self.config.k
            )));
        }
        if f.size() != world.size() {
            return Err(MraError::IncompatibleTrees(format!(
                "input is sharded over {} workers, world has {}",
                f.size(),
                world.size()
            )));
        }
        if f.is_compressed() {
            if !self.config.allow_reconstruct {
                return Err(MraError::CompressedInput);
            }
            f.reconstruct()?;
        }
        for g in self.traversal.kernel().boundary_values() {
            f.check_compatible(g)?;
        }
        if self.config.verify_tree {
            f.verify()?;
        }
        Ok(())
    }

    /// Queue the derivative of `f` and return the output tree.
    ///
    /// The output is only meaningful after the next [`World::fence`].
    pub fn apply_deferred(&self, world: &World, f: &FunctionTree<D>) -> Result<FunctionTree<D>, MraError> {
        self.check_input(world, f)?;
        let df = f.empty_like();
        self.traversal.run(world, f, &df)?;
        Ok(df)
    }

    /// Derivative of `f`, fenced.
    pub fn apply(&self, world: &World, f: &FunctionTree<D>) -> Result<FunctionTree<D>, MraError> {
        let df = self.apply_deferred(world, f)?;
        world.fence()?;
        df.debug_assert_invariants();
        Ok(df)
    }

    /// Derivatives of several functions, fencing every `chunk_size` inputs.
    pub fn apply_many(
        &self,
        world: &World,
        fs: &[FunctionTree<D>],
    ) -> Result<Vec<FunctionTree<D>>, MraError> {
        let mut out = Vec::with_capacity(fs.len());
        for chunk in fs.chunks(self.config.chunk_size.max(1)) {
            for f in chunk {
                out.push(self.apply_deferred(world, f)?);
            }
            world.fence()?;
        }
        Ok(out)
    }
}

impl<const D: usize> std::fmt::Debug for Derivative<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derivative")
            .field("k", &self.config.k)
            .field("axis", &self.config.axis)
            .field("bc", &self.bc.to_string())
            .finish()
    }
}

/// Derivatives of `f` along every axis, under one set of boundary conditions.
pub fn gradient<const D: usize>(
    world: &World,
    f: &FunctionTree<D>,
    bc: impl Into<BoundaryPreset<D>>,
) -> Result<Vec<FunctionTree<D>>, MraError> {
    let bc = bc.into();
    let ops = (0..D)
        .map(|axis| Derivative::new(DerivativeConfig::new(f.k(), axis, bc.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let out = ops
        .iter()
        .map(|d| d.apply_deferred(world, f))
        .collect::<Result<Vec<_>, _>>()?;
    world.fence()?;
    Ok(out)
}

/// True if `bc` prescribes a value on either side of `axis`.
pub fn needs_boundary_values<const D: usize>(bc: &BoundaryConds<D>, axis: usize) -> Result<bool, MraError> {
    let (l, r) = bc.axis(axis)?;
    Ok(l.has_prescribed_value() || r.has_prescribed_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coeffs::CoeffBlock;
    use crate::data::tree::TreeConfig;
    use crate::topology::bc::BoundaryCode;
    use crate::topology::key::TreeKey;

    #[test]
    fn bad_axis_fails_before_any_work() {
        let err = Derivative::<2>::periodic(4, 2).unwrap_err();
        assert_eq!(err, MraError::InvalidAxis { axis: 2, ndim: 2 });
        assert!(err.is_construction_error());
    }

    #[test]
    fn compressed_input_needs_permission() {
        let world = World::serial(2);
        let f = FunctionTree::<1>::new(&world, &TreeConfig::unit(3, 1)).unwrap();
        for child in TreeKey::<1>::root().children() {
            f.insert_leaf(child, CoeffBlock::from_vec(3, 1, vec![1.0, 0.0, 0.0]).unwrap())
                .unwrap();
        }
        f.compress().unwrap();
        let strict = Derivative::<1>::periodic(3, 0).unwrap();
        assert_eq!(strict.apply(&world, &f).unwrap_err(), MraError::CompressedInput);
        assert_eq!(world.tasks_executed(), 0);

        let lenient =
            Derivative::new(DerivativeConfig::new(3, 0, BoundaryPreset::Periodic).allow_reconstruct(true))
                .unwrap();
        let df = lenient.apply(&world, &f).unwrap();
        assert!(!f.is_compressed());
        assert_eq!(df.leaf_keys(), f.leaf_keys());
    }

    #[test]
    fn order_mismatch_is_rejected() {
        let world = World::serial(1);
        let f = FunctionTree::<1>::new(&world, &TreeConfig::unit(3, 1)).unwrap();
        let d = Derivative::<1>::free_space(4, 0).unwrap();
        assert!(matches!(d.apply(&world, &f), Err(MraError::IncompatibleTrees(_))));
    }

    #[test]
    fn boundary_functions_must_match_the_input_layout() {
        let world = World::serial(2);
        let config = TreeConfig::unit(3, 1);
        let f = FunctionTree::<1>::new(&world, &config).unwrap();
        for child in TreeKey::<1>::root().children() {
            f.insert_leaf(child, CoeffBlock::from_vec(3, 1, vec![1.0, 0.5, 0.0]).unwrap())
                .unwrap();
        }
        let g_root = || CoeffBlock::from_vec(3, 1, vec![2.0, 0.0, 0.0]).unwrap();
        let bc = BoundaryConds::<1>::uniform(BoundaryCode::Dirichlet);

        let wide = FunctionTree::<1>::new(&World::serial(5), &config).unwrap();
        wide.insert_leaf(TreeKey::root(), g_root()).unwrap();
        let moved = FunctionTree::<1>::new(&world, &config.clone().with_cell(vec![(0.0, 2.0)])).unwrap();
        moved.insert_leaf(TreeKey::root(), g_root()).unwrap();

        for g in [wide, moved] {
            let d = Derivative::with_boundary_values(
                DerivativeConfig::new(3, 0, bc.clone()),
                Some(g.clone()),
                Some(g),
            )
            .unwrap();
            let err = d.apply_deferred(&world, &f).unwrap_err();
            assert!(matches!(err, MraError::IncompatibleTrees(_)), "{err:?}");
            assert!(err.is_construction_error());
        }
        world.fence().unwrap();
        assert_eq!(world.tasks_executed(), 0);
    }

    #[test]
    fn dirichlet_needs_values() {
        let bc = BoundaryConds::<1>::uniform(BoundaryCode::Dirichlet);
        assert!(needs_boundary_values(&bc, 0).unwrap());
        assert!(!needs_boundary_values(&BoundaryConds::<1>::free(), 0).unwrap());
    }
}
