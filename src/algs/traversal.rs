//! Neighbor-gathering tree traversal.
//!
//! Every node of the input tree that carries coefficients needs the data of
//! its left and right neighbors along one axis before a kernel can run on
//! it. The traversal is a small state machine driven entirely by
//! continuations, so no task ever waits on a remote value:
//!
//! 1. **Init**: request both neighbors from their owners.
//! 2. **Join**: once both have arrived (in either order), check them.
//! 3. **Split**: if a neighbor is more refined than this node, publish this
//!    key as an internal marker and restart at each child. The child next to
//!    the internal face takes its sibling from the parent's own data; only
//!    the outer side is looked up again.
//! 4. **Classify and apply**: with `(left, center, right)` complete, run the
//!    kernel's interior or boundary variant and publish exactly one entry.
//!
//! Input nodes without coefficients are published as internal markers
//! directly. Nothing here fences; the caller does.

use std::sync::Arc;

use crate::algs::communicator::{Priority, World};
use crate::algs::future::Future;
use crate::algs::kernel::{DiffKernel, KernelOutput, Neighborhood};
use crate::algs::stats::{StatsSnapshot, TraversalStats};
use crate::data::coeffs::CoeffBlock;
use crate::data::tree::{FunctionTree, NodeData, TreeNode};
use crate::mra_error::MraError;
use crate::topology::bc::BoundaryConds;
use crate::topology::key::{Translation, TreeKey};
use crate::topology::neighbor::neighbor;
use crate::topology::ownership::Rank;

struct Inner<const D: usize, K> {
    axis: usize,
    bc: BoundaryConds<D>,
    kernel: Arc<K>,
    priority: Priority,
    stats: TraversalStats,
}

/// Traversal engine for one kernel along one axis.
pub struct Traversal<const D: usize, K> {
    inner: Arc<Inner<D, K>>,
}

impl<const D: usize, K> Clone for Traversal<D, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Both trees of one application, captured by every task.
#[derive(Clone)]
struct Trees<const D: usize> {
    world: World,
    f: FunctionTree<D>,
    df: FunctionTree<D>,
}

impl<const D: usize, K: DiffKernel<D>> Traversal<D, K> {
    /// `priority` applies to neighbor lookups and mismatch recursion.
    pub fn new(axis: usize, bc: BoundaryConds<D>, kernel: Arc<K>, priority: Priority) -> Self {
        Self {
            inner: Arc::new(Inner {
                axis,
                bc,
                kernel,
                priority,
                stats: TraversalStats::default(),
            }),
        }
    }

    pub fn axis(&self) -> usize {
        self.inner.axis
    }

    pub fn kernel(&self) -> &K {
        &self.inner.kernel
    }

    /// Counters accumulated over every run of this engine.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Start a sweep of `f` on every worker, writing into `df`.
    ///
    /// Returns once the sweeps are queued; results are complete only after
    /// the next [`World::fence`].
    pub fn run(&self, world: &World, f: &FunctionTree<D>, df: &FunctionTree<D>) -> Result<(), MraError> {
        let trees = Trees {
            world: world.clone(),
            f: f.clone(),
            df: df.clone(),
        };
        for rank in 0..world.size() {
            let t = self.clone();
            let trees = trees.clone();
            world.submit(rank, Priority::Normal, move || t.sweep_local(&trees, rank))?;
        }
        Ok(())
    }

    fn sweep_local(&self, trees: &Trees<D>, rank: Rank) -> Result<(), MraError> {
        let entries = trees.f.local_entries(rank);
        log::debug!(
            "axis {} sweep on worker {rank}: {} local nodes",
            self.inner.axis,
            entries.len()
        );
        for (key, node) in entries {
            if !node.has_coeffs() {
                self.publish(trees, key, TreeNode::internal())?;
                continue;
            }
            let left = self.find_neighbor(trees, &key, -1)?;
            let right = self.find_neighbor(trees, &key, 1)?;
            let center = NodeData::new(key, node.coeffs().clone());
            let t = self.clone();
            let tr = trees.clone();
            trees.world.when_both(rank, Priority::Normal, &left, &right, move |l, r| {
                t.join(&tr, rank, key, l, center, r)
            });
        }
        Ok(())
    }

    /// Data of the neighbor of `key` at `step`, or an immediate zero block
    /// with the invalid key if there is none.
    fn find_neighbor(
        &self,
        trees: &Trees<D>,
        key: &TreeKey<D>,
        step: Translation,
    ) -> Result<Future<NodeData<D>>, MraError> {
        let nkey = neighbor(key, self.inner.axis, step, &self.inner.bc)?;
        if nkey.is_invalid() {
            return Ok(Future::ready(NodeData::new(
                nkey,
                CoeffBlock::zeros(trees.f.k(), D),
            )));
        }
        self.inner.stats.neighbor_request();
        Ok(trees.f.find_node(&trees.world, nkey, self.inner.priority))
    }

    // Both neighbors are in; split if either is refined further.
    fn join(
        &self,
        trees: &Trees<D>,
        here: Rank,
        key: TreeKey<D>,
        left: NodeData<D>,
        center: NodeData<D>,
        right: NodeData<D>,
    ) -> Result<(), MraError> {
        if !(left.is_empty() || right.is_empty()) {
            return self.forward(trees, here, key, left, center, right);
        }
        self.inner.stats.mismatch_split();
        log::trace!("{key}: neighbor refined further, splitting along axis {}", self.inner.axis);
        self.publish(trees, key, TreeNode::internal())?;
        for child in key.children() {
            if child.translation()[self.inner.axis] & 1 == 0 {
                self.forward(trees, here, child, left.clone(), center.clone(), center.clone())?;
            } else {
                self.forward(trees, here, child, center.clone(), center.clone(), right.clone())?;
            }
        }
        Ok(())
    }

    // Continue on the owner of `key`.
    fn forward(
        &self,
        trees: &Trees<D>,
        here: Rank,
        key: TreeKey<D>,
        left: NodeData<D>,
        center: NodeData<D>,
        right: NodeData<D>,
    ) -> Result<(), MraError> {
        let owner = trees.f.owner(&key);
        if owner == here {
            return self.step(trees, owner, key, left, center, right);
        }
        let t = self.clone();
        let tr = trees.clone();
        trees.world.submit(owner, self.inner.priority, move || {
            t.step(&tr, owner, key, left, center, right)
        })
    }

    fn step(
        &self,
        trees: &Trees<D>,
        owner: Rank,
        key: TreeKey<D>,
        left: NodeData<D>,
        center: NodeData<D>,
        right: NodeData<D>,
    ) -> Result<(), MraError> {
        let prio = self.inner.priority;
        if left.is_empty() {
            let fresh = self.find_neighbor(trees, &key, -1)?;
            let t = self.clone();
            let tr = trees.clone();
            trees.world.when_ready(owner, prio, &fresh, move |l| {
                t.join(&tr, owner, key, l, center, right)
            });
            return Ok(());
        }
        if right.is_empty() {
            let fresh = self.find_neighbor(trees, &key, 1)?;
            let t = self.clone();
            let tr = trees.clone();
            trees.world.when_ready(owner, prio, &fresh, move |r| {
                t.join(&tr, owner, key, left, center, r)
            });
            return Ok(());
        }

        let hood = Neighborhood {
            key,
            left,
            center,
            right,
        };
        if !hood.is_boundary() {
            self.inner.stats.interior();
            let d = self.inner.kernel.apply_interior(&trees.f, &hood)?;
            return self.publish(trees, key, TreeNode::leaf(d));
        }
        self.inner.stats.boundary();
        match self.inner.kernel.apply_boundary(&trees.world, &trees.f, &hood)? {
            KernelOutput::Ready(d) => self.publish(trees, key, TreeNode::leaf(d)),
            KernelOutput::Deferred { lookup, finish } => {
                let t = self.clone();
                let tr = trees.clone();
                trees.world.when_ready(owner, prio, &lookup, move |g| {
                    let d = finish(g)?;
                    t.publish(&tr, key, TreeNode::leaf(d))
                });
                Ok(())
            }
        }
    }

    fn publish(&self, trees: &Trees<D>, key: TreeKey<D>, node: TreeNode) -> Result<(), MraError> {
        trees.df.publish(key, node)?;
        self.inner.stats.publish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::stencil::DerivativeStencil;
    use crate::algs::kernel::DerivativeKernel;
    use crate::data::tree::TreeConfig;
    use crate::topology::bc::BoundaryCode;

    fn engine(bc: BoundaryConds<1>, k: usize) -> Traversal<1, DerivativeKernel<1>> {
        let (l, r) = bc.axis(0).unwrap();
        let stencil = DerivativeStencil::new(k, l, r).unwrap();
        let kernel = DerivativeKernel::new(0, bc.clone(), stencil, None, None, Priority::High);
        Traversal::new(0, bc, Arc::new(kernel), Priority::High)
    }

    #[test]
    fn uniform_level_publishes_every_leaf_once() {
        let world = World::serial(3);
        let f = FunctionTree::<1>::new(&world, &TreeConfig::unit(2, 1)).unwrap();
        for l in 0..4 {
            let key = TreeKey::new(2, [l]).unwrap();
            f.insert_leaf(key, CoeffBlock::from_vec(2, 1, vec![1.0, 0.0]).unwrap())
                .unwrap();
        }
        let df = f.empty_like();
        let t = engine(BoundaryConds::uniform(BoundaryCode::Zero), 2);
        t.run(&world, &f, &df).unwrap();
        world.fence().unwrap();

        assert_eq!(df.keys(), f.keys());
        let stats = t.stats();
        assert_eq!(stats.interior_nodes, 2);
        assert_eq!(stats.boundary_nodes, 2);
        assert_eq!(stats.published, 7);
        assert_eq!(stats.neighbor_requests, 6);
        df.verify().unwrap();
    }

    #[test]
    fn rerun_into_same_output_is_a_protocol_error() {
        let world = World::serial(1);
        let f = FunctionTree::<1>::new(&world, &TreeConfig::unit(2, 1)).unwrap();
        f.insert_leaf(TreeKey::root(), CoeffBlock::zeros(2, 1)).unwrap();
        let df = f.empty_like();
        let t = engine(BoundaryConds::periodic(), 2);
        t.run(&world, &f, &df).unwrap();
        world.fence().unwrap();
        t.run(&world, &f, &df).unwrap();
        assert!(matches!(world.fence(), Err(MraError::DuplicatePublication(_))));
    }
}
