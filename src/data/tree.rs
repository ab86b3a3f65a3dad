//! Distributed associative store for function trees.
//!
//! A [`FunctionTree`] maps [`TreeKey`]s to [`TreeNode`]s. Entries are spread
//! over one [`DashMap`] shard per worker according to the tree's
//! [`ProcessMap`]. The handle is cheap to clone and is captured by tasks.
//!
//! Lookups that must run where the data lives ([`FunctionTree::find_node`],
//! [`FunctionTree::find_coeffs`]) are submitted as tasks to the owner and
//! answer through a [`Future`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;

use crate::algs::communicator::{Priority, World};
use crate::algs::future::Future;
use crate::data::cell::SimulationCell;
use crate::data::coeffs::CoeffBlock;
use crate::data::legendre::{TwoScale, eval_block};
use crate::mra_error::MraError;
use crate::topology::key::{Level, Translation, TreeKey};
use crate::topology::ownership::{ProcessMap, Rank};

/// Entry of a function tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeNode {
    coeffs: CoeffBlock,
    has_children: bool,
}

impl TreeNode {
    pub fn new(coeffs: CoeffBlock, has_children: bool) -> Self {
        Self {
            coeffs,
            has_children,
        }
    }

    /// Leaf carrying coefficients.
    pub fn leaf(coeffs: CoeffBlock) -> Self {
        Self::new(coeffs, false)
    }

    /// Internal marker: no data, descend into children.
    pub fn internal() -> Self {
        Self::new(CoeffBlock::empty(), true)
    }

    pub fn coeffs(&self) -> &CoeffBlock {
        &self.coeffs
    }

    pub fn has_coeffs(&self) -> bool {
        !self.coeffs.is_empty()
    }

    pub fn has_children(&self) -> bool {
        self.has_children
    }
}

/// A key together with the coefficients found for it.
///
/// Lookups may answer with an ancestor's key and data, or with an empty
/// block when the queried box is refined further.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData<const D: usize> {
    pub key: TreeKey<D>,
    pub coeffs: CoeffBlock,
}

impl<const D: usize> NodeData<D> {
    pub fn new(key: TreeKey<D>, coeffs: CoeffBlock) -> Self {
        Self { key, coeffs }
    }

    /// True when the data lives further down the tree.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
}

/// Representation a tree is currently stored in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TreeForm {
    /// Scaling coefficients at the leaves, empty internal nodes.
    Reconstructed,
    /// Scaling coefficients at the root, differences from the parent's
    /// refinement everywhere else.
    Compressed,
}

/// Layout shared by every tree an operator touches.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TreeConfig {
    /// Wavelet order.
    pub k: usize,
    /// Physical bounds per axis.
    pub cell: Vec<(f64, f64)>,
    #[serde(default)]
    pub pmap: ProcessMap,
}

impl TreeConfig {
    /// Order `k` on the unit cube of dimension `ndim`.
    pub fn unit(k: usize, ndim: usize) -> Self {
        Self {
            k,
            cell: vec![(0.0, 1.0); ndim],
            pmap: ProcessMap::default(),
        }
    }

    pub fn with_cell(mut self, cell: Vec<(f64, f64)>) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_pmap(mut self, pmap: ProcessMap) -> Self {
        self.pmap = pmap;
        self
    }
}

struct TreeInner<const D: usize> {
    k: usize,
    cell: SimulationCell<D>,
    pmap: ProcessMap,
    shards: Vec<DashMap<TreeKey<D>, TreeNode>>,
    two_scale: Arc<TwoScale>,
    form: RwLock<TreeForm>,
    ancestor_hops: AtomicU64,
}

/// Handle to a distributed function tree.
#[derive(Clone)]
pub struct FunctionTree<const D: usize> {
    inner: Arc<TreeInner<D>>,
}

impl<const D: usize> FunctionTree<D> {
    /// Empty, reconstructed tree sharded over `world`'s workers.
    pub fn new(world: &World, config: &TreeConfig) -> Result<Self, MraError> {
        let two_scale = Arc::new(TwoScale::new(config.k)?);
        let cell = SimulationCell::from_slice(&config.cell)?;
        Ok(Self::from_parts(
            config.k,
            cell,
            config.pmap,
            world.size(),
            two_scale,
        ))
    }

    fn from_parts(
        k: usize,
        cell: SimulationCell<D>,
        pmap: ProcessMap,
        size: usize,
        two_scale: Arc<TwoScale>,
    ) -> Self {
        Self {
            inner: Arc::new(TreeInner {
                k,
                cell,
                pmap,
                shards: (0..size.max(1)).map(|_| DashMap::new()).collect(),
                two_scale,
                form: RwLock::new(TreeForm::Reconstructed),
                ancestor_hops: AtomicU64::new(0),
            }),
        }
    }

    /// Empty tree with the same order, cell, process map and world size.
    pub fn empty_like(&self) -> Self {
        Self::from_parts(
            self.inner.k,
            self.inner.cell,
            self.inner.pmap,
            self.inner.shards.len(),
            Arc::clone(&self.inner.two_scale),
        )
    }

    /// Check that `other` can be combined with `self` key by key.
    pub fn check_compatible(&self, other: &Self) -> Result<(), MraError> {
        let (a, b) = (&self.inner, &other.inner);
        if a.k != b.k || a.pmap != b.pmap || a.shards.len() != b.shards.len() {
            return Err(MraError::IncompatibleTrees(format!(
                "k {} vs {}, {:?} vs {:?}, {} vs {} workers",
                a.k,
                b.k,
                a.pmap,
                b.pmap,
                a.shards.len(),
                b.shards.len()
            )));
        }
        if a.cell != b.cell {
            return Err(MraError::IncompatibleTrees(format!(
                "cells {:?} vs {:?}",
                a.cell.bounds(),
                b.cell.bounds()
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.inner.k
    }

    pub fn cell(&self) -> &SimulationCell<D> {
        &self.inner.cell
    }

    pub fn pmap(&self) -> ProcessMap {
        self.inner.pmap
    }

    /// Number of shards (the world size the tree was built for).
    pub fn size(&self) -> usize {
        self.inner.shards.len()
    }

    pub fn two_scale(&self) -> &TwoScale {
        &self.inner.two_scale
    }

    /// Worker owning `key`.
    #[inline]
    pub fn owner(&self, key: &TreeKey<D>) -> Rank {
        self.inner.pmap.owner(key, self.inner.shards.len())
    }

    #[inline]
    fn shard(&self, key: &TreeKey<D>) -> &DashMap<TreeKey<D>, TreeNode> {
        &self.inner.shards[self.owner(key)]
    }

    pub fn form(&self) -> TreeForm {
        *self.inner.form.read()
    }

    pub fn is_compressed(&self) -> bool {
        self.form() == TreeForm::Compressed
    }

    /// Insert or replace an entry.
    pub fn replace(&self, key: TreeKey<D>, node: TreeNode) {
        self.shard(&key).insert(key, node);
    }

    /// Insert an entry that must not exist yet.
    pub fn publish(&self, key: TreeKey<D>, node: TreeNode) -> Result<(), MraError> {
        match self.shard(&key).entry(key) {
            Entry::Occupied(_) => Err(MraError::DuplicatePublication(key.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(node);
                Ok(())
            }
        }
    }

    /// Insert a leaf and mark every missing ancestor as internal.
    pub fn insert_leaf(&self, key: TreeKey<D>, coeffs: CoeffBlock) -> Result<(), MraError> {
        let expected = self.inner.k.pow(D as u32);
        if coeffs.len() != expected {
            return Err(MraError::BlockShape {
                expected,
                found: coeffs.len(),
            });
        }
        self.replace(key, TreeNode::leaf(coeffs));
        let mut cur = key;
        while let Some(parent) = cur.parent() {
            self.replace(parent, TreeNode::internal());
            cur = parent;
        }
        Ok(())
    }

    /// Local point lookup.
    pub fn get(&self, key: &TreeKey<D>) -> Option<TreeNode> {
        self.shard(key).get(key).map(|n| n.value().clone())
    }

    pub fn contains(&self, key: &TreeKey<D>) -> bool {
        self.shard(key).contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.shards.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries owned by `rank`.
    pub fn local_len(&self, rank: Rank) -> usize {
        self.inner.shards.get(rank).map_or(0, |s| s.len())
    }

    /// Snapshot of the entries owned by `rank`.
    pub fn local_entries(&self, rank: Rank) -> Vec<(TreeKey<D>, TreeNode)> {
        self.inner
            .shards
            .get(rank)
            .map(|s| {
                s.iter()
                    .map(|e| (*e.key(), e.value().clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<TreeKey<D>> {
        let mut keys: Vec<_> = self
            .inner
            .shards
            .iter()
            .flat_map(|s| s.iter().map(|e| *e.key()).collect::<Vec<_>>())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Keys without children, sorted.
    pub fn leaf_keys(&self) -> Vec<TreeKey<D>> {
        let mut keys: Vec<_> = self
            .inner
            .shards
            .iter()
            .flat_map(|s| {
                s.iter()
                    .filter(|e| !e.value().has_children())
                    .map(|e| *e.key())
                    .collect::<Vec<_>>()
            })
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Number of parent hops taken by remote lookups so far.
    pub fn ancestor_hops(&self) -> u64 {
        self.inner.ancestor_hops.load(Ordering::Relaxed)
    }

    /// Express `s`, attached to `parent`, at the scale of descendant `child`.
    pub fn parent_to_child(
        &self,
        s: &CoeffBlock,
        parent: &TreeKey<D>,
        child: &TreeKey<D>,
    ) -> Result<CoeffBlock, MraError> {
        self.inner.two_scale.parent_to_child(s, parent, child)
    }

    // --- remote lookups ---

    /// Entry for `key`, or for its nearest existing ancestor if `key` is absent.
    ///
    /// An internal node answers with its own key and an empty block. The
    /// lookup runs on the owner of `key` and hops to the owner of each
    /// ancestor in turn.
    pub fn find_node(&self, world: &World, key: TreeKey<D>, priority: Priority) -> Future<NodeData<D>> {
        let result = Future::pending();
        self.forward_lookup(world, key, result.clone(), priority);
        result
    }

    fn forward_lookup(
        &self,
        world: &World,
        key: TreeKey<D>,
        result: Future<NodeData<D>>,
        priority: Priority,
    ) {
        let tree = self.clone();
        let w = world.clone();
        if let Err(err) = world.submit(self.owner(&key), priority, move || {
            tree.serve_lookup(&w, key, result, priority)
        }) {
            world.report(err);
        }
    }

    fn serve_lookup(
        &self,
        world: &World,
        mut key: TreeKey<D>,
        result: Future<NodeData<D>>,
        priority: Priority,
    ) -> Result<(), MraError> {
        let here = self.owner(&key);
        loop {
            let found = self.inner.shards[here]
                .get(&key)
                .map(|n| n.value().coeffs().clone());
            if let Some(coeffs) = found {
                return result.set(NodeData::new(key, coeffs));
            }
            let parent = key
                .parent()
                .ok_or_else(|| MraError::MissingNode(key.to_string()))?;
            self.inner.ancestor_hops.fetch_add(1, Ordering::Relaxed);
            log::trace!("lookup {key} absent, trying parent {parent}");
            if self.owner(&parent) != here {
                self.forward_lookup(world, parent, result, priority);
                return Ok(());
            }
            key = parent;
        }
    }

    /// Coefficients of exactly `key`: projected down from an ancestor when
    /// the tree is coarser there, restricted up from the children when it is
    /// finer.
    pub fn find_coeffs(
        &self,
        world: &World,
        key: TreeKey<D>,
        priority: Priority,
    ) -> Future<NodeData<D>> {
        let out = Future::pending();
        let raw = self.find_node(world, key, priority);
        let tree = self.clone();
        let w = world.clone();
        let o = out.clone();
        world.when_ready(self.owner(&key), priority, &raw, move |found: NodeData<D>| {
            if !found.is_empty() {
                let coeffs = tree.parent_to_child(&found.coeffs, &found.key, &key)?;
                return o.set(NodeData::new(key, coeffs));
            }
            if found.key != key {
                return Err(MraError::InvalidTree {
                    key: found.key.to_string(),
                    reason: "internal node is missing a child".into(),
                });
            }
            let kids: Vec<_> = key
                .children()
                .into_iter()
                .map(|c| tree.find_coeffs(&w, c, priority))
                .collect();
            let t = tree.clone();
            w.when_all(tree.owner(&key), priority, kids, move |vals| {
                let mut acc = CoeffBlock::zeros(t.k(), D);
                for child in &vals {
                    let up = t.two_scale().child_to_parent(&child.coeffs, &child.key)?;
                    acc.axpy(1.0, &up)?;
                }
                o.set(NodeData::new(key, acc))
            });
            Ok(())
        });
        out
    }

    // --- whole-tree operations (collective; not during an application) ---

    /// Check the tree's shape in reconstructed form.
    ///
    /// Every non-root entry has an internal parent, every internal node has
    /// all `2^D` children and no coefficients, and every leaf carries a
    /// block of `k^D` coefficients.
    pub fn verify(&self) -> Result<(), MraError> {
        let expected = self.inner.k.pow(D as u32);
        let bad = |key: &TreeKey<D>, reason: &str| MraError::InvalidTree {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        for shard in &self.inner.shards {
            for entry in shard.iter() {
                let (key, node) = (entry.key(), entry.value());
                if let Some(parent) = key.parent() {
                    match self.get(&parent) {
                        None => return Err(bad(key, "parent missing")),
                        Some(p) if !p.has_children() => {
                            return Err(bad(key, "parent is marked as a leaf"));
                        }
                        _ => {}
                    }
                }
                if node.has_children() {
                    if node.has_coeffs() && !self.is_compressed() {
                        return Err(bad(key, "internal node carries coefficients"));
                    }
                    if key.children().iter().any(|c| !self.contains(c)) {
                        return Err(bad(key, "child missing"));
                    }
                } else if node.coeffs().len() != expected {
                    return Err(bad(key, "leaf has a malformed coefficient block"));
                }
            }
        }
        Ok(())
    }

    fn keys_by_level(&self) -> Vec<TreeKey<D>> {
        let mut keys = self.keys();
        keys.sort_by_key(|k| k.level());
        keys
    }

    /// Convert to [`TreeForm::Compressed`]: scaling coefficients at the root,
    /// and at every other node the difference between its own scaling
    /// coefficients and its parent's refined onto it.
    pub fn compress(&self) -> Result<(), MraError> {
        let mut form = self.inner.form.write();
        if *form == TreeForm::Compressed {
            return Ok(());
        }
        let keys = self.keys_by_level();
        let mut sums: HashMap<TreeKey<D>, CoeffBlock> = HashMap::with_capacity(keys.len());
        for key in keys.iter().rev() {
            let node = self
                .get(key)
                .ok_or_else(|| MraError::MissingNode(key.to_string()))?;
            let s = if node.has_children() {
                let mut acc = CoeffBlock::zeros(self.inner.k, D);
                for child in key.children() {
                    let cs = sums
                        .get(&child)
                        .ok_or_else(|| MraError::MissingNode(child.to_string()))?;
                    acc.axpy(1.0, &self.two_scale().child_to_parent(cs, &child)?)?;
                }
                acc
            } else {
                node.coeffs().clone()
            };
            sums.insert(*key, s);
        }
        for key in &keys {
            let Some(node) = self.get(key) else { continue };
            let s = &sums[key];
            let stored = match key.parent() {
                None => s.clone(),
                Some(parent) => {
                    let mut d = s.clone();
                    d.axpy(-1.0, &self.parent_to_child(&sums[&parent], &parent, key)?)?;
                    d
                }
            };
            self.replace(*key, TreeNode::new(stored, node.has_children()));
        }
        *form = TreeForm::Compressed;
        Ok(())
    }

    /// Convert back to [`TreeForm::Reconstructed`].
    pub fn reconstruct(&self) -> Result<(), MraError> {
        let mut form = self.inner.form.write();
        if *form == TreeForm::Reconstructed {
            return Ok(());
        }
        let keys = self.keys_by_level();
        let mut sums: HashMap<TreeKey<D>, CoeffBlock> = HashMap::with_capacity(keys.len());
        for key in &keys {
            let node = self
                .get(key)
                .ok_or_else(|| MraError::MissingNode(key.to_string()))?;
            let s = match key.parent() {
                None => node.coeffs().clone(),
                Some(parent) => {
                    let ps = sums
                        .get(&parent)
                        .ok_or_else(|| MraError::MissingNode(parent.to_string()))?;
                    let mut s = self.parent_to_child(ps, &parent, key)?;
                    s.axpy(1.0, node.coeffs())?;
                    s
                }
            };
            if node.has_children() {
                self.replace(*key, TreeNode::internal());
            } else {
                self.replace(*key, TreeNode::leaf(s.clone()));
            }
            sums.insert(*key, s);
        }
        *form = TreeForm::Reconstructed;
        Ok(())
    }

    /// L2 norm of the represented function (reconstructed form).
    pub fn norm2(&self) -> f64 {
        self.inner
            .shards
            .iter()
            .flat_map(|s| {
                s.iter()
                    .filter(|e| !e.value().has_children())
                    .map(|e| e.value().coeffs().norm2_squared())
                    .collect::<Vec<_>>()
            })
            .sum::<f64>()
            .sqrt()
    }

    /// L2 distance to `other`, which must have exactly the same leaves.
    pub fn distance(&self, other: &Self) -> Result<f64, MraError> {
        self.check_compatible(other)?;
        let mine = self.leaf_keys();
        if mine != other.leaf_keys() {
            return Err(MraError::IncompatibleTrees("leaf sets differ".into()));
        }
        let mut sum = 0.0;
        for key in &mine {
            let (Some(a), Some(b)) = (self.get(key), other.get(key)) else {
                return Err(MraError::MissingNode(key.to_string()));
            };
            let mut diff = a.coeffs().clone();
            diff.axpy(-1.0, b.coeffs())?;
            sum += diff.norm2_squared();
        }
        Ok(sum.sqrt())
    }

    /// Value of the function at physical point `x`, if `x` is inside the cell.
    pub fn eval(&self, x: &[f64; D]) -> Option<f64> {
        let u = self.inner.cell.to_unit(x);
        if u.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return None;
        }
        let mut level: Level = 0;
        loop {
            let two_n = (1i64 << level) as f64;
            let mut l = [0 as Translation; D];
            for d in 0..D {
                l[d] = ((u[d] * two_n) as Translation).min((1i64 << level) - 1);
            }
            let key = TreeKey::new(level, l)?;
            let node = self.get(&key)?;
            if !node.has_children() {
                return Some(eval_block(node.coeffs(), &key, &u));
            }
            level += 1;
        }
    }
}

impl<const D: usize> std::fmt::Debug for FunctionTree<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTree")
            .field("k", &self.inner.k)
            .field("workers", &self.inner.shards.len())
            .field("entries", &self.len())
            .field("form", &self.form())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key1(n: Level, l: Translation) -> TreeKey<1> {
        TreeKey::new(n, [l]).unwrap()
    }

    fn block(vals: &[f64]) -> CoeffBlock {
        CoeffBlock::from_vec(vals.len(), 1, vals.to_vec()).unwrap()
    }

    #[test]
    fn publish_is_write_once() {
        let world = World::serial(2);
        let tree = FunctionTree::<1>::new(&world, &TreeConfig::unit(2, 1)).unwrap();
        tree.publish(key1(1, 0), TreeNode::internal()).unwrap();
        assert_eq!(
            tree.publish(key1(1, 0), TreeNode::internal()),
            Err(MraError::DuplicatePublication("(1, [0])".into()))
        );
    }

    #[test]
    fn find_node_walks_to_ancestor() {
        let world = World::serial(3);
        let tree = FunctionTree::<1>::new(&world, &TreeConfig::unit(2, 1)).unwrap();
        tree.insert_leaf(key1(1, 0), block(&[1.0, 0.0])).unwrap();
        tree.insert_leaf(key1(1, 1), block(&[2.0, 0.0])).unwrap();

        let deep = tree.find_node(&world, key1(4, 13), Priority::Normal);
        let internal = tree.find_node(&world, TreeKey::root(), Priority::Normal);
        world.fence().unwrap();
        let deep = deep.get().unwrap();
        assert_eq!(deep.key, key1(1, 1));
        assert_eq!(deep.coeffs.as_slice(), &[2.0, 0.0]);
        assert!(internal.get().unwrap().is_empty());
        assert_eq!(tree.ancestor_hops(), 3);
    }

    #[test]
    fn find_coeffs_restricts_from_children() {
        let world = World::serial(2);
        let tree = FunctionTree::<1>::new(&world, &TreeConfig::unit(3, 1)).unwrap();
        let parent = block(&[0.5, -0.25, 0.125]);
        for child in TreeKey::<1>::root().children() {
            let c = tree
                .parent_to_child(&parent, &TreeKey::root(), &child)
                .unwrap();
            tree.insert_leaf(child, c).unwrap();
        }
        let got = tree.find_coeffs(&world, TreeKey::root(), Priority::High);
        let down = tree.find_coeffs(&world, key1(3, 2), Priority::High);
        world.fence().unwrap();
        assert!(got.get().unwrap().coeffs.max_abs_diff(&parent) < 1e-12);
        assert_eq!(down.get().unwrap().key, key1(3, 2));
        assert_eq!(down.get().unwrap().coeffs.len(), 3);
    }

    #[test]
    fn missing_root_is_a_collaborator_failure() {
        let world = World::serial(1);
        let tree = FunctionTree::<1>::new(&world, &TreeConfig::unit(2, 1)).unwrap();
        let _ = tree.find_node(&world, key1(2, 1), Priority::Normal);
        assert!(matches!(world.fence(), Err(MraError::MissingNode(_))));
    }

    #[test]
    fn compress_then_reconstruct_is_lossless() {
        let world = World::serial(2);
        let tree = FunctionTree::<1>::new(&world, &TreeConfig::unit(2, 1)).unwrap();
        tree.insert_leaf(key1(1, 0), block(&[1.0, 0.5])).unwrap();
        tree.insert_leaf(key1(2, 2), block(&[0.25, 0.0])).unwrap();
        tree.insert_leaf(key1(2, 3), block(&[-1.0, 2.0])).unwrap();
        let before: Vec<_> = tree.leaf_keys().iter().map(|k| tree.get(k)).collect();
        tree.compress().unwrap();
        assert!(tree.is_compressed());
        assert!(tree.get(&TreeKey::root()).unwrap().has_coeffs());
        tree.reconstruct().unwrap();
        assert!(!tree.get(&TreeKey::root()).unwrap().has_coeffs());
        let after: Vec<_> = tree.leaf_keys().iter().map(|k| tree.get(k)).collect();
        for (a, b) in before.iter().zip(&after) {
            let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
            assert!(a.coeffs().max_abs_diff(b.coeffs()) < 1e-12);
        }
        tree.verify().unwrap();
    }

    #[test]
    fn verify_catches_missing_child() {
        let world = World::serial(1);
        let tree = FunctionTree::<1>::new(&world, &TreeConfig::unit(2, 1)).unwrap();
        tree.insert_leaf(key1(1, 0), block(&[1.0, 0.5])).unwrap();
        assert!(matches!(
            tree.verify(),
            Err(MraError::InvalidTree { .. })
        ));
    }
}
