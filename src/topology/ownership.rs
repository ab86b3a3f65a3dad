//! Ownership of tree keys.
//!
//! A [`ProcessMap`] assigns every key to exactly one worker. Ownership is a
//! pure function of the key and the world size, so it never changes while a
//! derivative is being applied.

use crate::topology::key::{Level, TreeKey};

/// Index of a worker in the world.
pub type Rank = usize;

/// Rule mapping keys to owning workers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProcessMap {
    /// Scatter keys by a deterministic hash of `(level, translation)`.
    #[default]
    Hashed,
    /// Keep whole subtrees together: keys at or below `level` follow their
    /// ancestor at `level`, dealt out in translation order in contiguous
    /// blocks. Shallower keys, and levels too deep to enumerate, are hashed.
    Subtree { level: Level },
    /// Everything lives on worker 0.
    Single,
}

impl ProcessMap {
    /// Owning worker of `key` in a world of `size` workers.
    pub fn owner<const D: usize>(&self, key: &TreeKey<D>, size: usize) -> Rank {
        if size <= 1 {
            return 0;
        }
        match *self {
            ProcessMap::Single => 0,
            ProcessMap::Hashed => (hash_key(key) % size as u64) as Rank,
            ProcessMap::Subtree { level } => match key.ancestor_at(level) {
                Some(anc) if (level as usize) * D <= 64 => {
                    let per_axis = 1u128 << level;
                    let mut linear = 0u128;
                    for &l in anc.translation() {
                        linear = linear * per_axis + l as u128;
                    }
                    let total = per_axis.pow(D as u32);
                    ((linear * size as u128) / total) as Rank
                }
                _ => (hash_key(key) % size as u64) as Rank,
            },
        }
    }
}

// FNV-1a over the level and translations; stable across runs and platforms.
fn hash_key<const D: usize>(key: &TreeKey<D>) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut h = OFFSET;
    let mut mix = |v: u64| {
        for byte in v.to_le_bytes() {
            h ^= byte as u64;
            h = h.wrapping_mul(PRIME);
        }
    };
    mix(key.level() as u64);
    for &l in key.translation() {
        mix(l as u64);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_in_range_and_stable() {
        let pmap = ProcessMap::Hashed;
        for l in 0..16 {
            let key = TreeKey::<1>::new(4, [l]).unwrap();
            let a = pmap.owner(&key, 3);
            assert!(a < 3);
            assert_eq!(a, pmap.owner(&key, 3));
        }
    }

    #[test]
    fn subtree_keeps_descendants_together() {
        let pmap = ProcessMap::Subtree { level: 1 };
        let anc = TreeKey::<2>::new(1, [1, 0]).unwrap();
        let owner = pmap.owner(&anc, 4);
        for child in anc.children() {
            assert_eq!(pmap.owner(&child, 4), owner);
            for grandchild in child.children() {
                assert_eq!(pmap.owner(&grandchild, 4), owner);
            }
        }
    }

    #[test]
    fn subtree_blocks_are_ordered() {
        let pmap = ProcessMap::Subtree { level: 2 };
        let owners: Vec<Rank> = (0..4)
            .map(|l| pmap.owner(&TreeKey::<1>::new(2, [l]).unwrap(), 2))
            .collect();
        assert_eq!(owners, vec![0, 0, 1, 1]);
    }

    #[test]
    fn single_worker_owns_everything() {
        let key = TreeKey::<3>::new(3, [1, 2, 3]).unwrap();
        assert_eq!(ProcessMap::Hashed.owner(&key, 1), 0);
        assert_eq!(ProcessMap::Single.owner(&key, 8), 0);
    }
}
