//! `TreeKey`: address of a box in the implicit 2^D-ary refinement tree.
//!
//! A key is a refinement level `n` plus one translation per dimension, each
//! lying in `[0, 2^n)`. The distinguished [`TreeKey::invalid`] sentinel stands
//! for "no such node" and is produced when a boundary condition leaves a box
//! without a physical neighbor.

use std::fmt;

/// Refinement level (0 is the root box).
pub type Level = u32;
/// Integer translation of a box along one axis.
pub type Translation = i64;

/// Deepest level representable without overflowing a [`Translation`].
pub const MAX_LEVEL: Level = 60;

/// A box in the refinement tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeKey<const D: usize> {
    level: Level,
    translation: [Translation; D],
}

impl<const D: usize> TreeKey<D> {
    /// Root box covering the whole simulation cell.
    pub const fn root() -> Self {
        Self {
            level: 0,
            translation: [0; D],
        }
    }

    /// Sentinel key denoting "no neighbor".
    pub const fn invalid() -> Self {
        Self {
            level: Level::MAX,
            translation: [0; D],
        }
    }

    /// Create a key, returning `None` if any translation lies outside `[0, 2^level)`.
    pub fn new(level: Level, translation: [Translation; D]) -> Option<Self> {
        if level > MAX_LEVEL {
            return None;
        }
        let two2n = 1i64 << level;
        if translation.iter().all(|&l| (0..two2n).contains(&l)) {
            Some(Self { level, translation })
        } else {
            None
        }
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn translation(&self) -> &[Translation; D] {
        &self.translation
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.level == Level::MAX
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.is_invalid()
    }

    /// Returns the parent key, or `None` for the root or the invalid key.
    pub fn parent(&self) -> Option<Self> {
        if self.level == 0 || self.is_invalid() {
            return None;
        }
        let mut translation = self.translation;
        for l in &mut translation {
            *l >>= 1;
        }
        Some(Self {
            level: self.level - 1,
            translation,
        })
    }

    /// Ancestor at `level`, or `None` if `level` is deeper than this key.
    pub fn ancestor_at(&self, level: Level) -> Option<Self> {
        if self.is_invalid() || level > self.level {
            return None;
        }
        let shift = self.level - level;
        let mut translation = self.translation;
        for l in &mut translation {
            *l >>= shift;
        }
        Some(Self { level, translation })
    }

    /// True if `self` is `other` or one of its ancestors.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.ancestor_at(self.level).is_some_and(|a| a == *self)
    }

    /// Returns the `2^D` children of this key, ordered by child index.
    ///
    /// Bit `d` of the child index selects the lower (0) or upper (1) half
    /// along axis `d`.
    pub fn children(&self) -> Vec<Self> {
        let count = 1usize << D;
        let mut children = Vec::with_capacity(count);
        for idx in 0..count {
            let mut translation = [0; D];
            for (axis, t) in translation.iter_mut().enumerate() {
                let bit = ((idx >> axis) & 1) as Translation;
                *t = self.translation[axis] * 2 + bit;
            }
            children.push(Self {
                level: self.level + 1,
                translation,
            });
        }
        children
    }

    /// The key one step along `axis`, without any boundary handling.
    ///
    /// The raw translation may fall outside the domain; see
    /// [`crate::topology::neighbor`] for the boundary-aware version.
    pub(crate) fn with_translation(&self, axis: usize, l: Translation) -> Self {
        let mut translation = self.translation;
        translation[axis] = l;
        Self {
            level: self.level,
            translation,
        }
    }
}

impl<const D: usize> Default for TreeKey<D> {
    fn default() -> Self {
        Self::root()
    }
}

impl<const D: usize> fmt::Debug for TreeKey<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<const D: usize> fmt::Display for TreeKey<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "(invalid)")
        } else {
            write!(f, "({}, {:?})", self.level, self.translation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range_translations() {
        assert!(TreeKey::<1>::new(2, [3]).is_some());
        assert!(TreeKey::<1>::new(2, [4]).is_none());
        assert!(TreeKey::<2>::new(1, [0, -1]).is_none());
    }

    #[test]
    fn children_and_parent_agree() {
        let key = TreeKey::<2>::new(2, [1, 3]).unwrap();
        let kids = key.children();
        assert_eq!(kids.len(), 4);
        for child in &kids {
            assert_eq!(child.parent(), Some(key));
            assert!(key.is_ancestor_of(child));
        }
        assert_eq!(*kids[0].translation(), [2, 6]);
        assert_eq!(*kids[1].translation(), [3, 6]);
        assert_eq!(*kids[2].translation(), [2, 7]);
    }

    #[test]
    fn invalid_has_no_parent() {
        let bad = TreeKey::<3>::invalid();
        assert!(bad.is_invalid());
        assert!(bad.parent().is_none());
        assert!(TreeKey::<3>::root().parent().is_none());
        assert_eq!(bad.to_string(), "(invalid)");
    }

    #[test]
    fn ancestor_at_shifts_every_axis() {
        let key = TreeKey::<2>::new(3, [5, 6]).unwrap();
        assert_eq!(key.ancestor_at(1), TreeKey::new(1, [1, 1]));
        assert_eq!(key.ancestor_at(3), Some(key));
        assert_eq!(key.ancestor_at(4), None);
    }
}
