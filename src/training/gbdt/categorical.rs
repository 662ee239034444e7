//! Category sets for categorical splits.

use serde::{Deserialize, Serialize};

/// Set of bin indices routed left by a categorical split.
///
/// The first 64 bins live inline; larger bins spill into `overflow`, which
/// never ends in a zero word so that equal sets compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatBitset {
    bits: u64,
    overflow: Vec<u64>,
}

impl CatBitset {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn singleton(bin: u32) -> Self {
        let mut set = Self::empty();
        set.insert(bin);
        set
    }

    #[inline]
    pub fn contains(&self, bin: u32) -> bool {
        if bin < 64 {
            return (self.bits >> bin) & 1 != 0;
        }
        let (word, bit) = Self::overflow_slot(bin);
        self.overflow.get(word).is_some_and(|w| (w >> bit) & 1 != 0)
    }

    pub fn insert(&mut self, bin: u32) {
        if bin < 64 {
            self.bits |= 1 << bin;
            return;
        }
        let (word, bit) = Self::overflow_slot(bin);
        if word >= self.overflow.len() {
            self.overflow.resize(word + 1, 0);
        }
        self.overflow[word] |= 1 << bit;
    }

    /// Number of bins in the set.
    pub fn count(&self) -> u32 {
        self.bits.count_ones() + self.overflow.iter().map(|w| w.count_ones()).sum::<u32>()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0 && self.overflow.is_empty()
    }

    /// Bins in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let inline = (0..64u32).filter(move |&b| (self.bits >> b) & 1 != 0);
        let spilled = self.overflow.iter().enumerate().flat_map(|(word, &w)| {
            (0..64u32)
                .filter(move |&b| (w >> b) & 1 != 0)
                .map(move |b| 64 + word as u32 * 64 + b)
        });
        inline.chain(spilled)
    }

    #[inline]
    fn overflow_slot(bin: u32) -> (usize, u32) {
        let offset = bin - 64;
        ((offset / 64) as usize, offset % 64)
    }
}

impl FromIterator<u32> for CatBitset {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::empty();
        for bin in iter {
            set.insert(bin);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_bins() {
        let mut set = CatBitset::empty();
        assert!(set.is_empty());

        set.insert(1);
        set.insert(5);
        set.insert(63);

        assert!(set.contains(5));
        assert!(set.contains(63));
        assert!(!set.contains(0));
        assert!(!set.contains(64));
        assert_eq!(set.count(), 3);
    }

    #[test]
    fn test_overflow_bins() {
        let set: CatBitset = [2, 100, 200].into_iter().collect();
        assert!(set.contains(100));
        assert!(set.contains(200));
        assert!(!set.contains(99));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 100, 200]);
        assert_eq!(set.count(), 3);
    }

    #[test]
    fn equal_sets_compare_equal_regardless_of_insert_order() {
        let a: CatBitset = [70, 3].into_iter().collect();
        let b: CatBitset = [3, 70].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, CatBitset::singleton(3));
    }
}
