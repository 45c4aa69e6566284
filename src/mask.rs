const WORD_BITS: usize = 64;

/// A fixed-size bit mask over a node's slots.
///
/// Tracks which voxels of a leaf (or which child slots of an internal node) are
/// active. The bit count is fixed at construction and always a multiple of 64.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeMask {
    words: Box<[u64]>,
}

impl NodeMask {
    /// An all-off mask covering `bits` slots.
    pub fn new(bits: usize) -> Self {
        debug_assert_eq!(bits % WORD_BITS, 0);
        Self {
            words: vec![0; bits / WORD_BITS].into_boxed_slice(),
        }
    }

    /// An all-on mask covering `bits` slots.
    pub fn all_on(bits: usize) -> Self {
        debug_assert_eq!(bits % WORD_BITS, 0);
        Self {
            words: vec![u64::MAX; bits / WORD_BITS].into_boxed_slice(),
        }
    }

    /// The number of slots covered by this mask.
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    #[inline]
    pub fn is_on(&self, index: usize) -> bool {
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    #[inline]
    pub fn set_on(&mut self, index: usize) {
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// The number of on bits.
    pub fn count_on(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates the indices of on bits in ascending order.
    pub fn iter_on(&self) -> OnIter<'_> {
        OnIter {
            words: &self.words,
            current: self.words.first().copied().unwrap_or(0),
            word_index: 0,
        }
    }
}

/// Iterator over the on-bit indices of a [`NodeMask`], ascending.
pub struct OnIter<'a> {
    words: &'a [u64],
    current: u64,
    word_index: usize,
}

impl Iterator for OnIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                // Clear the lowest on bit.
                self.current &= self.current - 1;
                return Some(self.word_index * WORD_BITS + bit);
            }
            self.word_index += 1;
            if self.word_index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_index];
        }
    }
}
