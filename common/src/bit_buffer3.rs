//! Bit-packed 3D buffer for boolean masks.
//!
//! Same slice-major layout as [`crate::Buffer3`], one bit per voxel.

use std::ops::Index;

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A 3D buffer storing boolean values packed as bits.
///
/// Bits beyond `len` in the last word are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer3 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    depth: usize,
    len: usize,
}

impl BitBuffer3 {
    /// Create a new bit buffer filled with the given value.
    pub fn new_filled(width: usize, height: usize, depth: usize, value: bool) -> Self {
        let len = width * height * depth;
        let num_words = len.div_ceil(BITS_PER_WORD);
        let fill = if value { !0u64 } else { 0u64 };
        let mut buffer = Self {
            words: vec![fill; num_words],
            width,
            height,
            depth,
            len,
        };
        buffer.clear_padding();
        buffer
    }

    pub fn new_default(width: usize, height: usize, depth: usize) -> Self {
        Self::new_filled(width, height, depth, false)
    }

    /// Create a new bit buffer from a slice of booleans.
    ///
    /// The slice length must equal `width * height * depth`.
    pub fn from_slice(width: usize, height: usize, depth: usize, data: &[bool]) -> Self {
        let len = width * height * depth;
        assert_eq!(
            data.len(),
            len,
            "data length {} does not match dimensions {}x{}x{}={}",
            data.len(),
            width,
            height,
            depth,
            len
        );

        let mut words = vec![0u64; len.div_ceil(BITS_PER_WORD)];
        for (i, &value) in data.iter().enumerate() {
            if value {
                words[i / BITS_PER_WORD] |= 1u64 << (i % BITS_PER_WORD);
            }
        }

        Self {
            words,
            width,
            height,
            depth,
            len,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Shape as `[depth, height, width]`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        [self.depth, self.height, self.width]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    /// Get a bit value at the given linear index.
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    /// Set a bit value at the given linear index.
    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        debug_assert!(idx < self.len);
        let bit = 1u64 << (idx % BITS_PER_WORD);
        if value {
            self.words[idx / BITS_PER_WORD] |= bit;
        } else {
            self.words[idx / BITS_PER_WORD] &= !bit;
        }
    }

    #[inline]
    pub fn get_xyz(&self, x: usize, y: usize, z: usize) -> bool {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        self.get(self.index(x, y, z))
    }

    #[inline]
    pub fn set_xyz(&mut self, x: usize, y: usize, z: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        let idx = self.index(x, y, z);
        self.set(idx, value);
    }

    /// Count the number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// `self AND NOT other`, voxel by voxel.
    pub fn and_not(&self, other: &Self) -> Self {
        assert_eq!(self.shape(), other.shape(), "shape mismatch");
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| a & !b)
            .collect();
        Self {
            words,
            width: self.width,
            height: self.height,
            depth: self.depth,
            len: self.len,
        }
    }

    /// Iterate over all bit values in linear order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len).map(move |idx| self.get(idx))
    }

    fn clear_padding(&mut self) {
        let tail = self.len % BITS_PER_WORD;
        if tail == 0 {
            return;
        }
        if let Some(last) = self.words.last_mut() {
            *last &= (1u64 << tail) - 1;
        }
    }
}

/// Index by (x, y, z) coordinates.
impl Index<(usize, usize, usize)> for BitBuffer3 {
    type Output = bool;

    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &Self::Output {
        if self.get_xyz(x, y, z) {
            &true
        } else {
            &false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filled_true_has_exact_count() {
        // 5 * 5 * 3 = 75 bits, spills into a second word
        let buf = BitBuffer3::new_filled(5, 5, 3, true);
        assert_eq!(buf.len(), 75);
        assert_eq!(buf.count_ones(), 75);
        assert!(buf.iter().all(|b| b));
    }

    #[test]
    fn test_set_get_xyz() {
        let mut buf = BitBuffer3::new_default(7, 6, 4);
        buf.set_xyz(6, 5, 3, true);
        buf.set_xyz(1, 2, 0, true);
        assert!(buf.get_xyz(6, 5, 3));
        assert!(buf[(1, 2, 0)]);
        assert!(!buf.get_xyz(0, 0, 0));
        assert_eq!(buf.count_ones(), 2);

        buf.set_xyz(6, 5, 3, false);
        assert!(!buf.get_xyz(6, 5, 3));
        assert_eq!(buf.count_ones(), 1);
    }

    #[test]
    fn test_from_slice_matches_linear_layout() {
        let data: Vec<bool> = (0..24).map(|i| i % 5 == 0).collect();
        let buf = BitBuffer3::from_slice(4, 3, 2, &data);
        for (i, &expected) in data.iter().enumerate() {
            assert_eq!(buf.get(i), expected);
        }
        // (x=0, y=2, z=1) => (1 * 3 + 2) * 4 + 0 = 20
        assert!(buf.get_xyz(0, 2, 1));
    }

    #[test]
    #[should_panic(expected = "does not match dimensions")]
    fn test_from_slice_panics_on_size_mismatch() {
        BitBuffer3::from_slice(2, 2, 2, &[true; 7]);
    }

    #[test]
    fn test_and_not() {
        let a = BitBuffer3::from_slice(2, 2, 1, &[true, true, false, true]);
        let b = BitBuffer3::from_slice(2, 2, 1, &[false, true, true, false]);
        let diff = a.and_not(&b);
        assert_eq!(diff.iter().collect::<Vec<_>>(), vec![true, false, false, true]);
    }
}
