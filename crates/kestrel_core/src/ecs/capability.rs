//! # Capability Sets
//!
//! A growable, packed bit vector. Bit *i* stands for component kind *i*:
//! on an entity it means "slot *i* is populated", on a system it means
//! "kind *i* is required".
//!
//! ## Layout
//!
//! ```text
//! words: [ w0 (bits 0..64) | w1 (bits 64..128) | ... ]
//! len:   number of addressable bits
//! ```
//!
//! Bits at positions `>= len` are always zero, so derived equality and
//! hashing compare exactly the addressable bits.

use std::fmt;
use std::ops::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Index, Not, Shl, ShlAssign,
    Shr, ShrAssign,
};

/// Bits per storage word.
const WORD_BITS: usize = 64;

/// Number of words needed to hold `len` bits.
#[inline]
const fn words_for(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

/// Growable bit vector of per-kind presence or requirement flags.
///
/// # Example
///
/// ```rust
/// use kestrel_core::CapabilitySet;
///
/// let mut mask = CapabilitySet::new();
/// mask.set(3, true);
/// assert_eq!(mask.len(), 4);
/// assert!(mask.get(3));
/// assert!(!mask.get(10));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    /// Packed bits, 64 per word.
    words: Vec<u64>,
    /// Addressable bit count.
    len: usize,
}

impl CapabilitySet {
    /// Creates an empty set (length zero).
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
        }
    }

    /// Creates a set of `len` bits, all equal to `value`.
    #[must_use]
    pub fn with_len(len: usize, value: bool) -> Self {
        let fill = if value { u64::MAX } else { 0 };
        let mut set = Self {
            words: vec![fill; words_for(len)],
            len,
        };
        set.trim_tail();
        set
    }

    /// Creates a set with exactly the given bit indices set.
    ///
    /// The length is one past the highest index (zero for no indices).
    #[must_use]
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = Self::new();
        for index in indices {
            set.set(index, true);
        }
        set
    }

    /// Returns the number of addressable bits.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set has no addressable bits at all.
    ///
    /// See [`CapabilitySet::none`] for "no bit is set".
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if no bit is set.
    #[inline]
    #[must_use]
    pub fn none(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Returns `true` if at least one bit is set.
    #[inline]
    #[must_use]
    pub fn any(&self) -> bool {
        !self.none()
    }

    /// Counts the set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Counts the unset bits within the length.
    #[must_use]
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// Reads a bit. Out-of-range indices read as `false`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Writes a bit, growing the set when `index` is not yet addressable.
    ///
    /// Bits created by the growth default to `false`.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.len {
            self.resize(index + 1);
        }
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Changes the length. New bits are `false`; truncated bits are lost.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(words_for(len), 0);
        self.len = len;
        self.trim_tail();
    }

    /// Clears every bit without changing the length.
    pub fn reset(&mut self) {
        self.words.fill(0);
    }

    /// Drops every bit (length becomes zero).
    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    /// Returns `true` if both sets have a common set bit.
    ///
    /// Equivalent to `(&a & &b).any()` without building the intersection.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(&a, &b)| a & b != 0)
    }

    /// Returns `true` if every bit set in `other` is also set in `self`.
    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        other.words.iter().enumerate().all(|(index, &required)| {
            let present = self.words.get(index).copied().unwrap_or(0);
            required & !present == 0
        })
    }

    /// Iterates over every bit, in index order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |index| self.get(index))
    }

    /// Iterates over the indices of set bits, ascending.
    ///
    /// Uses `trailing_zeros` to skip clear regions.
    #[must_use]
    pub fn iter_ones(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Zeroes the bits of the last word that lie beyond `len`.
    fn trim_tail(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }

    /// Combines two sets word by word over the shorter length.
    fn combine(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let len = self.len.min(other.len);
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .take(words_for(len))
            .map(|(&a, &b)| op(a, b))
            .collect();
        let mut set = Self { words, len };
        set.trim_tail();
        set
    }

    /// Applies `op` in place over the shorter length; bits past it keep their value.
    fn combine_assign(&mut self, other: &Self, op: impl Fn(u64, u64) -> u64) {
        let len = self.len.min(other.len);
        let full_words = len / WORD_BITS;
        for (word, &rhs) in self.words.iter_mut().zip(&other.words).take(full_words) {
            *word = op(*word, rhs);
        }
        let rest = len % WORD_BITS;
        if rest != 0 {
            let mask = (1u64 << rest) - 1;
            let word = &mut self.words[full_words];
            let merged = op(*word, other.words[full_words]);
            *word = (*word & !mask) | (merged & mask);
        }
    }

    /// Moves every bit `shift` positions up; length grows by `shift`.
    fn shifted_left(&self, shift: usize) -> Self {
        let mut set = Self::with_len(self.len + shift, false);
        for index in self.iter_ones() {
            set.set(index + shift, true);
        }
        set
    }

    /// Moves every bit `shift` positions down; the low `shift` bits fall off.
    fn shifted_right(&self, shift: usize) -> Self {
        let mut set = Self::with_len(self.len.saturating_sub(shift), false);
        for index in self.iter_ones().filter(|&index| index >= shift) {
            set.set(index - shift, true);
        }
        set
    }
}

/// Iterator over set bit indices.
pub struct Ones<'a> {
    words: &'a [u64],
    word_idx: usize,
    current_word: u64,
}

impl<'a> Iterator for Ones<'a> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit = self.current_word.trailing_zeros() as usize;
                // Clear lowest set bit
                self.current_word &= self.current_word - 1;
                return Some(self.word_idx * WORD_BITS + bit);
            }

            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current_word = self.words[self.word_idx];
        }
    }
}

impl FromIterator<bool> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut set = Self::new();
        for (index, bit) in iter.into_iter().enumerate() {
            set.set(index, bit);
        }
        set
    }
}

impl Index<usize> for CapabilitySet {
    type Output = bool;

    /// # Panics
    ///
    /// Panics if `index >= len()`.
    fn index(&self, index: usize) -> &bool {
        assert!(
            index < self.len,
            "capability index {index} out of range (len {})",
            self.len
        );
        if self.get(index) {
            &true
        } else {
            &false
        }
    }
}

impl Not for &CapabilitySet {
    type Output = CapabilitySet;

    fn not(self) -> CapabilitySet {
        let mut set = self.clone();
        for word in &mut set.words {
            *word = !*word;
        }
        set.trim_tail();
        set
    }
}

impl Not for CapabilitySet {
    type Output = Self;

    fn not(self) -> Self {
        !&self
    }
}

impl BitAnd for &CapabilitySet {
    type Output = CapabilitySet;

    fn bitand(self, rhs: Self) -> CapabilitySet {
        self.combine(rhs, |a, b| a & b)
    }
}

impl BitOr for &CapabilitySet {
    type Output = CapabilitySet;

    fn bitor(self, rhs: Self) -> CapabilitySet {
        self.combine(rhs, |a, b| a | b)
    }
}

impl BitXor for &CapabilitySet {
    type Output = CapabilitySet;

    fn bitxor(self, rhs: Self) -> CapabilitySet {
        self.combine(rhs, |a, b| a ^ b)
    }
}

impl BitAndAssign<&CapabilitySet> for CapabilitySet {
    fn bitand_assign(&mut self, rhs: &CapabilitySet) {
        self.combine_assign(rhs, |a, b| a & b);
    }
}

impl BitOrAssign<&CapabilitySet> for CapabilitySet {
    fn bitor_assign(&mut self, rhs: &CapabilitySet) {
        self.combine_assign(rhs, |a, b| a | b);
    }
}

impl BitXorAssign<&CapabilitySet> for CapabilitySet {
    fn bitxor_assign(&mut self, rhs: &CapabilitySet) {
        self.combine_assign(rhs, |a, b| a ^ b);
    }
}

impl Shl<usize> for &CapabilitySet {
    type Output = CapabilitySet;

    fn shl(self, shift: usize) -> CapabilitySet {
        self.shifted_left(shift)
    }
}

impl Shr<usize> for &CapabilitySet {
    type Output = CapabilitySet;

    fn shr(self, shift: usize) -> CapabilitySet {
        self.shifted_right(shift)
    }
}

impl ShlAssign<usize> for CapabilitySet {
    fn shl_assign(&mut self, shift: usize) {
        *self = self.shifted_left(shift);
    }
}

impl ShrAssign<usize> for CapabilitySet {
    fn shr_assign(&mut self, shift: usize) {
        *self = self.shifted_right(shift);
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilitySet{self}")
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, bit) in self.iter().enumerate() {
            let separator = if index == 0 { " " } else { ", " };
            write!(f, "{separator}{}", u8::from(bit))?;
        }
        f.write_str(" ]")
    }
}
