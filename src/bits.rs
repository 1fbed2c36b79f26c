// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stateless bit-packing helpers and the bit accumulator
//! shared by readers and writers.

/// The widest field which may be transferred in a single call.
pub const MAX_BITS: u32 = 64;

/// Returns the low `bits` bits of `value`.
///
/// A width of 0 yields 0 and widths of 64 or more
/// return the value unchanged.
///
/// ## Example
/// ```
/// use bitfield_io::bits::mask;
/// assert_eq!(mask(0b1011_0110, 4), 0b0110);
/// assert_eq!(mask(u64::MAX, 64), u64::MAX);
/// assert_eq!(mask(u64::MAX, 0), 0);
/// ```
#[inline]
pub fn mask(value: u64, bits: u32) -> u64 {
    match bits {
        0 => 0,
        1..=63 => value & ((1 << bits) - 1),
        _ => value,
    }
}

/// Returns the complete bytes held in the low `bits` bits of `value`,
/// most significant byte first.
///
/// The `bits % 8` lowest bits don't make up a whole byte
/// and are not part of the output.
///
/// ## Example
/// ```
/// use bitfield_io::bits::complete_bytes;
/// let bytes: Vec<u8> = complete_bytes(0x0AF05, 20).collect();
/// assert_eq!(bytes, vec![0x0A, 0xF0]);
/// ```
#[inline]
pub fn complete_bytes(value: u64, bits: u32) -> CompleteBytes {
    let bits = bits.min(MAX_BITS);
    CompleteBytes {
        value: value >> (bits % 8),
        remaining: bits / 8,
    }
}

/// Iterator returned by [`complete_bytes`].
#[derive(Clone, Debug)]
pub struct CompleteBytes {
    value: u64,
    remaining: u32,
}

impl Iterator for CompleteBytes {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            Some((self.value >> (self.remaining * 8)) as u8)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for CompleteBytes {}

/// A queue of pending bits.
///
/// Bits are pushed at the least significant end and popped from
/// the most significant end, so the oldest bits always come out first.
/// Bits above the queue's length are always zero.
///
/// The queue holds up to 128 bits, which leaves room for a full
/// 64-bit field on top of a partially consumed byte.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BitQueue {
    value: u128,
    bits: u32,
}

impl BitQueue {
    /// The number of bits the queue can hold.
    pub const CAPACITY: u32 = 128;

    /// Returns a new empty queue.
    #[inline]
    pub fn new() -> BitQueue {
        BitQueue { value: 0, bits: 0 }
    }

    /// Returns the number of bits in the queue.
    #[inline]
    pub fn len(&self) -> u32 {
        self.bits
    }

    /// Returns true if the queue holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Appends the low `bits` bits of `value` to the queue.
    /// Any higher bits of `value` are ignored.
    #[inline]
    pub fn push(&mut self, bits: u32, value: u64) {
        debug_assert!(bits <= MAX_BITS);
        debug_assert!(self.bits + bits <= Self::CAPACITY);
        if bits > 0 {
            self.value = (self.value << bits) | u128::from(mask(value, bits));
            self.bits += bits;
        }
    }

    /// Removes the oldest `bits` bits from the queue and returns them.
    #[inline]
    pub fn pop(&mut self, bits: u32) -> u64 {
        debug_assert!(bits <= MAX_BITS);
        debug_assert!(bits <= self.bits);
        if bits == 0 {
            return 0;
        }
        let remaining = self.bits - bits;
        let popped = self.value >> remaining;
        self.value -= popped << remaining;
        self.bits = remaining;
        popped as u64
    }

    /// Removes the oldest whole byte from the queue, if there is one.
    #[inline]
    pub fn pop_byte(&mut self) -> Option<u8> {
        if self.bits >= 8 {
            Some(self.pop(8) as u8)
        } else {
            None
        }
    }

    /// Empties a queue holding less than a whole byte, returning
    /// its bits followed by enough 0 bits to fill a byte.
    ///
    /// Returns `None` if the queue is empty.
    #[inline]
    pub fn pop_padded(&mut self) -> Option<u8> {
        debug_assert!(self.bits < 8);
        if self.bits == 0 {
            None
        } else {
            let byte = (self.value << (8 - self.bits)) as u8;
            self.clear();
            Some(byte)
        }
    }

    /// Discards all bits in the queue.
    #[inline]
    pub fn clear(&mut self) {
        self.value = 0;
        self.bits = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_widths() {
        assert_eq!(mask(0xFF, 0), 0);
        assert_eq!(mask(0xFF, 1), 1);
        assert_eq!(mask(0xABCD, 8), 0xCD);
        assert_eq!(mask(u64::MAX, 63), u64::MAX >> 1);
        assert_eq!(mask(u64::MAX, 64), u64::MAX);
        assert_eq!(mask(u64::MAX, 100), u64::MAX);
    }

    #[test]
    fn complete_bytes_skips_partial_tail() {
        assert_eq!(complete_bytes(0xFF, 7).count(), 0);
        assert_eq!(complete_bytes(0x1FF, 9).collect::<Vec<_>>(), vec![0xFF]);
        assert_eq!(
            complete_bytes(0x0123456789ABCDEF, 64).collect::<Vec<_>>(),
            vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]
        );
        assert_eq!(complete_bytes(0xABCDEFFF, 32).len(), 4);
    }

    #[test]
    fn queue_pops_oldest_bits_first() {
        let mut q = BitQueue::new();
        q.push(2, 2);
        q.push(3, 6);
        q.push(3, 7);
        assert_eq!(q.len(), 8);
        assert_eq!(q.pop_byte(), Some(0xB7));
        assert!(q.is_empty());

        q.push(4, 0xA);
        q.push(8, 0xBC);
        assert_eq!(q.pop(4), 0xA);
        assert_eq!(q.pop(6), 0x2F);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop_byte(), None);
        assert_eq!(q.pop(2), 0);
    }

    #[test]
    fn queue_keeps_unused_bits_clean() {
        let mut q = BitQueue::new();
        q.push(3, u64::MAX);
        assert_eq!(q.pop(3), 0b111);
        assert_eq!(q, BitQueue::new());
    }

    #[test]
    fn queue_holds_full_field_over_partial_byte() {
        let mut q = BitQueue::new();
        q.push(7, 0x55);
        q.push(64, u64::MAX);
        assert_eq!(q.len(), 71);
        assert_eq!(q.pop(7), 0x55);
        assert_eq!(q.pop(64), u64::MAX);
        assert!(q.is_empty());
    }

    #[test]
    fn queue_pads_partial_byte() {
        let mut q = BitQueue::new();
        assert_eq!(q.pop_padded(), None);
        q.push(3, 0b101);
        assert_eq!(q.pop_padded(), Some(0b1010_0000));
        assert!(q.is_empty());
    }
}
