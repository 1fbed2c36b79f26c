// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bitfield_io::{BitWrite, BitWriter};

const TOTAL_BYTES: usize = 1 << 20;

#[derive(Default)]
struct ByteCounter {
    bytes: usize,
}

impl std::io::Write for ByteCounter {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes += buf.len();
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn main() {
    divan::main();
}

#[divan::bench]
fn bits() {
    let mut writer = BitWriter::new(ByteCounter::default());
    let bits = [1, 0, 1, 0, 0, 1, 0, 0];
    bits.iter()
        .cycle()
        .copied()
        .take(TOTAL_BYTES * 8)
        .try_for_each(|b| writer.write_bit(b))
        .unwrap();
    // try to do something to keep the optimizer
    // from just elminating the whole thing
    assert!(writer.into_inner().ok().unwrap().bytes == TOTAL_BYTES);
}

#[divan::bench]
fn partials() {
    let mut writer = BitWriter::new(ByteCounter::default());
    std::iter::repeat(0b01001100)
        .take((TOTAL_BYTES * 8) / 7)
        .try_for_each(|b| writer.write_bits(b, 7))
        .unwrap();
    assert!(writer.into_inner().ok().unwrap().bytes > 0);
}

#[divan::bench]
fn wholes() {
    let mut writer = BitWriter::new(ByteCounter::default());
    std::iter::repeat(0b01001100_11011011_00000000_11111111)
        .take(TOTAL_BYTES / 4)
        .try_for_each(|b| writer.write_u32(b))
        .unwrap();
    assert!(writer.into_inner().ok().unwrap().bytes == TOTAL_BYTES);
}

#[divan::bench]
fn off_by_1() {
    let mut writer = BitWriter::new(ByteCounter::default());

    writer.write_bit(1).unwrap();
    std::iter::repeat(0x0123_4567_89AB_CDEF)
        .take(TOTAL_BYTES / 8)
        .try_for_each(|b| writer.write_u64(b))
        .unwrap();
    writer.byte_align().unwrap();
    assert!(writer.into_inner().ok().unwrap().bytes == TOTAL_BYTES + 1);
}

#[divan::bench]
fn binary_strings() {
    let mut writer = BitWriter::new(ByteCounter::default());
    std::iter::repeat("10100100")
        .take(TOTAL_BYTES)
        .try_for_each(|s| writer.write_binary_str(s))
        .unwrap();
    assert!(writer.into_inner().ok().unwrap().bytes == TOTAL_BYTES);
}
