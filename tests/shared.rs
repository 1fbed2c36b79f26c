// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

extern crate bitfield_io;

use std::sync::Arc;
use std::thread;

use bitfield_io::{BitRead, BitReader, BitWrite, BitWriter, SharedBitReader, SharedBitWriter};

const THREADS: u64 = 8;
const FIELDS: u64 = 500;

#[test]
fn test_fields_are_never_interleaved() {
    let writer = Arc::new(SharedBitWriter::new(BitWriter::new(Vec::new())));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let writer = Arc::clone(&writer);
            thread::spawn(move || {
                let mut w = &*writer;
                for _ in 0..FIELDS {
                    // a thread tag, its complement and a marker
                    w.write_bits(t << 16 | (!t & 0x7) << 13 | 0b101, 19).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let output = match Arc::try_unwrap(writer) {
        Ok(writer) => writer.into_inner().into_inner().unwrap(),
        Err(_) => panic!("writer still shared"),
    };
    assert_eq!(output.len() as u64, (THREADS * FIELDS * 19).div_ceil(8));

    let mut counts = [0; THREADS as usize];
    let mut r = BitReader::new(&output[..]);
    for _ in 0..THREADS * FIELDS {
        let field = r.read_bits(19).unwrap();
        let t = field >> 16;
        assert_eq!(field >> 13 & 0x7, !t & 0x7);
        assert_eq!(field & 0x1FFF, 0b101);
        counts[t as usize] += 1;
    }
    assert!(counts.iter().all(|&c| c == FIELDS));
}

#[test]
fn test_shared_reader() {
    let data: Vec<u8> = (0..=255).collect();
    let reader = Arc::new(SharedBitReader::new(BitReader::new(std::io::Cursor::new(data))));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reader = Arc::clone(&reader);
            thread::spawn(move || {
                let mut r = &*reader;
                let mut seen = Vec::new();
                while let Some(byte) = r.try_read_u8().unwrap() {
                    seen.push(byte);
                }
                seen
            })
        })
        .collect();

    let mut all: Vec<u8> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..=255).collect::<Vec<u8>>());
}

#[test]
fn test_lock_groups_calls() {
    let shared = SharedBitWriter::new(BitWriter::new(Vec::new()));
    {
        let mut w = shared.lock();
        w.write_bits(0x5, 4).unwrap();
        w.write_binary_str("1010").unwrap();
    }
    let mut w = &shared;
    assert!(w.byte_aligned());
    w.write_bit(1).unwrap();
    w.byte_align().unwrap();
    assert_eq!(shared.into_inner().into_inner().unwrap(), vec![0x5A, 0x80]);
}

#[test]
fn test_lock_survives_panic() {
    let reader = Arc::new(SharedBitReader::new(BitReader::new(&b"\xF0\x0F"[..])));
    let clone = Arc::clone(&reader);
    let result = thread::spawn(move || {
        let _guard = clone.lock();
        panic!("poisoning the lock");
    })
    .join();
    assert!(result.is_err());

    let mut r = &*reader;
    assert_eq!(r.read_bits(4).unwrap(), 0xF);
    assert!(!r.byte_aligned());
    r.byte_align();
    assert_eq!(r.read_u8().unwrap(), 0x0F);
}

#[test]
fn test_shared_soft_read_keeps_bits() {
    let reader = SharedBitReader::new(BitReader::new(&b"\xAB"[..]));
    let mut r = &reader;
    assert_eq!(r.try_read_u16().unwrap(), None);
    assert_eq!(r.read_u8().unwrap(), 0xAB);
    assert!(r.read_bits(1).unwrap_err().is_eof());
}
