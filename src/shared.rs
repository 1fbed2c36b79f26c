// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Readers and writers which may be shared between threads.
//!
//! [`BitRead`] and [`BitWrite`] are implemented for shared references
//! to these wrappers, much like [`std::io::Write`] is for `&File`.
//! Each call holds the lock for its whole duration, so a single
//! field is never interleaved with another thread's.
//! Hold the guard from `lock` to keep several calls together.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use bitfield_io::{BitWrite, BitWriter, SharedBitWriter};
//!
//! let writer = Arc::new(SharedBitWriter::new(BitWriter::new(Vec::new())));
//! let handles: Vec<_> = (0..4u64)
//!     .map(|i| {
//!         let writer = Arc::clone(&writer);
//!         thread::spawn(move || (&*writer).write_bits(i, 16).unwrap())
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! let writer = Arc::try_unwrap(writer).ok().unwrap().into_inner();
//! assert_eq!(writer.into_inner().unwrap().len(), 8);
//! ```

use std::io::{BufRead, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::read::{BitRead, BitReader};
use crate::write::{BitWrite, BitWriter};

/// A [`BitReader`] behind a lock.
#[derive(Debug)]
pub struct SharedBitReader<R> {
    reader: Mutex<BitReader<R>>,
}

impl<R: BufRead> SharedBitReader<R> {
    /// Wraps a reader so it may be shared.
    pub fn new(reader: BitReader<R>) -> SharedBitReader<R> {
        SharedBitReader {
            reader: Mutex::new(reader),
        }
    }

    /// Locks the reader, blocking until it's available.
    ///
    /// A lock poisoned by a panicking thread is recovered,
    /// since no read leaves the reader half-updated.
    pub fn lock(&self) -> MutexGuard<'_, BitReader<R>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> BitReader<R> {
        self.reader
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: BufRead> BitRead for &SharedBitReader<R> {
    #[inline]
    fn try_read_bits(&mut self, bits: u32) -> Result<Option<u64>> {
        self.lock().try_read_bits(bits)
    }

    #[inline]
    fn read_bits(&mut self, bits: u32) -> Result<u64> {
        self.lock().read_bits(bits)
    }

    fn byte_aligned(&self) -> bool {
        self.lock().byte_aligned()
    }

    fn byte_align(&mut self) {
        self.lock().byte_align()
    }

    fn read_bits_as_string(&mut self, bits: u32) -> Result<String> {
        self.lock().read_bits_as_string(bits)
    }
}

/// A [`BitWriter`] behind a lock.
#[derive(Debug)]
pub struct SharedBitWriter<W: Write> {
    writer: Mutex<BitWriter<W>>,
}

impl<W: Write> SharedBitWriter<W> {
    /// Wraps a writer so it may be shared.
    pub fn new(writer: BitWriter<W>) -> SharedBitWriter<W> {
        SharedBitWriter {
            writer: Mutex::new(writer),
        }
    }

    /// Locks the writer, blocking until it's available.
    ///
    /// A lock poisoned by a panicking thread is recovered;
    /// a write interrupted that way loses at most the field being written.
    pub fn lock(&self) -> MutexGuard<'_, BitWriter<W>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> BitWriter<W> {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> BitWrite for &SharedBitWriter<W> {
    #[inline]
    fn write_bits(&mut self, value: u64, bits: u32) -> Result<()> {
        self.lock().write_bits(value, bits)
    }

    fn byte_aligned(&self) -> bool {
        self.lock().byte_aligned()
    }

    fn byte_align(&mut self) -> Result<()> {
        self.lock().byte_align()
    }

    fn write_binary_str(&mut self, digits: &str) -> Result<()> {
        self.lock().write_binary_str(digits)
    }
}
