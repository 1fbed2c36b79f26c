// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Traits and implementations for writing bits to a stream.
//!
//! ## Example
//! ```
//! use std::io::Write;
//! use bitfield_io::{BitWrite, BitWriter};
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_u8(0xD3).unwrap();
//!     writer.write_bits(0x0, 4).unwrap();
//!     writer.write_bits(0x5, 4).unwrap();
//!     writer.write_u16(0x0AF0).unwrap();
//!     writer.write_binary_str("101").unwrap();
//!     writer.flush().unwrap();
//! }
//! assert_eq!(output, vec![0xD3, 0x05, 0x0A, 0xF0, 0xA0]);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, error};

use crate::bits::{complete_bytes, BitQueue};
use crate::error::{check_width, Error, Result};

/// For writing bit fields to an underlying stream,
/// most significant bit first.
pub trait BitWrite {
    /// Writes the low `bits` bits of `value` to the stream.
    /// Any higher bits of `value` are ignored.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidBitCount`] if `bits` is larger than 64,
    /// or passes along any error from the underlying stream.
    fn write_bits(&mut self, value: u64, bits: u32) -> Result<()>;

    /// Returns true if the stream is aligned at a whole byte.
    fn byte_aligned(&self) -> bool;

    /// Pads the stream with 0 bits until is aligned at a whole byte.
    /// Does nothing if the stream is already aligned.
    fn byte_align(&mut self) -> Result<()>;

    /// Writes a single bit, which must be 0 or 1.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidBit`] for any other value.
    fn write_bit(&mut self, bit: u8) -> Result<()> {
        match bit {
            0 | 1 => self.write_bits(u64::from(bit), 1),
            _ => Err(Error::InvalidBit(bit)),
        }
    }

    /// Writes a single bit, 1 for `true` and 0 for `false`.
    fn write_bool(&mut self, bit: bool) -> Result<()> {
        self.write_bits(u64::from(bit), 1)
    }

    /// Writes a `u8` in 8 bits.
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bits(u64::from(value), 8)
    }

    /// Writes a twos-complement `i8` in 8 bits.
    fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_bits(u64::from(value as u8), 8)
    }

    /// Writes a `u16` in 16 bits, such as a UTF-16 code unit.
    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bits(u64::from(value), 16)
    }

    /// Writes a `u32` in 32 bits.
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bits(u64::from(value), 32)
    }

    /// Writes a twos-complement `i32` in 32 bits.
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bits(u64::from(value as u32), 32)
    }

    /// Writes a `u64` in 64 bits.
    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_bits(value, 64)
    }

    /// Writes a twos-complement `i64` in 64 bits.
    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_bits(value as u64, 64)
    }

    /// Writes one bit per character of a string of `'0'` and `'1'` characters,
    /// leftmost first.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidBinaryString`] without writing anything
    /// if the string holds any other character.
    fn write_binary_str(&mut self, digits: &str) -> Result<()> {
        if !digits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(Error::InvalidBinaryString(digits.to_owned()));
        }
        for digit in digits.bytes() {
            self.write_bit(digit - b'0')?;
        }
        Ok(())
    }
}

/// An error returned by [`BitWriter::into_inner`],
/// combining the writer with the error which kept it from being unwrapped.
#[derive(Debug)]
pub struct IntoInnerError<W>(W, Error);

impl<W> IntoInnerError<W> {
    /// Returns the error which caused [`BitWriter::into_inner`] to fail.
    pub fn error(&self) -> &Error {
        &self.1
    }

    /// Returns the writer, which may be used to recover or retry.
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W> fmt::Display for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.1, f)
    }
}

impl<W: fmt::Debug> std::error::Error for IntoInnerError<W> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.1)
    }
}

/// The underlying writer is only taken by methods consuming the `BitWriter`.
const CLOSED: &str = "writer is present until closed";

/// A wrapper for writing bit fields to a byte stream.
///
/// Whole bytes are passed to the underlying writer as soon as they're
/// complete, so no more than 7 bits are held between calls.
/// Wrap the underlying writer in a [`BufWriter`] to avoid
/// a system call per byte.
///
/// Flushing pads a partially written byte with 0 bits.
/// When the writer is dropped it is flushed, but since errors can't be
/// returned from `drop` they are only logged. Call [`close`](BitWriter::close)
/// or [`into_inner`](BitWriter::into_inner) to handle them.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Only `None` after `close` or `into_inner` has taken it.
    writer: Option<W>,
    queue: BitQueue,
}

impl<W: Write> BitWriter<W> {
    /// Wraps a writer around a `Write`.
    pub fn new(writer: W) -> BitWriter<W> {
        BitWriter {
            writer: Some(writer),
            queue: BitQueue::new(),
        }
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.sink_ref()
    }

    /// Returns a mutable reference to the underlying writer,
    /// or `None` if this writer isn't aligned to a whole byte.
    ///
    /// Writing to the underlying writer while bits are pending
    /// would put bytes ahead of them.
    pub fn get_mut(&mut self) -> Option<&mut W> {
        if self.byte_aligned() {
            Some(self.sink())
        } else {
            None
        }
    }

    /// Pads any partial byte, flushes the underlying writer and returns it.
    ///
    /// If an error occurs it is returned along with this writer.
    pub fn into_inner(mut self) -> std::result::Result<W, IntoInnerError<BitWriter<W>>> {
        match self.flush_bits() {
            Ok(()) => Ok(self.writer.take().expect(CLOSED)),
            Err(err) => Err(IntoInnerError(self, err)),
        }
    }

    /// Flushes this writer, then closes the underlying writer by dropping it.
    ///
    /// The underlying writer is dropped even if flushing fails.
    pub fn close(mut self) -> Result<()> {
        let result = self.flush_bits();
        drop(self.writer.take());
        result
    }

    /// Pads any partial byte with 0 bits and flushes the underlying writer.
    fn flush_bits(&mut self) -> Result<()> {
        self.byte_align()?;
        self.sink().flush()?;
        Ok(())
    }

    /// Passes every whole byte in the queue to the underlying writer.
    fn drain(&mut self) -> Result<()> {
        while let Some(byte) = self.queue.pop_byte() {
            self.sink().write_all(&[byte])?;
        }
        Ok(())
    }

    #[inline]
    fn sink_ref(&self) -> &W {
        self.writer.as_ref().expect(CLOSED)
    }

    #[inline]
    fn sink(&mut self) -> &mut W {
        self.writer.as_mut().expect(CLOSED)
    }
}

impl<W: Write> BitWriter<BufWriter<W>> {
    /// Wraps a writer around an unbuffered `Write`,
    /// buffering it with the given capacity.
    pub fn with_capacity(capacity: usize, writer: W) -> BitWriter<BufWriter<W>> {
        BitWriter::new(BufWriter::with_capacity(capacity, writer))
    }
}

impl BitWriter<BufWriter<File>> {
    /// Creates or truncates the file at the given path for writing bits.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<BitWriter<BufWriter<File>>> {
        let file = File::create(path)?;
        Ok(BitWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> BitWrite for BitWriter<W> {
    fn write_bits(&mut self, value: u64, bits: u32) -> Result<()> {
        check_width(bits)?;
        if bits <= 8 {
            self.queue.push(bits, value);
            self.drain()
        } else {
            for byte in complete_bytes(value, bits) {
                self.write_bits(u64::from(byte), 8)?;
            }
            self.write_bits(value, bits % 8)
        }
    }

    #[inline]
    fn byte_aligned(&self) -> bool {
        self.queue.is_empty()
    }

    fn byte_align(&mut self) -> Result<()> {
        self.drain()?;
        let pending = self.queue.len();
        if let Some(byte) = self.queue.pop_padded() {
            debug!("padding {} pending bits with {} zero bits", pending, 8 - pending);
            self.sink().write_all(&[byte])?;
        }
        Ok(())
    }
}

/// Writes bytes just like any [`Write`], shifting them into place
/// if the writer isn't aligned to a whole byte.
///
/// Directly maps to the underlying writer for aligned writes.
/// Flushing pads a partially written byte with 0 bits.
impl<W: Write> Write for BitWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.byte_aligned() {
            return self.sink().write(buf);
        }
        for (count, byte) in buf.iter().enumerate() {
            if let Err(err) = self.write_u8(*byte) {
                // bytes already written are reported first
                return if count == 0 { Err(err.into()) } else { Ok(count) };
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_bits().map_err(io::Error::from)
    }
}

/// Flushes the writer before it is dropped, logging any failure.
impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if self.writer.is_some() {
            if let Err(err) = self.flush_bits() {
                error!("failed to flush bit writer on drop: {}", err);
            }
        }
    }
}
