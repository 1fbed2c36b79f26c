// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Traits and implementations for reading bits from a stream.
//!
//! ## Example
//! ```
//! use std::io::Cursor;
//! use std::io::Read;
//! use bitfield_io::{BitRead, BitReader};
//!
//! let data: Vec<u8> = vec![0xD3, 0x0A, 0xF0, 0xAB, 0xCD, 0xEF, 0xFF, 0x3A];
//!
//! let mut cursor = Cursor::new(&data);
//! {
//!     let mut reader = BitReader::new(&mut cursor);
//!     assert_eq!(reader.read_u8().unwrap(), 0xD3);
//!     assert_eq!(reader.read_bits(4).unwrap(), 0x0);
//!     assert_eq!(reader.read_bits(4).unwrap(), 0xA);
//!     assert_eq!(reader.read_bit().unwrap(), Some(1));
//!     assert_eq!(reader.read_bits(7).unwrap(), 0x70);
//!     assert_eq!(reader.read_i32().unwrap(), 0xABCDEFFFu32 as i32);
//! }
//!
//! // the wrapped reader can be used once bit reading is finished
//! // at exactly the position one would expect
//! let mut rest = Vec::new();
//! cursor.read_to_end(&mut rest).unwrap();
//! assert_eq!(rest, vec![0x3A]);
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use log::debug;

use crate::bits::BitQueue;
use crate::error::{check_width, Error, Result};

/// For reading bit fields from an underlying stream,
/// most significant bit first.
///
/// Every read comes in two flavors.
/// The plain methods fail with [`Error::UnexpectedEof`]
/// if the stream ends before the requested bits are available,
/// while the `try_` methods return `Ok(None)` instead.
pub trait BitRead {
    /// Reads an unsigned value of up to 64 bits from the stream,
    /// returning `None` if the stream ends first.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidBitCount`] if `bits` is larger than 64,
    /// or passes along any error from the underlying stream.
    fn try_read_bits(&mut self, bits: u32) -> Result<Option<u64>>;

    /// Returns true if the stream is aligned at a whole byte.
    fn byte_aligned(&self) -> bool;

    /// Throws away all unread bit values until the next whole byte.
    fn byte_align(&mut self);

    /// Reads an unsigned value of up to 64 bits from the stream.
    ///
    /// The first bits read from the stream are the most significant
    /// bits of the result.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnexpectedEof`] if the stream
    /// ends before `bits` bits could be read.
    fn read_bits(&mut self, bits: u32) -> Result<u64> {
        self.try_read_bits(bits)?.ok_or(Error::UnexpectedEof)
    }

    /// Reads a single bit, returning `None` at the end of the stream.
    fn read_bit(&mut self) -> Result<Option<u8>> {
        self.try_read_bits(1).map(|bit| bit.map(|b| b as u8))
    }

    /// Reads a single bit as a `bool`, 1 being `true`.
    fn read_bool(&mut self) -> Result<bool> {
        self.read_bits(1).map(|bit| bit % 2 == 1)
    }

    /// Reads a single bit as a `bool`, or `None` at the end of the stream.
    fn try_read_bool(&mut self) -> Result<Option<bool>> {
        self.try_read_bits(1).map(|bit| bit.map(|b| b % 2 == 1))
    }

    /// Reads the next 8 bits as a `u8`.
    fn read_u8(&mut self) -> Result<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    /// Reads the next 8 bits as a `u8`, or `None` at the end of the stream.
    fn try_read_u8(&mut self) -> Result<Option<u8>> {
        self.try_read_bits(8).map(|v| v.map(|v| v as u8))
    }

    /// Reads the next 8 bits as a twos-complement `i8`.
    fn read_i8(&mut self) -> Result<i8> {
        self.read_bits(8).map(|v| v as u8 as i8)
    }

    /// Reads the next 8 bits as a twos-complement `i8`,
    /// or `None` at the end of the stream.
    fn try_read_i8(&mut self) -> Result<Option<i8>> {
        self.try_read_bits(8).map(|v| v.map(|v| v as u8 as i8))
    }

    /// Reads the next 16 bits as a `u16`, such as a UTF-16 code unit.
    fn read_u16(&mut self) -> Result<u16> {
        self.read_bits(16).map(|v| v as u16)
    }

    /// Reads the next 16 bits as a `u16`, or `None` at the end of the stream.
    fn try_read_u16(&mut self) -> Result<Option<u16>> {
        self.try_read_bits(16).map(|v| v.map(|v| v as u16))
    }

    /// Reads the next 32 bits as a `u32`.
    fn read_u32(&mut self) -> Result<u32> {
        self.read_bits(32).map(|v| v as u32)
    }

    /// Reads the next 32 bits as a `u32`, or `None` at the end of the stream.
    fn try_read_u32(&mut self) -> Result<Option<u32>> {
        self.try_read_bits(32).map(|v| v.map(|v| v as u32))
    }

    /// Reads the next 32 bits as a twos-complement `i32`.
    fn read_i32(&mut self) -> Result<i32> {
        self.read_bits(32).map(|v| v as u32 as i32)
    }

    /// Reads the next 32 bits as a twos-complement `i32`,
    /// or `None` at the end of the stream.
    fn try_read_i32(&mut self) -> Result<Option<i32>> {
        self.try_read_bits(32).map(|v| v.map(|v| v as u32 as i32))
    }

    /// Reads the next 64 bits as a `u64`.
    fn read_u64(&mut self) -> Result<u64> {
        self.read_bits(64)
    }

    /// Reads the next 64 bits as a `u64`, or `None` at the end of the stream.
    fn try_read_u64(&mut self) -> Result<Option<u64>> {
        self.try_read_bits(64)
    }

    /// Reads the next 64 bits as a twos-complement `i64`.
    fn read_i64(&mut self) -> Result<i64> {
        self.read_bits(64).map(|v| v as i64)
    }

    /// Reads the next 64 bits as a twos-complement `i64`,
    /// or `None` at the end of the stream.
    fn try_read_i64(&mut self) -> Result<Option<i64>> {
        self.try_read_bits(64).map(|v| v.map(|v| v as i64))
    }

    /// Reads the next `bits` bits as a string of `'0'` and `'1'` characters.
    ///
    /// The leftmost characters are the first bits read from the stream.
    /// Unlike [`read_bits`](BitRead::read_bits) there is no limit on
    /// the number of bits.
    ///
    /// ## Example
    /// ```
    /// use bitfield_io::{BitRead, BitReader};
    /// let mut reader = BitReader::new(&b"\x3A"[..]);
    /// assert_eq!(reader.read_bits_as_string(8).unwrap(), "00111010");
    /// ```
    fn read_bits_as_string(&mut self, bits: u32) -> Result<String> {
        let mut digits = String::with_capacity(bits as usize);
        let mut remaining = bits;
        while remaining > 0 {
            let chunk = remaining.min(64);
            let value = self.read_bits(chunk)?;
            digits.push_str(&format!("{:0width$b}", value, width = chunk as usize));
            remaining -= chunk;
        }
        Ok(digits)
    }
}

/// A wrapper for reading bit fields from a byte stream.
///
/// Bytes are pulled from the stream one at a time, only when the bits
/// buffered so far can't satisfy a read, so no more than 7 unread bits
/// are held between calls.
/// A [`BufRead`] is required because this reader is liable to make
/// many single-byte reads to the stream in normal operation.
///
/// If a plain read runs out of input partway through, the bits gathered
/// for it are discarded, so every later read fails too.
/// A `try_` read which runs out leaves them queued,
/// so a shorter read may still succeed.
#[derive(Debug)]
pub struct BitReader<R> {
    reader: R,
    queue: BitQueue,
}

impl<R: BufRead> BitReader<R> {
    /// Wraps a reader around a `BufRead`.
    pub fn new(reader: R) -> BitReader<R> {
        BitReader {
            reader,
            queue: BitQueue::new(),
        }
    }

    /// Reads the next whole byte, or returns `None` at the end of the stream.
    ///
    /// The byte needn't be aligned in the underlying stream.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        match self.read_u8() {
            Ok(byte) => Ok(Some(byte)),
            Err(Error::UnexpectedEof) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Returns an estimate of the number of whole bytes which may be read.
    ///
    /// This counts the whole bytes still queued in the reader plus
    /// the bytes buffered by the underlying reader, so it never exceeds
    /// that reader's buffer capacity and says nothing of the rest of
    /// the stream.
    /// If that buffer is empty it is refilled first,
    /// which may block.
    pub fn available(&mut self) -> Result<usize> {
        let buffered = self.reader.fill_buf()?.len();
        Ok(self.queue.len() as usize / 8 + buffered)
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns a mutable reference to the underlying reader,
    /// or `None` if this reader isn't aligned to a whole byte.
    ///
    /// Reading from the underlying reader while unread bits
    /// are pending would pull bytes out from under them.
    pub fn get_mut(&mut self) -> Option<&mut R> {
        if self.byte_aligned() {
            Some(&mut self.reader)
        } else {
            None
        }
    }

    /// Unwraps this reader, returning the underlying reader.
    ///
    /// Any bits of a partially read byte are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Pulls bytes from the stream until at least `bits` bits are queued.
    ///
    /// Returns false if the stream ends first,
    /// leaving whatever bits were pulled queued.
    fn fill(&mut self, bits: u32) -> Result<bool> {
        while self.queue.len() < bits {
            match read_byte(&mut self.reader)? {
                Some(byte) => self.queue.push(8, u64::from(byte)),
                None => {
                    debug!(
                        "end of input with {} of {} requested bits available",
                        self.queue.len(),
                        bits
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

impl<R: Read> BitReader<BufReader<R>> {
    /// Wraps a reader around an unbuffered `Read`,
    /// buffering it with the given capacity.
    pub fn with_capacity(capacity: usize, reader: R) -> BitReader<BufReader<R>> {
        BitReader::new(BufReader::with_capacity(capacity, reader))
    }
}

impl BitReader<BufReader<File>> {
    /// Opens the file at the given path for reading bits.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist, is a directory
    /// or cannot be opened for some other reason.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<BitReader<BufReader<File>>> {
        let file = File::open(path)?;
        Ok(BitReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> BitRead for BitReader<R> {
    fn try_read_bits(&mut self, bits: u32) -> Result<Option<u64>> {
        check_width(bits)?;
        if self.fill(bits)? {
            Ok(Some(self.queue.pop(bits)))
        } else {
            Ok(None)
        }
    }

    fn read_bits(&mut self, bits: u32) -> Result<u64> {
        match self.try_read_bits(bits)? {
            Some(value) => Ok(value),
            None => {
                self.queue.clear();
                Err(Error::UnexpectedEof)
            }
        }
    }

    #[inline]
    fn byte_aligned(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    fn byte_align(&mut self) {
        self.queue.clear()
    }
}

/// Reads bytes just like any [`Read`], shifting them into place
/// if the reader isn't aligned to a whole byte.
///
/// Directly maps to the underlying reader for aligned reads.
impl<R: BufRead> Read for BitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.byte_aligned() {
            return self.reader.read(buf);
        }
        let mut count = 0;
        for b in buf.iter_mut() {
            match self.next_byte() {
                Ok(Some(byte)) => *b = byte,
                Ok(None) => break,
                // bytes already read are reported first
                Err(err) if count == 0 => return Err(err.into()),
                Err(_) => break,
            }
            count += 1;
        }
        Ok(count)
    }
}

/// Reads one byte from the stream, or returns `None` at its end.
fn read_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        let byte = match reader.fill_buf() {
            Ok(buf) => buf.first().copied(),
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if byte.is_some() {
            reader.consume(1);
        }
        return Ok(byte);
    }
}
