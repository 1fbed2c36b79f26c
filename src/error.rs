// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors produced while reading or writing bits.

use std::io;

use crate::bits::MAX_BITS;

/// A specialized `Result` for bitstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The ways a bitstream operation can fail.
///
/// Invalid arguments are detected before the stream is touched,
/// so the stream remains usable afterward.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field wider than 64 bits was requested.
    #[error("cannot transfer {0} bits at once, the limit is {}", MAX_BITS)]
    InvalidBitCount(u32),

    /// A single bit was neither 0 nor 1.
    #[error("{0} is neither 0 nor 1")]
    InvalidBit(u8),

    /// A binary string contained something other than `0` and `1`.
    #[error("the input string '{0}' must contain only 0s and 1s")]
    InvalidBinaryString(String),

    /// The source ran out before the requested bits could be read.
    #[error("premature end of input, cannot read the requested number of bits")]
    UnexpectedEof,

    /// The underlying source or sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true if this error is a premature end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::UnexpectedEof)
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> io::Error {
        match error {
            Error::Io(err) => err,
            other => {
                let kind = if other.is_eof() {
                    io::ErrorKind::UnexpectedEof
                } else {
                    io::ErrorKind::InvalidInput
                };
                io::Error::new(kind, other)
            }
        }
    }
}

/// Fails unless `bits` is a width which may be transferred at once.
#[inline]
pub(crate) fn check_width(bits: u32) -> Result<()> {
    if bits > MAX_BITS {
        Err(Error::InvalidBitCount(bits))
    } else {
        Ok(())
    }
}
