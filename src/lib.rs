// Copyright 2017 Brian Langenberger
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Traits and helpers for reading and writing un-aligned bit fields
//! from and to byte streams.
//!
//! Fields of 1 to 64 bits are packed most significant bit first,
//! one after another with no padding, except that flushing a writer
//! pads its last partial byte with 0 bits.
//! Any [`std::io::BufRead`] may be read from and
//! any [`std::io::Write`] may be written to.
//!
//! ## Example
//! ```
//! use std::io::Cursor;
//! use bitfield_io::{BitRead, BitReader, BitWrite, BitWriter};
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0b101, 3).unwrap();
//!     writer.write_i32(-2).unwrap();
//!     writer.write_bool(true).unwrap();
//! }
//! assert_eq!(output.len(), 5);
//!
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_i32().unwrap(), -2);
//! assert!(reader.read_bool().unwrap());
//! assert_eq!(reader.try_read_bits(4).unwrap(), Some(0));
//! assert_eq!(reader.try_read_bits(1).unwrap(), None);
//! ```

#![warn(missing_docs)]

pub mod bits;
pub mod error;
pub mod read;
pub mod shared;
pub mod write;

pub use error::{Error, Result};
pub use read::{BitRead, BitReader};
pub use shared::{SharedBitReader, SharedBitWriter};
pub use write::{BitWrite, BitWriter, IntoInnerError};
