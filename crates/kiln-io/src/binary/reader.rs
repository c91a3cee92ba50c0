// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::{Endianness, Primitive};
use crate::error::{CodecError, CodecResult};
use kiln_core::asset::{AssetUuid, UUID_BYTE_LENGTH};

/// Consumes primitives from a byte slice through a cursor.
///
/// Reading past the end fails with [`CodecError::UnexpectedEndOfBuffer`] and
/// leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    bytes: &'a [u8],
    cursor: usize,
    endianness: Endianness,
}

impl<'a> BinaryReader<'a> {
    /// Creates a little-endian reader.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_endianness(bytes, Endianness::Little)
    }

    /// Creates a reader with the given byte order.
    pub fn with_endianness(bytes: &'a [u8], endianness: Endianness) -> Self {
        Self {
            bytes,
            cursor: 0,
            endianness,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consumes exactly `length` bytes.
    pub fn read_raw(&mut self, length: usize) -> CodecResult<&'a [u8]> {
        if length > self.remaining() {
            return Err(CodecError::UnexpectedEndOfBuffer {
                offset: self.cursor,
                needed: length,
                remaining: self.remaining(),
            });
        }
        let bytes = self.bytes;
        let slice = &bytes[self.cursor..self.cursor + length];
        self.cursor += length;
        Ok(slice)
    }

    /// Reads `size_of::<T>()` bytes.
    pub fn read<T: Primitive>(&mut self) -> CodecResult<T> {
        let raw = self.read_raw(T::WIDTH)?;
        Ok(T::read_from(raw, self.endianness))
    }

    /// Reads a single-byte boolean. Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read::<u8>()? != 0)
    }

    /// Reads the 16 bytes of a uuid.
    pub fn read_uuid(&mut self) -> CodecResult<AssetUuid> {
        let raw = self.read_raw(UUID_BYTE_LENGTH)?;
        let mut bytes = [0u8; UUID_BYTE_LENGTH];
        bytes.copy_from_slice(raw);
        Ok(AssetUuid::from_bytes(bytes))
    }

    /// Reads a 32 bit length or count.
    pub fn read_length(&mut self) -> CodecResult<usize> {
        Ok(self.read::<u32>()? as usize)
    }

    /// Reads a length-prefixed byte buffer.
    pub fn read_buffer(&mut self) -> CodecResult<Vec<u8>> {
        let length = self.read_length()?;
        Ok(self.read_raw(length)?.to_vec())
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> CodecResult<String> {
        let start = self.cursor;
        let length = self.read_length()?;
        let raw = self.read_raw(length).inspect_err(|_| self.cursor = start)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8 { offset: start + 4 })
    }
}
