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
use kiln_core::asset::AssetUuid;

/// Appends primitives to a growable byte buffer.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
    endianness: Endianness,
}

impl BinaryWriter {
    /// Creates a little-endian writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given byte order.
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            buffer: Vec::new(),
            endianness,
        }
    }

    /// The configured byte order.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Appends `size_of::<T>()` bytes.
    pub fn write<T: Primitive>(&mut self, value: T) {
        value.write_to(&mut self.buffer, self.endianness);
    }

    /// Appends a boolean as a single byte.
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Appends the 16 bytes of a uuid.
    pub fn write_uuid(&mut self, uuid: &AssetUuid) {
        self.buffer.extend_from_slice(uuid.as_bytes());
    }

    /// Appends a 32 bit length prefix followed by the UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) -> CodecResult<()> {
        self.write_buffer(value.as_bytes())
    }

    /// Appends a 32 bit length prefix followed by the bytes.
    pub fn write_buffer(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.write_length(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends a 32 bit length or count.
    pub fn write_length(&mut self, length: usize) -> CodecResult<()> {
        let length = u32::try_from(length).map_err(|_| CodecError::LengthOverflow(length))?;
        self.write(length);
        Ok(())
    }

    /// Appends bytes as they are, without a prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer and returns its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
