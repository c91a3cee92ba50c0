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

//! Defines the container format of asset bundles.
//!
//! A bundle is a little-endian header table followed by the concatenated
//! asset payloads:
//!
//! ```text
//! offset 0        u32       asset count
//! offset 4        repeated asset-count times:
//!                   16 bytes  asset uuid
//!                   16 bytes  asset type uuid
//!                   u32       payload byte length
//! offset 4 + 36N  payloads, in header entry order
//! ```
//!
//! The header size depends only on the number of requested assets, so a
//! writer can reserve it, stream the payloads, and then overwrite it in place.
//! There is no magic number or version field. Entries for assets that could
//! not be bundled stay zeroed at the end of the table.

use crate::asset::{AssetUuid, UUID_BYTE_LENGTH};
use std::convert::TryInto;

/// Size of the leading asset count.
pub const ASSET_COUNT_BYTE_LENGTH: usize = 4;

/// Size of one header entry: asset uuid, type uuid, payload length.
pub const ENTRY_BYTE_LENGTH: usize = UUID_BYTE_LENGTH * 2 + 4;

/// Total header size for `asset_count` entries.
pub const fn header_byte_length(asset_count: usize) -> usize {
    ASSET_COUNT_BYTE_LENGTH + asset_count * ENTRY_BYTE_LENGTH
}

/// Errors raised when parsing a bundle header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleFormatError {
    /// The input ends before the header does.
    #[error("bundle header is truncated: needed {needed} bytes, found {available}")]
    Truncated {
        /// Bytes the header requires.
        needed: usize,
        /// Bytes that were available.
        available: usize,
    },
}

/// One row of the bundle header table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleEntry {
    /// The bundled asset.
    pub asset_uuid: AssetUuid,
    /// The type of the bundled asset.
    pub asset_type_uuid: AssetUuid,
    /// Length of the payload belonging to this entry.
    pub payload_length: u32,
}

impl BundleEntry {
    /// Returns `true` for a zeroed entry left behind by a skipped asset.
    pub fn is_unused(&self) -> bool {
        self.asset_uuid.is_nil() && self.asset_type_uuid.is_nil() && self.payload_length == 0
    }

    /// Serializes the entry.
    pub fn to_bytes(&self) -> [u8; ENTRY_BYTE_LENGTH] {
        let mut bytes = [0u8; ENTRY_BYTE_LENGTH];
        bytes[0..16].copy_from_slice(self.asset_uuid.as_bytes());
        bytes[16..32].copy_from_slice(self.asset_type_uuid.as_bytes());
        bytes[32..36].copy_from_slice(&self.payload_length.to_le_bytes());
        bytes
    }

    /// Parses an entry from the start of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleFormatError> {
        if bytes.len() < ENTRY_BYTE_LENGTH {
            return Err(BundleFormatError::Truncated {
                needed: ENTRY_BYTE_LENGTH,
                available: bytes.len(),
            });
        }

        // The length check above makes these conversions infallible.
        let asset_uuid: [u8; 16] = bytes[0..16].try_into().unwrap_or_default();
        let asset_type_uuid: [u8; 16] = bytes[16..32].try_into().unwrap_or_default();
        let payload_length: [u8; 4] = bytes[32..36].try_into().unwrap_or_default();

        Ok(Self {
            asset_uuid: AssetUuid::from_bytes(asset_uuid),
            asset_type_uuid: AssetUuid::from_bytes(asset_type_uuid),
            payload_length: u32::from_le_bytes(payload_length),
        })
    }
}

/// The parsed header of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleHeader {
    /// Every entry of the table, including unused ones.
    pub entries: Vec<BundleEntry>,
}

impl BundleHeader {
    /// Size of this header in bytes.
    pub fn byte_length(&self) -> usize {
        header_byte_length(self.entries.len())
    }

    /// Reads only the asset count.
    pub fn read_asset_count(bytes: &[u8]) -> Result<u32, BundleFormatError> {
        let count: [u8; ASSET_COUNT_BYTE_LENGTH] = bytes
            .get(..ASSET_COUNT_BYTE_LENGTH)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(BundleFormatError::Truncated {
                needed: ASSET_COUNT_BYTE_LENGTH,
                available: bytes.len(),
            })?;
        Ok(u32::from_le_bytes(count))
    }

    /// Parses a header from the beginning of a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleFormatError> {
        let count = Self::read_asset_count(bytes)? as usize;
        let needed = header_byte_length(count);
        if bytes.len() < needed {
            return Err(BundleFormatError::Truncated {
                needed,
                available: bytes.len(),
            });
        }

        let entries = bytes[ASSET_COUNT_BYTE_LENGTH..needed]
            .chunks_exact(ENTRY_BYTE_LENGTH)
            .map(BundleEntry::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Serializes the header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_length());
        bytes.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes
    }

    /// Entries that describe a bundled asset, each with the absolute offset of
    /// its payload.
    pub fn located_entries(&self) -> impl Iterator<Item = (u64, &BundleEntry)> {
        let mut offset = self.byte_length() as u64;
        self.entries.iter().filter_map(move |entry| {
            let start = offset;
            offset += entry.payload_length as u64;
            (!entry.is_unused()).then_some((start, entry))
        })
    }
}
