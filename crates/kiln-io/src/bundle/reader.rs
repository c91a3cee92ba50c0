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

use crate::error::{BundleError, BundleResult};
use kiln_core::{
    asset::AssetUuid,
    bundle::{
        format::{header_byte_length, ASSET_COUNT_BYTE_LENGTH},
        BundleEntry, BundleFormatError, BundleHeader,
    },
};
use std::{
    fs::File,
    io::{BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

/// Random-access reader over a bundle.
///
/// The header is parsed once when the reader is created; payloads are read
/// on demand by seeking to their offset.
pub struct BundleReader<R> {
    source: R,
    header: BundleHeader,
    /// `(payload offset, entry)` for every used header row.
    located: Vec<(u64, BundleEntry)>,
}

impl BundleReader<Cursor<Vec<u8>>> {
    /// Reads a bundle held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> BundleResult<Self> {
        Self::new(Cursor::new(bytes))
    }
}

impl BundleReader<BufReader<File>> {
    /// Opens a bundle file.
    pub fn open(path: impl AsRef<Path>) -> BundleResult<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> BundleReader<R> {
    /// Parses the header of `source`.
    ///
    /// Fails with [`BundleFormatError::Truncated`] if the source is shorter
    /// than the header, or than the payloads the header describes.
    pub fn new(mut source: R) -> BundleResult<Self> {
        let available = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        if (ASSET_COUNT_BYTE_LENGTH as u64) > available {
            return Err(truncated(ASSET_COUNT_BYTE_LENGTH as u64, available));
        }
        let mut count = [0u8; ASSET_COUNT_BYTE_LENGTH];
        source.read_exact(&mut count)?;
        let needed = header_byte_length(u32::from_le_bytes(count) as usize);
        if (needed as u64) > available {
            return Err(truncated(needed as u64, available));
        }

        let mut bytes = vec![0u8; needed];
        source.seek(SeekFrom::Start(0))?;
        source.read_exact(&mut bytes)?;
        let header = BundleHeader::from_bytes(&bytes)?;

        let located: Vec<(u64, BundleEntry)> = header
            .located_entries()
            .map(|(offset, entry)| (offset, *entry))
            .collect();
        let end = header.byte_length() as u64
            + header
                .entries
                .iter()
                .map(|entry| entry.payload_length as u64)
                .sum::<u64>();
        if end > available {
            return Err(truncated(end, available));
        }

        log::debug!(
            "Read bundle header: {} entries, {} used",
            header.entries.len(),
            located.len()
        );
        Ok(Self {
            source,
            header,
            located,
        })
    }

    /// The parsed header, unused rows included.
    pub fn header(&self) -> &BundleHeader {
        &self.header
    }

    /// The bundled assets, in header order.
    pub fn entries(&self) -> impl Iterator<Item = &BundleEntry> {
        self.located.iter().map(|(_, entry)| entry)
    }

    /// Looks up the entry of `uuid`.
    pub fn get(&self, uuid: AssetUuid) -> Option<&BundleEntry> {
        self.locate(uuid).map(|(_, entry)| entry)
    }

    /// Reads the payload of `uuid`.
    pub fn read_payload(&mut self, uuid: AssetUuid) -> BundleResult<Vec<u8>> {
        let (offset, entry) = self.locate(uuid).ok_or(BundleError::MissingAsset(uuid))?;
        let mut buffer = vec![0u8; entry.payload_length as usize];
        self.source.seek(SeekFrom::Start(*offset))?;
        self.source.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Gives the underlying source back.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn locate(&self, uuid: AssetUuid) -> Option<&(u64, BundleEntry)> {
        self.located
            .iter()
            .find(|(_, entry)| entry.asset_uuid == uuid)
    }
}

fn truncated(needed: u64, available: u64) -> BundleError {
    BundleFormatError::Truncated {
        needed: needed as usize,
        available: available as usize,
    }
    .into()
}
