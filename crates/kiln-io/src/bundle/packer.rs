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
    asset::{AssetProvider, AssetUuid},
    bundle::{
        format::{header_byte_length, ASSET_COUNT_BYTE_LENGTH, ENTRY_BYTE_LENGTH},
        BundleEntry, BundleSink, WriteStream,
    },
};

/// What happened while writing a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleSummary {
    /// Number of assets the caller asked for. Also the header's asset count.
    pub requested: usize,
    /// Assets that made it into the bundle, in header order.
    pub written: Vec<AssetUuid>,
    /// Assets left out because the provider could not produce them.
    pub skipped: Vec<AssetUuid>,
    /// Total size of the bundle, header included.
    pub total_bytes: u64,
}

/// The in-memory copy of the header, filled in as payloads are streamed.
struct HeaderBuffer {
    bytes: Vec<u8>,
}

impl HeaderBuffer {
    /// A header with the real asset count and zeroed entries.
    fn new(asset_count: usize) -> BundleResult<Self> {
        let count = u32::try_from(asset_count).map_err(|_| BundleError::TooManyAssets(asset_count))?;
        let mut bytes = vec![0u8; header_byte_length(asset_count)];
        bytes[..ASSET_COUNT_BYTE_LENGTH].copy_from_slice(&count.to_le_bytes());
        Ok(Self { bytes })
    }

    fn set_entry(&mut self, index: usize, entry: &BundleEntry) {
        let start = ASSET_COUNT_BYTE_LENGTH + index * ENTRY_BYTE_LENGTH;
        self.bytes[start..start + ENTRY_BYTE_LENGTH].copy_from_slice(&entry.to_bytes());
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Writes a bundle of `asset_uuids` into `sink`.
///
/// The header is sized for every requested asset and written first as a
/// placeholder. Each asset is then fetched from `provider` and its payload
/// streamed straight to the sink, one asset at a time. Assets the provider
/// cannot produce (no type uuid or no data) are skipped: they get no header
/// entry and no payload, and their rows stay zeroed at the end of the table.
/// Finally the completed header is written back over the placeholder.
///
/// Fails with [`BundleError::SinkUnavailable`] before writing anything if the
/// sink is already in use.
pub async fn write_bundle<S, P, I>(
    sink: &S,
    asset_uuids: I,
    provider: &P,
) -> BundleResult<BundleSummary>
where
    S: BundleSink,
    P: AssetProvider + ?Sized,
    I: IntoIterator<Item = AssetUuid>,
{
    let asset_uuids: Vec<AssetUuid> = asset_uuids.into_iter().collect();
    let mut stream = sink.open_write_stream().await?;

    let mut header = HeaderBuffer::new(asset_uuids.len())?;
    stream.write(header.as_bytes()).await?;

    let mut summary = BundleSummary {
        requested: asset_uuids.len(),
        total_bytes: header.as_bytes().len() as u64,
        ..Default::default()
    };

    for uuid in asset_uuids {
        let Some(asset_type_uuid) = provider.asset_type_uuid(uuid).await else {
            log::warn!("Skipping asset {uuid}: its type could not be determined");
            summary.skipped.push(uuid);
            continue;
        };
        let Some(payload) = provider.bundled_asset_data(uuid).await else {
            log::warn!("Skipping asset {uuid}: no bundle data is available");
            summary.skipped.push(uuid);
            continue;
        };

        let payload_length = u32::try_from(payload.len()).map_err(|_| {
            BundleError::PayloadTooLarge {
                uuid,
                length: payload.len(),
            }
        })?;

        header.set_entry(
            summary.written.len(),
            &BundleEntry {
                asset_uuid: uuid,
                asset_type_uuid,
                payload_length,
            },
        );
        stream.write(&payload).await?;

        summary.total_bytes += payload.len() as u64;
        summary.written.push(uuid);
    }

    log::debug!("Backpatching bundle header ({} entries)", summary.written.len());
    stream.write_at(0, header.as_bytes()).await?;
    stream.close().await?;

    log::info!(
        "Wrote bundle with {} of {} assets ({} bytes)",
        summary.written.len(),
        summary.requested,
        summary.total_bytes
    );
    Ok(summary)
}
