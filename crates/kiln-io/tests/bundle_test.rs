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

use anyhow::Result;
use async_trait::async_trait;
use kiln_core::asset::{AssetProvider, AssetUuid};
use kiln_core::bundle::{format::ENTRY_BYTE_LENGTH, BundleHeader, BundleSink};
use kiln_io::bundle::{write_bundle, BundleReader, FileSink, MemorySink};
use kiln_io::BundleError;
use std::collections::HashMap;

// --- Test Setup: an in-memory provider ---
#[derive(Default)]
struct StaticProvider {
    types: HashMap<AssetUuid, AssetUuid>,
    payloads: HashMap<AssetUuid, Vec<u8>>,
}

impl StaticProvider {
    fn with(mut self, uuid: AssetUuid, payload: &[u8]) -> Self {
        self.types.insert(uuid, AssetUuid::new_v5("mesh"));
        self.payloads.insert(uuid, payload.to_vec());
        self
    }

    fn without_data(mut self, uuid: AssetUuid) -> Self {
        self.types.insert(uuid, AssetUuid::new_v5("mesh"));
        self
    }
}

#[async_trait]
impl AssetProvider for StaticProvider {
    async fn asset_type_uuid(&self, uuid: AssetUuid) -> Option<AssetUuid> {
        self.types.get(&uuid).copied()
    }

    async fn bundled_asset_data(&self, uuid: AssetUuid) -> Option<Vec<u8>> {
        self.payloads.get(&uuid).cloned()
    }
}
// ---

#[tokio::test]
async fn empty_bundle_is_a_zero_count() -> Result<()> {
    let sink = MemorySink::new();
    let summary = write_bundle(&sink, Vec::new(), &StaticProvider::default()).await?;

    assert_eq!(sink.contents().await, vec![0, 0, 0, 0]);
    assert_eq!(summary.requested, 0);
    assert_eq!(summary.total_bytes, 4);
    Ok(())
}

#[tokio::test]
async fn header_lengths_match_the_payloads_that_follow() -> Result<()> {
    let (a, b, c) = (AssetUuid::new(), AssetUuid::new(), AssetUuid::new());
    let provider = StaticProvider::default()
        .with(a, b"first payload")
        .with(b, b"")
        .with(c, &[0xAB; 300]);

    let sink = MemorySink::new();
    let summary = write_bundle(&sink, [a, b, c], &provider).await?;
    let bytes = sink.contents().await;

    assert_eq!(summary.written, vec![a, b, c]);
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.total_bytes, bytes.len() as u64);

    let header = BundleHeader::from_bytes(&bytes)?;
    assert_eq!(header.entries.len(), 3);
    for (offset, entry) in header.located_entries() {
        let start = offset as usize;
        let end = start + entry.payload_length as usize;
        assert_eq!(
            &bytes[start..end],
            provider.payloads[&entry.asset_uuid].as_slice()
        );
        assert_eq!(entry.asset_type_uuid, AssetUuid::new_v5("mesh"));
    }
    assert_eq!(
        bytes.len(),
        header.byte_length() + 13 + 300,
        "payloads follow the header with no gaps"
    );
    Ok(())
}

#[tokio::test]
async fn unavailable_assets_are_skipped() -> Result<()> {
    let (kept, no_data, unknown) = (AssetUuid::new(), AssetUuid::new(), AssetUuid::new());
    let provider = StaticProvider::default()
        .without_data(no_data)
        .with(kept, b"kept");

    let sink = MemorySink::new();
    let summary = write_bundle(&sink, [no_data, kept, unknown], &provider).await?;
    let bytes = sink.contents().await;

    assert_eq!(summary.requested, 3);
    assert_eq!(summary.written, vec![kept]);
    assert_eq!(summary.skipped, vec![no_data, unknown]);

    // The count covers every requested asset; skipped rows stay zeroed at
    // the end of the table.
    let header = BundleHeader::from_bytes(&bytes)?;
    assert_eq!(header.entries.len(), 3);
    assert_eq!(header.entries[0].asset_uuid, kept);
    assert!(header.entries[1].is_unused());
    assert!(header.entries[2].is_unused());
    assert_eq!(&bytes[4 + 3 * ENTRY_BYTE_LENGTH..], b"kept");
    Ok(())
}

#[tokio::test]
async fn busy_sink_fails_before_writing() -> Result<()> {
    let uuid = AssetUuid::new();
    let provider = StaticProvider::default().with(uuid, b"data");
    let sink = MemorySink::new();

    let stream = sink.open_write_stream().await?;
    let result = write_bundle(&sink, [uuid], &provider).await;
    assert!(matches!(result, Err(BundleError::SinkUnavailable)));
    assert!(sink.contents().await.is_empty());
    drop(stream);

    write_bundle(&sink, [uuid], &provider).await?;
    assert!(!sink.contents().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn file_bundle_reads_back() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("level.bundle");
    let (a, b) = (AssetUuid::new(), AssetUuid::new());
    let provider = StaticProvider::default()
        .with(a, b"vertex data")
        .with(b, b"index data");

    let summary = write_bundle(&FileSink::new(&path), [a, b], &provider).await?;
    assert_eq!(summary.total_bytes, std::fs::metadata(&path)?.len());

    let mut reader = BundleReader::open(&path)?;
    assert_eq!(reader.entries().count(), 2);
    assert_eq!(reader.read_payload(b)?, b"index data");
    assert_eq!(reader.read_payload(a)?, b"vertex data");
    assert!(matches!(
        reader.read_payload(AssetUuid::new()),
        Err(BundleError::MissingAsset(_))
    ));
    Ok(())
}
