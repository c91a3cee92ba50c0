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

//! A file-backed asset project described by an `Assets.toml` manifest.
//!
//! [`ProjectAssets`] serves the manifest's assets to the bundle services: it
//! answers type and reference queries from the manifest and reads payloads
//! from disk.

mod manifest;

pub use manifest::*;

use async_trait::async_trait;
use kiln_core::asset::{
    AssetProvider, AssetUuid, DefaultLinkResolver, DefaultLinkTable, ReferenceEnumerator,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The assets of a project, ready to be bundled.
#[derive(Debug, Clone)]
pub struct ProjectAssets {
    asset_root: PathBuf,
    records: HashMap<AssetUuid, AssetRecord>,
    links: DefaultLinkTable,
}

impl ProjectAssets {
    /// Builds the asset set of `manifest`. Payload paths resolve against
    /// `base_dir` joined with the manifest's `root`.
    pub fn new(manifest: &ProjectManifest, base_dir: impl AsRef<Path>) -> Self {
        let records = manifest
            .assets
            .iter()
            .map(|record| (record.uuid, record.clone()))
            .collect();
        let links = manifest
            .default_links
            .iter()
            .map(|link| (link.uuid, link.original))
            .collect();

        Self {
            asset_root: base_dir.as_ref().join(&manifest.root),
            records,
            links,
        }
    }

    /// Directory the payload paths are relative to.
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// The record of `uuid`, if the project knows it.
    pub fn record(&self, uuid: AssetUuid) -> Option<&AssetRecord> {
        self.records.get(&uuid)
    }

    /// The manifest's default asset links.
    pub fn default_links(&self) -> &DefaultLinkTable {
        &self.links
    }

    /// Number of assets in the project.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the project has no assets.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AssetProvider for ProjectAssets {
    async fn asset_type_uuid(&self, uuid: AssetUuid) -> Option<AssetUuid> {
        self.records.get(&uuid).map(|record| record.type_uuid)
    }

    async fn bundled_asset_data(&self, uuid: AssetUuid) -> Option<Vec<u8>> {
        let record = self.records.get(&uuid)?;
        let path = self.asset_root.join(&record.path);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                log::warn!(
                    "Failed to read payload of asset {uuid} from '{}': {error}",
                    path.display()
                );
                None
            }
        }
    }
}

#[async_trait]
impl ReferenceEnumerator for ProjectAssets {
    async fn referenced_asset_uuids(&self, uuid: AssetUuid) -> anyhow::Result<Vec<AssetUuid>> {
        match self.records.get(&uuid) {
            Some(record) => Ok(record.references.clone()),
            None => {
                log::trace!("Asset {uuid} is not in the manifest, assuming no references");
                Ok(Vec::new())
            }
        }
    }
}

impl DefaultLinkResolver for ProjectAssets {
    fn resolve_default_asset_link(&self, uuid: AssetUuid) -> AssetUuid {
        self.links.resolve_default_asset_link(uuid)
    }
}
