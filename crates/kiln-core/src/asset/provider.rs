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

use super::{AssetUuid, LiveAsset};
use async_trait::async_trait;
use std::collections::HashMap;

/// Supplies the per-asset data the bundle packer needs.
///
/// Both methods answer `None` when the asset cannot be produced; the packer
/// treats that as "leave this asset out of the bundle" rather than an error.
#[async_trait]
pub trait AssetProvider: Send + Sync {
    /// Returns the uuid of the asset's type, if the asset is known.
    async fn asset_type_uuid(&self, uuid: AssetUuid) -> Option<AssetUuid>;

    /// Returns the bytes that represent the asset inside a bundle.
    async fn bundled_asset_data(&self, uuid: AssetUuid) -> Option<Vec<u8>>;
}

/// Enumerates the outgoing references of an asset.
///
/// Implementations must be reentrant: independent traversals may query the
/// same enumerator concurrently.
#[async_trait]
pub trait ReferenceEnumerator: Send + Sync {
    /// Lists the uuids directly referenced by `uuid`, in discovery order.
    ///
    /// Unknown assets have no references and should yield an empty list.
    async fn referenced_asset_uuids(&self, uuid: AssetUuid) -> anyhow::Result<Vec<AssetUuid>>;
}

/// Resolves default asset links to the concrete asset they alias.
pub trait DefaultLinkResolver: Send + Sync {
    /// Returns the original asset for a default asset link, or `uuid` itself
    /// when it is not a link.
    fn resolve_default_asset_link(&self, uuid: AssetUuid) -> AssetUuid;
}

/// A resolver with no links; every uuid resolves to itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDefaultLinks;

impl DefaultLinkResolver for NoDefaultLinks {
    fn resolve_default_asset_link(&self, uuid: AssetUuid) -> AssetUuid {
        uuid
    }
}

/// An in-memory table of default asset links.
///
/// Links may point at other links; resolution follows the chain until it
/// reaches a uuid that is not a link. A chain that loops back on itself
/// resolves to the last uuid visited before the loop closes.
#[derive(Debug, Default, Clone)]
pub struct DefaultLinkTable {
    links: HashMap<AssetUuid, AssetUuid>,
}

impl DefaultLinkTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `link` as an alias of `original`.
    pub fn insert(&mut self, link: AssetUuid, original: AssetUuid) {
        self.links.insert(link, original);
    }

    /// Number of registered links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if no links are registered.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl FromIterator<(AssetUuid, AssetUuid)> for DefaultLinkTable {
    fn from_iter<I: IntoIterator<Item = (AssetUuid, AssetUuid)>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl DefaultLinkResolver for DefaultLinkTable {
    fn resolve_default_asset_link(&self, uuid: AssetUuid) -> AssetUuid {
        let mut current = uuid;
        // Each hop visits a distinct key, so the chain is at most `len` long.
        for _ in 0..self.links.len() {
            match self.links.get(&current) {
                Some(next) if *next != current => current = *next,
                _ => break,
            }
        }
        current
    }
}

/// Options forwarded to an [`AssetLoader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetLoadOptions {
    /// When set, the loader should verify the asset is of this type.
    pub expected_type: Option<AssetUuid>,
    /// Asks the loader for a fresh instance instead of a shared cached one.
    pub create_new_instance: bool,
}

/// Loads live assets on demand. Used by decode hooks to turn asset references
/// into loaded assets.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Loads the asset identified by `uuid`.
    async fn get_asset(
        &self,
        uuid: AssetUuid,
        options: &AssetLoadOptions,
    ) -> anyhow::Result<LiveAsset>;
}
