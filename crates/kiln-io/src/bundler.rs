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

//! One-call bundle builds: collect the asset graph, then pack it.

use crate::bundle::{collect_asset_uuids, write_bundle, BundleSummary};
use crate::error::BundleResult;
use kiln_core::{
    asset::{AssetProvider, AssetUuid, DefaultLinkResolver, ReferenceEnumerator},
    bundle::{BundleDescriptor, BundleSink},
};

/// Builds bundles from [`BundleDescriptor`]s.
///
/// The provider answers both the reference queries of the collection pass and
/// the data queries of the packing pass.
pub struct AssetBundler<P, R> {
    provider: P,
    resolver: R,
}

impl<P, R> AssetBundler<P, R>
where
    P: AssetProvider + ReferenceEnumerator,
    R: DefaultLinkResolver,
{
    /// Creates a bundler.
    pub fn new(provider: P, resolver: R) -> Self {
        Self { provider, resolver }
    }

    /// The asset provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Collects the assets `descriptor` selects, in a stable order.
    pub async fn collect(&self, descriptor: &BundleDescriptor) -> BundleResult<Vec<AssetUuid>> {
        let collected = collect_asset_uuids(
            &descriptor.assets,
            &descriptor.exclude,
            &descriptor.exclude_recursive,
            &self.provider,
            &self.resolver,
        )
        .await?;

        let mut uuids: Vec<AssetUuid> = collected.into_iter().collect();
        uuids.sort();
        Ok(uuids)
    }

    /// Collects the assets `descriptor` selects and writes them into `sink`.
    ///
    /// Assets are packed in uuid order, so the same inputs always produce the
    /// same bytes.
    pub async fn bundle<S: BundleSink>(
        &self,
        descriptor: &BundleDescriptor,
        sink: &S,
    ) -> BundleResult<BundleSummary> {
        let uuids = self.collect(descriptor).await?;
        log::info!(
            "Bundling {} assets from {} roots",
            uuids.len(),
            descriptor.assets.len()
        );
        write_bundle(sink, uuids, &self.provider).await
    }
}
