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
    asset::{AssetUuid, DefaultLinkResolver, ReferenceEnumerator},
    bundle::BundleRoot,
};
use std::collections::HashSet;

/// Collects the set of assets reachable from `roots`.
///
/// Roots are first resolved through `resolver`. Roots without
/// `include_children` are then added as they are; they also count as visited,
/// so a later walk stops at them. Every other root is walked depth-first
/// through `enumerator`:
///
/// 1. A uuid that was already visited, or that is in `exclude_recursive`, is
///    skipped together with everything below it. The visited set is shared by
///    all roots, so cycles terminate and nothing is emitted twice.
/// 2. A uuid in `exclude` is walked through but not emitted.
/// 3. Discovered references are resolved through `resolver` before they are
///    visited, so the result names concrete assets rather than default asset
///    links.
///
/// The iteration order of the returned set carries no meaning.
pub async fn collect_asset_uuids<E, R>(
    roots: &[BundleRoot],
    exclude: &HashSet<AssetUuid>,
    exclude_recursive: &HashSet<AssetUuid>,
    enumerator: &E,
    resolver: &R,
) -> BundleResult<HashSet<AssetUuid>>
where
    E: ReferenceEnumerator + ?Sized,
    R: DefaultLinkResolver + ?Sized,
{
    let mut collected = HashSet::new();
    let mut visited = HashSet::new();

    for root in roots {
        let root_uuid = resolver.resolve_default_asset_link(root.uuid);
        if !root.include_children {
            visited.insert(root_uuid);
            collected.insert(root_uuid);
            continue;
        }

        let mut pending = vec![root_uuid];
        while let Some(uuid) = pending.pop() {
            if exclude_recursive.contains(&uuid) {
                log::trace!("Not descending into recursively excluded asset {uuid}");
                continue;
            }
            if !visited.insert(uuid) {
                continue;
            }

            if exclude.contains(&uuid) {
                log::trace!("Walking through excluded asset {uuid}");
            } else {
                collected.insert(uuid);
            }

            let references = enumerator
                .referenced_asset_uuids(uuid)
                .await
                .map_err(|source| BundleError::Reference { uuid, source })?;

            // Reversed so the first reference is popped, and visited, first.
            pending.extend(
                references
                    .into_iter()
                    .rev()
                    .map(|reference| resolver.resolve_default_asset_link(reference)),
            );
        }
    }

    log::debug!(
        "Collected {} assets from {} roots ({} visited)",
        collected.len(),
        roots.len(),
        visited.len()
    );
    Ok(collected)
}
