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

use crate::asset::AssetUuid;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn include_children_default() -> bool {
    true
}

/// A root asset of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleRoot {
    /// The asset to bundle.
    pub uuid: AssetUuid,
    /// When set, everything the asset references is bundled as well.
    #[serde(default = "include_children_default")]
    pub include_children: bool,
}

impl BundleRoot {
    /// A root that pulls in its whole reference graph.
    pub fn with_children(uuid: AssetUuid) -> Self {
        Self {
            uuid,
            include_children: true,
        }
    }

    /// A root that bundles only itself.
    pub fn alone(uuid: AssetUuid) -> Self {
        Self {
            uuid,
            include_children: false,
        }
    }
}

/// Describes which assets go into a bundle.
///
/// `exclude` removes single assets from the result while still walking
/// through them; `exclude_recursive` stops the walk at the listed assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDescriptor {
    /// Root assets.
    #[serde(default)]
    pub assets: Vec<BundleRoot>,
    /// Assets left out of the bundle, without pruning what they reference.
    #[serde(default)]
    pub exclude: HashSet<AssetUuid>,
    /// Assets left out of the bundle together with everything only reachable
    /// through them.
    #[serde(default)]
    pub exclude_recursive: HashSet<AssetUuid>,
}
