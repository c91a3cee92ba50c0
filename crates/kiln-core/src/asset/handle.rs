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

use super::{Asset, AssetUuid};
use std::{any::Any, fmt, ops::Deref, sync::Arc};

/// A thread-safe, reference-counted handle to a loaded asset.
///
/// Cloning a handle is cheap, as it only increments the reference count
/// and does not duplicate the underlying asset data.
#[derive(Debug)]
pub struct AssetHandle<T: Asset>(Arc<T>);

impl<T: Asset> AssetHandle<T> {
    /// Creates a new `AssetHandle` that takes ownership of the asset data.
    pub fn new(asset: T) -> Self {
        Self(Arc::new(asset))
    }
}

impl<T: Asset> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Asset> Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A type-erased loaded asset, as produced by an [`AssetLoader`](super::AssetLoader).
///
/// This is what a decoded asset reference turns into once a loader hook has
/// resolved it. The concrete type is recovered with [`LiveAsset::downcast`].
#[derive(Clone)]
pub struct LiveAsset {
    uuid: AssetUuid,
    data: Arc<dyn Any + Send + Sync>,
}

impl LiveAsset {
    /// Wraps a loaded asset.
    pub fn new<T: Asset>(uuid: AssetUuid, asset: T) -> Self {
        Self {
            uuid,
            data: Arc::new(asset),
        }
    }

    /// The uuid the asset was loaded from.
    pub fn uuid(&self) -> AssetUuid {
        self.uuid
    }

    /// Recovers a typed handle, or `None` if the asset is of another type.
    pub fn downcast<T: Asset>(&self) -> Option<AssetHandle<T>> {
        self.data.clone().downcast::<T>().ok().map(AssetHandle)
    }
}

impl PartialEq for LiveAsset {
    /// Two live assets are equal when they name the same asset and share the
    /// same loaded instance.
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid && Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for LiveAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveAsset").field("uuid", &self.uuid).finish()
    }
}
