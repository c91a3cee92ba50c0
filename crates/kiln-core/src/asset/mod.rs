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

//! Provides the foundational traits and primitive types for Kiln's asset system.
//!
//! This module defines the "common language" shared by the codec and the
//! bundle packer. It contains the identifiers and the collaborator contracts
//! that the surrounding application implements, but it has no knowledge of
//! how assets are stored or loaded.
//!
//! The key components are:
//! - [`AssetUuid`]: the stable identifier of a project asset.
//! - [`AssetProvider`], [`ReferenceEnumerator`] and [`DefaultLinkResolver`]:
//!   what bundling asks of the project.
//! - [`AssetLoader`] and [`LiveAsset`]: how decoded asset references become
//!   loaded assets.

mod handle;
mod provider;
mod uuid;

pub use handle::*;
pub use provider::*;
pub use self::uuid::*;

/// A marker trait for types that can be managed by the asset system.
///
/// The supertraits allow loaded assets to be shared between threads and kept
/// for the lifetime of the application.
///
/// # Examples
///
/// ```
/// use kiln_core::asset::Asset;
///
/// struct Texture {
///     // ... fields
/// }
///
/// impl Asset for Texture {}
/// ```
pub trait Asset: Send + Sync + 'static {}
