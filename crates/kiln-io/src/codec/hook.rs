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

//! Post-decode transform hooks.
//!
//! A hook sees every decoded leaf once, after the leaf has been placed on its
//! parent, and may install a replacement. Hooks run one at a time in the
//! order the leaves were read, so a hook observes the earlier siblings of its
//! leaf in their already-transformed form.

use super::{decode::decode_tree, CodecOptions};
use crate::error::{CodecError, CodecResult};
use async_trait::async_trait;
use kiln_core::{
    asset::{AssetLoadOptions, AssetLoader, AssetUuid},
    storage::{Schema, StorageType, Value},
};
use std::fmt;

/// Where a decoded value sits inside its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlacedKey {
    /// The value is the decode root.
    Root,
    /// The value is a struct field.
    Field(String),
    /// The value is an array element.
    Index(usize),
}

impl fmt::Display for PlacedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacedKey::Root => f.write_str("<root>"),
            PlacedKey::Field(name) => f.write_str(name),
            PlacedKey::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// What a hook is told about one decoded leaf.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// The decoded value.
    pub value: &'a Value,
    /// The key the value is stored under.
    pub placed_on_key: &'a PlacedKey,
    /// The storage type the value was decoded as.
    pub storage_type: StorageType,
    /// The object or array holding the value; `None` for the root.
    pub placed_on_object: Option<&'a Value>,
}

/// Replaces decoded leaves.
#[async_trait]
pub trait TransformHook: Send + Sync {
    /// Returns `Some(value)` to replace the leaf, `None` to keep it.
    async fn transform(&self, context: TransformContext<'_>) -> anyhow::Result<Option<Value>>;
}

/// Decodes `bytes` and runs `hook` over every leaf.
///
/// Each hook call is awaited before the next one starts; no two calls of one
/// decode overlap.
pub async fn decode_with_hook<H>(bytes: &[u8], schema: &Schema, hook: &H) -> CodecResult<Value>
where
    H: TransformHook + ?Sized,
{
    decode_with_hook_and_options(bytes, schema, hook, &CodecOptions::default()).await
}

/// [`decode_with_hook`] with explicit options.
pub async fn decode_with_hook_and_options<H>(
    bytes: &[u8],
    schema: &Schema,
    hook: &H,
    options: &CodecOptions,
) -> CodecResult<Value>
where
    H: TransformHook + ?Sized,
{
    let decoded = decode_tree(bytes, schema, options, true)?;
    let mut root = decoded.value;

    for leaf in decoded.leaves {
        let (parent_path, key) = match leaf.path.split_last() {
            Some((key, parent_path)) => (parent_path, key.clone()),
            None => (&[][..], PlacedKey::Root),
        };

        let replacement = {
            let value = lookup(&root, &leaf.path)?;
            let placed_on_object = match key {
                PlacedKey::Root => None,
                _ => Some(lookup(&root, parent_path)?),
            };
            hook.transform(TransformContext {
                value,
                placed_on_key: &key,
                storage_type: leaf.storage_type,
                placed_on_object,
            })
            .await
            .map_err(CodecError::Hook)?
        };

        if let Some(replacement) = replacement {
            *lookup_mut(&mut root, &leaf.path)? = replacement;
        }
    }

    Ok(root)
}

fn lookup<'v>(root: &'v Value, path: &[PlacedKey]) -> CodecResult<&'v Value> {
    path.iter().try_fold(root, |current, key| {
        let next = match (current, key) {
            (Value::Object(fields), PlacedKey::Field(name)) => fields.get(name),
            (Value::Array(items), PlacedKey::Index(index)) => items.get(*index),
            _ => None,
        };
        next.ok_or_else(|| missing(key))
    })
}

fn lookup_mut<'v>(root: &'v mut Value, path: &[PlacedKey]) -> CodecResult<&'v mut Value> {
    path.iter().try_fold(root, |current, key| {
        let next = match (current, key) {
            (Value::Object(fields), PlacedKey::Field(name)) => fields.get_mut(name),
            (Value::Array(items), PlacedKey::Index(index)) => items.get_mut(*index),
            _ => None,
        };
        next.ok_or_else(|| missing(key))
    })
}

fn missing(key: &PlacedKey) -> CodecError {
    CodecError::SchemaMismatch(format!("decoded value has no entry at '{key}'"))
}

/// The standard hook: turns decoded `ASSET_UUID` strings into live assets
/// through an [`AssetLoader`].
///
/// Null references (the all-zero uuid) are left as they are.
pub struct AssetLoaderHook<L> {
    loader: L,
    options: AssetLoadOptions,
}

impl<L: AssetLoader> AssetLoaderHook<L> {
    /// Creates a hook with default load options.
    pub fn new(loader: L) -> Self {
        Self::with_options(loader, AssetLoadOptions::default())
    }

    /// Creates a hook that forwards `options` to every load.
    pub fn with_options(loader: L, options: AssetLoadOptions) -> Self {
        Self { loader, options }
    }

    /// The wrapped loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[async_trait]
impl<L: AssetLoader> TransformHook for AssetLoaderHook<L> {
    async fn transform(&self, context: TransformContext<'_>) -> anyhow::Result<Option<Value>> {
        if context.storage_type != StorageType::AssetUuid {
            return Ok(None);
        }
        let Some(text) = context.value.as_str() else {
            return Ok(None);
        };

        let uuid = AssetUuid::parse(text)?;
        log::trace!("Loading asset {uuid} referenced by '{}'", context.placed_on_key);
        let asset = self.loader.get_asset(uuid, &self.options).await?;
        Ok(Some(Value::Asset(asset)))
    }
}
