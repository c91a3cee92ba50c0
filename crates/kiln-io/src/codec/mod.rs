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

//! The schema-driven object codec.
//!
//! [`encode`] walks a [`Schema`](kiln_core::Schema) and writes a
//! [`Value`](kiln_core::Value) with the primitive [`BinaryWriter`]; [`decode`]
//! performs the inverse traversal. The format carries no type information, so
//! both ends must use the same schema:
//!
//! - primitives are written at their fixed width, strings and buffers with a
//!   `u32` length prefix, uuids as 16 raw bytes (null as the all-zero uuid)
//! - struct fields are written in declaration order, each preceded by its
//!   `u16` name id
//! - arrays are prefixed with a `u32` element count
//! - nullable values with a `u8` presence flag, unions with a `u8` variant
//!   index
//!
//! [`decode_with_hook`] additionally runs a [`TransformHook`] over every
//! decoded leaf, which is how asset references become loaded assets.
//!
//! [`BinaryWriter`]: crate::binary::BinaryWriter

mod decode;
mod descriptor;
mod encode;
mod hook;

pub use decode::{decode, decode_with_options};
pub use descriptor::{read_schema_descriptor, write_schema_descriptor};
pub use encode::{encode, encode_with_options};
pub use hook::{
    decode_with_hook, decode_with_hook_and_options, AssetLoaderHook, PlacedKey, TransformContext,
    TransformHook,
};

use crate::binary::Endianness;

/// Options shared by the encoder and decoder. Both ends must agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Byte order of multi-byte primitives.
    pub endianness: Endianness,
}
