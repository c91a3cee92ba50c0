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

use std::fmt;

/// The kind of a schema node, with its compact numeric tag.
///
/// Tags are part of the schema descriptor format and must never be
/// renumbered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// Signed 8 bit integer.
    Int8 = 1,
    /// Signed 16 bit integer.
    Int16 = 2,
    /// Signed 32 bit integer.
    Int32 = 3,
    /// Unsigned 8 bit integer.
    UInt8 = 4,
    /// Unsigned 16 bit integer.
    UInt16 = 5,
    /// Unsigned 32 bit integer.
    UInt32 = 6,
    /// 32 bit float.
    Float32 = 7,
    /// 64 bit float.
    Float64 = 8,
    /// Signed 64 bit integer.
    BigInt64 = 9,
    /// Unsigned 64 bit integer.
    BigUInt64 = 10,
    /// Length-prefixed UTF-8 string.
    String = 11,
    /// Single byte boolean.
    Bool = 12,
    /// Length-prefixed raw bytes.
    Buffer = 13,
    /// A plain 16 byte uuid.
    Uuid = 14,
    /// A 16 byte uuid that references a project asset.
    AssetUuid = 15,
    /// Ordered named fields.
    Struct = 16,
    /// Count-prefixed homogeneous elements.
    Array = 17,
    /// One of several variants, prefixed with the variant index.
    Union = 18,
    /// An optional value, prefixed with a presence flag.
    Nullable = 19,
}

impl StorageType {
    /// Every storage type, in tag order.
    pub const ALL: [StorageType; 19] = [
        StorageType::Int8,
        StorageType::Int16,
        StorageType::Int32,
        StorageType::UInt8,
        StorageType::UInt16,
        StorageType::UInt32,
        StorageType::Float32,
        StorageType::Float64,
        StorageType::BigInt64,
        StorageType::BigUInt64,
        StorageType::String,
        StorageType::Bool,
        StorageType::Buffer,
        StorageType::Uuid,
        StorageType::AssetUuid,
        StorageType::Struct,
        StorageType::Array,
        StorageType::Union,
        StorageType::Nullable,
    ];

    /// The numeric tag of this storage type.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Looks up a storage type by tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|ty| ty.tag() == tag)
    }

    /// Returns `true` for leaf types, which carry a value rather than
    /// further schema nodes.
    pub const fn is_primitive(self) -> bool {
        !matches!(
            self,
            StorageType::Struct | StorageType::Array | StorageType::Union | StorageType::Nullable
        )
    }

    /// The encoded width in bytes of fixed-width primitives, `None` for
    /// variable-width and composite types.
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            StorageType::Int8 | StorageType::UInt8 | StorageType::Bool => Some(1),
            StorageType::Int16 | StorageType::UInt16 => Some(2),
            StorageType::Int32 | StorageType::UInt32 | StorageType::Float32 => Some(4),
            StorageType::Float64 | StorageType::BigInt64 | StorageType::BigUInt64 => Some(8),
            StorageType::Uuid | StorageType::AssetUuid => Some(16),
            _ => None,
        }
    }

    /// Upper-case name used in messages.
    pub const fn name(self) -> &'static str {
        match self {
            StorageType::Int8 => "INT8",
            StorageType::Int16 => "INT16",
            StorageType::Int32 => "INT32",
            StorageType::UInt8 => "UINT8",
            StorageType::UInt16 => "UINT16",
            StorageType::UInt32 => "UINT32",
            StorageType::Float32 => "FLOAT32",
            StorageType::Float64 => "FLOAT64",
            StorageType::BigInt64 => "BIGINT64",
            StorageType::BigUInt64 => "BIGUINT64",
            StorageType::String => "STRING",
            StorageType::Bool => "BOOL",
            StorageType::Buffer => "BUFFER",
            StorageType::Uuid => "UUID",
            StorageType::AssetUuid => "ASSET_UUID",
            StorageType::Struct => "STRUCT",
            StorageType::Array => "ARRAY",
            StorageType::Union => "UNION",
            StorageType::Nullable => "NULLABLE",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stable_and_unique() {
        for (index, ty) in StorageType::ALL.iter().enumerate() {
            assert_eq!(ty.tag() as usize, index + 1);
            assert_eq!(StorageType::from_tag(ty.tag()), Some(*ty));
        }
        assert_eq!(StorageType::from_tag(0), None);
        assert_eq!(StorageType::from_tag(200), None);
    }

    #[test]
    fn composite_types_have_no_fixed_width() {
        assert_eq!(StorageType::Struct.fixed_width(), None);
        assert_eq!(StorageType::String.fixed_width(), None);
        assert_eq!(StorageType::AssetUuid.fixed_width(), Some(16));
        assert!(!StorageType::Array.is_primitive());
        assert!(StorageType::Buffer.is_primitive());
    }
}
