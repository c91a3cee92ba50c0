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

use super::{hook::PlacedKey, CodecOptions};
use crate::binary::BinaryReader;
use crate::error::{CodecError, CodecResult};
use kiln_core::storage::{Schema, StorageType, StructSchema, Value};
use std::collections::BTreeMap;

/// A decoded leaf, in the order it was read.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedLeaf {
    /// Keys from the root down to the leaf. Empty for a primitive root.
    pub path: Vec<PlacedKey>,
    /// Storage type the leaf was decoded as.
    pub storage_type: StorageType,
}

/// A decoded value plus the leaves it contains, depth-first in declaration
/// order.
pub(crate) struct Decoded {
    pub value: Value,
    pub leaves: Vec<DecodedLeaf>,
}

/// Decodes `bytes` against `schema` with little-endian primitives.
///
/// The all-zero uuid decodes to [`Value::Null`]. Every byte must be consumed;
/// leftovers mean the schema does not describe the buffer.
pub fn decode(bytes: &[u8], schema: &Schema) -> CodecResult<Value> {
    decode_with_options(bytes, schema, &CodecOptions::default())
}

/// Decodes `bytes` against `schema` with explicit options.
pub fn decode_with_options(
    bytes: &[u8],
    schema: &Schema,
    options: &CodecOptions,
) -> CodecResult<Value> {
    decode_tree(bytes, schema, options, false).map(|decoded| decoded.value)
}

pub(crate) fn decode_tree(
    bytes: &[u8],
    schema: &Schema,
    options: &CodecOptions,
    record_leaves: bool,
) -> CodecResult<Decoded> {
    let mut decoder = TreeDecoder {
        reader: BinaryReader::with_endianness(bytes, options.endianness),
        path: Vec::new(),
        leaves: record_leaves.then(Vec::new),
    };
    let value = decoder.node(schema)?;

    if !decoder.reader.is_empty() {
        return Err(CodecError::SchemaMismatch(format!(
            "{} trailing bytes after the decoded value",
            decoder.reader.remaining()
        )));
    }

    Ok(Decoded {
        value,
        leaves: decoder.leaves.unwrap_or_default(),
    })
}

struct TreeDecoder<'a> {
    reader: BinaryReader<'a>,
    path: Vec<PlacedKey>,
    leaves: Option<Vec<DecodedLeaf>>,
}

impl TreeDecoder<'_> {
    fn node(&mut self, schema: &Schema) -> CodecResult<Value> {
        match schema {
            Schema::Primitive(ty) => {
                let value = self.primitive(*ty)?;
                self.record_leaf(*ty);
                Ok(value)
            }
            Schema::Struct(structure) => self.structure(structure),
            Schema::Array(element) => {
                let count = self.reader.read_length()?;
                self.check_count(count, element)?;
                let mut items = Vec::with_capacity(count);
                for index in 0..count {
                    self.path.push(PlacedKey::Index(index));
                    let item = self.node(element);
                    self.path.pop();
                    items.push(item?);
                }
                Ok(Value::Array(items))
            }
            Schema::Nullable(inner) => match self.reader.read::<u8>()? {
                0 => {
                    self.record_leaf(inner.storage_type());
                    Ok(Value::Null)
                }
                1 => self.node(inner),
                flag => Err(CodecError::SchemaMismatch(format!(
                    "invalid nullable presence flag {flag}"
                ))),
            },
            Schema::Union(variants) => {
                let index = self.reader.read::<u8>()? as usize;
                let variant = variants.get(index).ok_or_else(|| {
                    CodecError::SchemaMismatch(format!(
                        "union variant {index} out of range ({} variants)",
                        variants.len()
                    ))
                })?;
                self.node(variant)
            }
        }
    }

    fn structure(&mut self, structure: &StructSchema) -> CodecResult<Value> {
        let mut fields = BTreeMap::new();

        for (expected_index, expected) in structure.fields().iter().enumerate() {
            let name_id = self.reader.read::<u16>()?;
            let field = match structure.field_by_name_id(name_id) {
                Some((index, field)) if index == expected_index => field,
                Some((_, field)) => {
                    return Err(CodecError::SchemaMismatch(format!(
                        "field '{}' (name id {name_id}) found where '{}' (name id {}) was expected",
                        field.name, expected.name, expected.name_id
                    )))
                }
                None => {
                    return Err(CodecError::SchemaMismatch(format!(
                        "name id {name_id} does not map to a field of the struct"
                    )))
                }
            };

            self.path.push(PlacedKey::Field(field.name.clone()));
            let value = self.node(&field.schema);
            self.path.pop();
            fields.insert(field.name.clone(), value?);
        }

        Ok(Value::Object(fields))
    }

    fn primitive(&mut self, ty: StorageType) -> CodecResult<Value> {
        let reader = &mut self.reader;
        Ok(match ty {
            StorageType::Int8 => Value::from(reader.read::<i8>()?),
            StorageType::Int16 => Value::from(reader.read::<i16>()?),
            StorageType::Int32 => Value::from(reader.read::<i32>()?),
            StorageType::UInt8 => Value::from(reader.read::<u8>()?),
            StorageType::UInt16 => Value::from(reader.read::<u16>()?),
            StorageType::UInt32 => Value::from(reader.read::<u32>()?),
            StorageType::BigInt64 => Value::from(reader.read::<i64>()?),
            StorageType::BigUInt64 => Value::from(reader.read::<u64>()?),
            StorageType::Float32 => Value::from(reader.read::<f32>()?),
            StorageType::Float64 => Value::from(reader.read::<f64>()?),
            StorageType::Bool => Value::Bool(reader.read_bool()?),
            StorageType::String => Value::String(reader.read_string()?),
            StorageType::Buffer => Value::Buffer(reader.read_buffer()?),
            StorageType::Uuid | StorageType::AssetUuid => Value::from(reader.read_uuid()?),
            StorageType::Struct | StorageType::Array | StorageType::Union | StorageType::Nullable => {
                return Err(CodecError::SchemaMismatch(format!(
                    "{ty} used as a primitive schema node"
                )))
            }
        })
    }

    /// Rejects element counts the remaining bytes cannot hold, before any
    /// element is allocated.
    fn check_count(&self, count: usize, element: &Schema) -> CodecResult<()> {
        let remaining = self.reader.remaining();
        match min_encoded_width(element) {
            0 if count > remaining => Err(CodecError::SchemaMismatch(format!(
                "array of {count} zero-width elements in a buffer with {remaining} bytes left"
            ))),
            0 => Ok(()),
            width => match count.checked_mul(width) {
                Some(needed) if needed <= remaining => Ok(()),
                needed => Err(CodecError::UnexpectedEndOfBuffer {
                    offset: self.reader.position(),
                    needed: needed.unwrap_or(usize::MAX),
                    remaining,
                }),
            },
        }
    }

    fn record_leaf(&mut self, storage_type: StorageType) {
        if let Some(leaves) = &mut self.leaves {
            leaves.push(DecodedLeaf {
                path: self.path.clone(),
                storage_type,
            });
        }
    }
}

/// The fewest bytes any value of `schema` encodes to.
fn min_encoded_width(schema: &Schema) -> usize {
    match schema {
        // Strings and buffers carry at least their length prefix.
        Schema::Primitive(ty) => ty.fixed_width().unwrap_or(4),
        Schema::Struct(structure) => structure
            .fields()
            .iter()
            .map(|field| 2 + min_encoded_width(&field.schema))
            .sum(),
        Schema::Array(_) => 4,
        Schema::Nullable(_) => 1,
        Schema::Union(variants) => 1 + variants.iter().map(min_encoded_width).min().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use kiln_core::storage::StructField;

    fn sample_schema() -> Schema {
        Schema::structure([
            StructField::new("a", 1, Schema::uint32()),
            StructField::new("b", 2, Schema::asset_uuid()),
        ])
        .unwrap()
    }

    #[test]
    fn nil_uuid_decodes_to_null() {
        let bytes = encode(&Value::Null, &Schema::asset_uuid()).unwrap();
        assert_eq!(decode(&bytes, &Schema::asset_uuid()).unwrap(), Value::Null);
    }

    #[test]
    fn unknown_name_id_is_a_schema_mismatch() {
        let bytes = [9u8, 0, 1, 0, 0, 0];
        let schema = Schema::structure([StructField::new("a", 1, Schema::uint32())]).unwrap();
        assert!(matches!(
            decode(&bytes, &schema),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn reordered_name_ids_are_a_schema_mismatch() {
        let writer_schema = Schema::structure([
            StructField::new("b", 2, Schema::uint8()),
            StructField::new("a", 1, Schema::uint8()),
        ])
        .unwrap();
        let reader_schema = Schema::structure([
            StructField::new("a", 1, Schema::uint8()),
            StructField::new("b", 2, Schema::uint8()),
        ])
        .unwrap();
        let bytes = encode(&Value::Null, &writer_schema).unwrap();
        assert!(matches!(
            decode(&bytes, &reader_schema),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn truncated_input_is_an_unexpected_end() {
        let bytes = encode(&Value::object([("a", Value::from(5u32))]), &sample_schema()).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 3], &sample_schema()),
            Err(CodecError::UnexpectedEndOfBuffer { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_a_schema_mismatch() {
        let mut bytes = encode(&Value::from(1u8), &Schema::uint8()).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode(&bytes, &Schema::uint8()),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn huge_count_of_empty_structs_is_a_schema_mismatch() {
        let schema = Schema::array(Schema::structure(Vec::<StructField>::new()).unwrap());
        let bytes = u32::MAX.to_le_bytes();
        assert!(matches!(
            decode(&bytes, &schema),
            Err(CodecError::SchemaMismatch(_))
        ));

        let mut bytes = 3u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode(&bytes, &schema),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn count_larger_than_the_buffer_fails_before_decoding_elements() {
        let mut bytes = 3u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0; 8]);
        assert!(matches!(
            decode(&bytes, &Schema::array(Schema::uint32())),
            Err(CodecError::UnexpectedEndOfBuffer {
                offset: 4,
                needed: 12,
                remaining: 8
            })
        ));
    }

    #[test]
    fn empty_structs_within_the_count_bound_decode() {
        let schema = Schema::array(Schema::structure(Vec::<StructField>::new()).unwrap());
        let bytes = 0u32.to_le_bytes();
        assert_eq!(decode(&bytes, &schema).unwrap(), Value::Array(Vec::new()));
    }

    #[test]
    fn leaves_are_recorded_depth_first() {
        let schema = Schema::structure([
            StructField::new("first", 1, Schema::array(Schema::uint8())),
            StructField::new("second", 2, Schema::nullable(Schema::string())),
        ])
        .unwrap();
        let value = Value::object([(
            "first",
            Value::Array(vec![Value::from(1u8), Value::from(2u8)]),
        )]);
        let bytes = encode(&value, &schema).unwrap();
        let decoded = decode_tree(&bytes, &schema, &CodecOptions::default(), true).unwrap();

        let paths: Vec<_> = decoded.leaves.iter().map(|leaf| leaf.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec![PlacedKey::Field("first".into()), PlacedKey::Index(0)],
                vec![PlacedKey::Field("first".into()), PlacedKey::Index(1)],
                vec![PlacedKey::Field("second".into())],
            ]
        );
        assert_eq!(decoded.leaves[2].storage_type, StorageType::String);
    }
}
