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

use super::CodecOptions;
use crate::binary::BinaryWriter;
use crate::error::{CodecError, CodecResult};
use kiln_core::{
    asset::AssetUuid,
    storage::{Schema, StorageType, StructSchema, Value},
};

/// Encodes `value` against `schema` with little-endian primitives.
///
/// Struct fields are written in schema declaration order, each preceded by
/// its name id. Fields missing from the value are written as the zero value
/// of their type, so a field is never omitted.
pub fn encode(value: &Value, schema: &Schema) -> CodecResult<Vec<u8>> {
    encode_with_options(value, schema, &CodecOptions::default())
}

/// Encodes `value` against `schema` with explicit options.
pub fn encode_with_options(
    value: &Value,
    schema: &Schema,
    options: &CodecOptions,
) -> CodecResult<Vec<u8>> {
    let mut writer = BinaryWriter::with_endianness(options.endianness);
    encode_node(&mut writer, value, schema)?;
    Ok(writer.into_bytes())
}

fn encode_node(writer: &mut BinaryWriter, value: &Value, schema: &Schema) -> CodecResult<()> {
    match schema {
        Schema::Primitive(ty) => encode_primitive(writer, *ty, value),
        Schema::Struct(structure) => encode_struct(writer, value, structure),
        Schema::Array(element) => match value {
            Value::Array(items) => {
                writer.write_length(items.len())?;
                for item in items {
                    encode_node(writer, item, element)?;
                }
                Ok(())
            }
            Value::Null => writer.write_length(0),
            other => Err(invalid(StorageType::Array, other)),
        },
        Schema::Nullable(inner) => {
            if value.is_null() {
                writer.write(0u8);
                Ok(())
            } else {
                writer.write(1u8);
                encode_node(writer, value, inner)
            }
        }
        Schema::Union(variants) => {
            let index = match variants.iter().position(|variant| variant.accepts(value)) {
                Some(index) => index,
                // An absent value takes the zero value of the first variant.
                None if value.is_null() => 0,
                None => return Err(invalid(StorageType::Union, value)),
            };
            let tag = u8::try_from(index).map_err(|_| {
                CodecError::SchemaMismatch(format!("union has more than 255 variants ({index})"))
            })?;
            writer.write(tag);
            encode_node(writer, value, &variants[index])
        }
    }
}

fn encode_struct(
    writer: &mut BinaryWriter,
    value: &Value,
    structure: &StructSchema,
) -> CodecResult<()> {
    match value {
        Value::Object(_) | Value::Null => {}
        other => return Err(invalid(StorageType::Struct, other)),
    }

    for field in structure.fields() {
        writer.write(field.name_id);
        let field_value = value.get(&field.name).unwrap_or(&Value::Null);
        encode_node(writer, field_value, &field.schema)?;
    }
    Ok(())
}

fn encode_primitive(writer: &mut BinaryWriter, ty: StorageType, value: &Value) -> CodecResult<()> {
    // Integer widths are truncated without range checks.
    match ty {
        StorageType::Int8 => writer.write(integer_bits(ty, value)? as i8),
        StorageType::Int16 => writer.write(integer_bits(ty, value)? as i16),
        StorageType::Int32 => writer.write(integer_bits(ty, value)? as i32),
        StorageType::UInt8 => writer.write(integer_bits(ty, value)? as u8),
        StorageType::UInt16 => writer.write(integer_bits(ty, value)? as u16),
        StorageType::UInt32 => writer.write(integer_bits(ty, value)? as u32),
        StorageType::BigInt64 => writer.write(integer_bits(ty, value)? as i64),
        StorageType::BigUInt64 => writer.write(integer_bits(ty, value)?),
        StorageType::Float32 => writer.write(float_value(ty, value)? as f32),
        StorageType::Float64 => writer.write(float_value(ty, value)?),
        StorageType::Bool => match value {
            Value::Bool(flag) => writer.write_bool(*flag),
            Value::Null => writer.write_bool(false),
            other => return Err(invalid(ty, other)),
        },
        StorageType::String => match value {
            Value::String(text) => writer.write_string(text)?,
            Value::Null => writer.write_string("")?,
            other => return Err(invalid(ty, other)),
        },
        StorageType::Buffer => match value {
            Value::Buffer(bytes) => writer.write_buffer(bytes)?,
            Value::Null => writer.write_buffer(&[])?,
            other => return Err(invalid(ty, other)),
        },
        StorageType::Uuid | StorageType::AssetUuid => {
            let uuid = match value {
                Value::Null => AssetUuid::nil(),
                Value::String(text) => AssetUuid::parse(text)?,
                Value::Asset(asset) => asset.uuid(),
                other => return Err(invalid(ty, other)),
            };
            writer.write_uuid(&uuid);
        }
        StorageType::Struct | StorageType::Array | StorageType::Union | StorageType::Nullable => {
            return Err(CodecError::SchemaMismatch(format!(
                "{ty} used as a primitive schema node"
            )))
        }
    }
    Ok(())
}

/// Two's complement bits of an integer value; callers truncate to width.
fn integer_bits(ty: StorageType, value: &Value) -> CodecResult<u64> {
    match value {
        Value::UInt(v) => Ok(*v),
        Value::Int(v) => Ok(*v as u64),
        Value::Float(v) if *v < 0.0 => Ok(*v as i64 as u64),
        Value::Float(v) => Ok(*v as u64),
        Value::Null => Ok(0),
        other => Err(invalid(ty, other)),
    }
}

fn float_value(ty: StorageType, value: &Value) -> CodecResult<f64> {
    match value {
        Value::Null => Ok(0.0),
        other => other.as_f64().ok_or_else(|| invalid(ty, other)),
    }
}

fn invalid(expected: StorageType, value: &Value) -> CodecError {
    CodecError::InvalidValue {
        expected,
        found: value.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::storage::StructField;

    #[test]
    fn fields_follow_declaration_order() {
        let schema = Schema::structure([
            StructField::new("b", 2, Schema::uint8()),
            StructField::new("a", 1, Schema::uint8()),
        ])
        .unwrap();
        let value = Value::object([("a", Value::from(10u8)), ("b", Value::from(20u8))]);

        // nameId 2, b, nameId 1, a
        assert_eq!(encode(&value, &schema).unwrap(), vec![2, 0, 20, 1, 0, 10]);
    }

    #[test]
    fn absent_fields_are_zero_filled() {
        let schema = Schema::structure([
            StructField::new("num", 1, Schema::uint32()),
            StructField::new("name", 2, Schema::string()),
            StructField::new("asset", 3, Schema::asset_uuid()),
        ])
        .unwrap();

        let bytes = encode(&Value::Object(Default::default()), &schema).unwrap();
        let mut expected = vec![1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 3, 0];
        expected.extend_from_slice(&[0u8; 16]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn array_is_count_prefixed() {
        let schema = Schema::array(Schema::uint16());
        let value = Value::Array(vec![1u16.into(), 2u16.into()]);
        assert_eq!(encode(&value, &schema).unwrap(), vec![2, 0, 0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn widths_truncate_without_range_checks() {
        assert_eq!(encode(&Value::from(300u32), &Schema::uint8()).unwrap(), vec![44]);
        assert_eq!(encode(&Value::from(-1i32), &Schema::uint16()).unwrap(), vec![0xff, 0xff]);
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        assert!(matches!(
            encode(&Value::from("text"), &Schema::uint32()),
            Err(CodecError::InvalidValue {
                expected: StorageType::UInt32,
                found: "string"
            })
        ));
        assert!(matches!(
            encode(&Value::from("nope"), &Schema::asset_uuid()),
            Err(CodecError::InvalidUuid(_))
        ));
        assert!(matches!(
            encode(&Value::from(1u8), &Schema::Primitive(StorageType::Struct)),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn union_picks_first_accepting_variant() {
        let schema = Schema::union([Schema::string(), Schema::uint8()]).unwrap();
        assert_eq!(encode(&Value::from(7u8), &schema).unwrap(), vec![1, 7]);
        assert_eq!(encode(&Value::from(""), &schema).unwrap(), vec![0, 0, 0, 0, 0]);
    }
}
