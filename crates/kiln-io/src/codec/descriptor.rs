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

//! Binary descriptors of schemas.
//!
//! Encoded objects do not describe themselves, so a schema that has to travel
//! with the data (for tooling, or to check that both ends agree) is written
//! with these functions. Every node starts with its [`StorageType`] tag:
//!
//! - primitives: the tag alone
//! - struct: `u16` field count, then per field `u16` name id, string name,
//!   field descriptor
//! - array and nullable: the inner descriptor
//! - union: `u8` variant count, then each variant descriptor
//!
//! Descriptors are always little endian.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{CodecError, CodecResult};
use kiln_core::storage::{Schema, StorageType, StructField};

/// Serializes a schema tree.
pub fn write_schema_descriptor(schema: &Schema) -> CodecResult<Vec<u8>> {
    let mut writer = BinaryWriter::new();
    write_node(&mut writer, schema)?;
    Ok(writer.into_bytes())
}

/// Parses a schema tree written by [`write_schema_descriptor`].
pub fn read_schema_descriptor(bytes: &[u8]) -> CodecResult<Schema> {
    let mut reader = BinaryReader::new(bytes);
    let schema = read_node(&mut reader)?;
    if !reader.is_empty() {
        return Err(CodecError::SchemaMismatch(format!(
            "{} trailing bytes after the schema descriptor",
            reader.remaining()
        )));
    }
    Ok(schema)
}

fn write_node(writer: &mut BinaryWriter, schema: &Schema) -> CodecResult<()> {
    writer.write(schema.storage_type().tag());
    match schema {
        Schema::Primitive(_) => {}
        Schema::Struct(structure) => {
            let count = u16::try_from(structure.fields().len())
                .map_err(|_| CodecError::LengthOverflow(structure.fields().len()))?;
            writer.write(count);
            for field in structure.fields() {
                writer.write(field.name_id);
                writer.write_string(&field.name)?;
                write_node(writer, &field.schema)?;
            }
        }
        Schema::Array(inner) | Schema::Nullable(inner) => write_node(writer, inner)?,
        Schema::Union(variants) => {
            let count = u8::try_from(variants.len())
                .map_err(|_| CodecError::LengthOverflow(variants.len()))?;
            writer.write(count);
            for variant in variants {
                write_node(writer, variant)?;
            }
        }
    }
    Ok(())
}

fn read_node(reader: &mut BinaryReader<'_>) -> CodecResult<Schema> {
    let tag = reader.read::<u8>()?;
    let ty = StorageType::from_tag(tag).ok_or(CodecError::UnknownStorageTag(tag))?;

    let schema = match ty {
        StorageType::Struct => {
            let count = reader.read::<u16>()?;
            let mut fields = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let name_id = reader.read::<u16>()?;
                let name = reader.read_string()?;
                fields.push(StructField::new(name, name_id, read_node(reader)?));
            }
            Schema::structure(fields).map_err(invalid_schema)?
        }
        StorageType::Array => Schema::array(read_node(reader)?),
        StorageType::Nullable => Schema::nullable(read_node(reader)?),
        StorageType::Union => {
            let count = reader.read::<u8>()?;
            let variants = (0..count)
                .map(|_| read_node(reader))
                .collect::<CodecResult<Vec<_>>>()?;
            Schema::union(variants).map_err(invalid_schema)?
        }
        primitive => Schema::Primitive(primitive),
    };
    Ok(schema)
}

fn invalid_schema(error: kiln_core::storage::SchemaError) -> CodecError {
    CodecError::SchemaMismatch(format!("invalid schema descriptor: {error}"))
}
