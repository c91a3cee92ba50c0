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

use super::{StorageType, Value};
use crate::asset::AssetUuid;
use std::collections::{HashMap, HashSet};

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two fields of one struct share a name id.
    #[error("name id {name_id} is used by both '{first}' and '{second}'")]
    DuplicateNameId {
        /// The repeated id.
        name_id: u16,
        /// The field that claimed the id first.
        first: String,
        /// The field that repeated it.
        second: String,
    },
    /// Two fields of one struct share a name.
    #[error("field '{0}' is declared more than once")]
    DuplicateFieldName(String),
    /// A composite storage type was used where a primitive is required.
    #[error("{0} is not a primitive storage type")]
    NotPrimitive(StorageType),
    /// A union was declared without variants.
    #[error("a union needs at least one variant")]
    EmptyUnion,
}

/// One field of a struct schema.
///
/// The `name_id` is what travels on the wire in place of the name. It must be
/// unique within its struct and must never change once data has been written
/// with it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    /// Field name on the runtime object.
    pub name: String,
    /// Stable wire identifier.
    pub name_id: u16,
    /// Shape of the field value.
    pub schema: Schema,
}

impl StructField {
    /// Creates a field.
    pub fn new(name: impl Into<String>, name_id: u16, schema: Schema) -> Self {
        Self {
            name: name.into(),
            name_id,
            schema,
        }
    }
}

/// The ordered field list of a struct schema, with a name id lookup table
/// built once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSchema {
    fields: Vec<StructField>,
    by_name_id: HashMap<u16, usize>,
}

impl StructSchema {
    /// Validates and indexes a field list. Declaration order is kept and is
    /// the order fields are written in.
    pub fn new(fields: impl IntoIterator<Item = StructField>) -> Result<Self, SchemaError> {
        let fields: Vec<StructField> = fields.into_iter().collect();
        let mut by_name_id = HashMap::with_capacity(fields.len());
        let mut names = HashSet::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName(field.name.clone()));
            }
            if let Some(previous) = by_name_id.insert(field.name_id, index) {
                return Err(SchemaError::DuplicateNameId {
                    name_id: field.name_id,
                    first: fields[previous].name.clone(),
                    second: field.name.clone(),
                });
            }
        }

        Ok(Self { fields, by_name_id })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[StructField] {
        &self.fields
    }

    /// Finds a field and its declaration index by wire id.
    pub fn field_by_name_id(&self, name_id: u16) -> Option<(usize, &StructField)> {
        self.by_name_id
            .get(&name_id)
            .map(|&index| (index, &self.fields[index]))
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// An immutable descriptor of a value's shape, shared by encoder and decoder.
///
/// The binary format is not self-describing: both ends must use the same
/// schema. Schemas are typically built once when an asset type is registered
/// and kept for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// A leaf value. Always holds a primitive [`StorageType`].
    Primitive(StorageType),
    /// Named fields written in declaration order.
    Struct(StructSchema),
    /// A count-prefixed list of elements of one schema.
    Array(Box<Schema>),
    /// One of several schemas, selected per value.
    Union(Vec<Schema>),
    /// A value that may be null.
    Nullable(Box<Schema>),
}

impl Schema {
    /// A primitive node. Fails for composite storage types.
    pub fn primitive(ty: StorageType) -> Result<Self, SchemaError> {
        if ty.is_primitive() {
            Ok(Schema::Primitive(ty))
        } else {
            Err(SchemaError::NotPrimitive(ty))
        }
    }

    /// A struct node.
    pub fn structure(fields: impl IntoIterator<Item = StructField>) -> Result<Self, SchemaError> {
        StructSchema::new(fields).map(Schema::Struct)
    }

    /// An array node.
    pub fn array(element: Schema) -> Self {
        Schema::Array(Box::new(element))
    }

    /// A nullable node.
    pub fn nullable(inner: Schema) -> Self {
        Schema::Nullable(Box::new(inner))
    }

    /// A union node.
    pub fn union(variants: impl IntoIterator<Item = Schema>) -> Result<Self, SchemaError> {
        let variants: Vec<Schema> = variants.into_iter().collect();
        if variants.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }
        Ok(Schema::Union(variants))
    }

    /// `INT8` leaf.
    pub const fn int8() -> Self {
        Schema::Primitive(StorageType::Int8)
    }

    /// `INT16` leaf.
    pub const fn int16() -> Self {
        Schema::Primitive(StorageType::Int16)
    }

    /// `INT32` leaf.
    pub const fn int32() -> Self {
        Schema::Primitive(StorageType::Int32)
    }

    /// `UINT8` leaf.
    pub const fn uint8() -> Self {
        Schema::Primitive(StorageType::UInt8)
    }

    /// `UINT16` leaf.
    pub const fn uint16() -> Self {
        Schema::Primitive(StorageType::UInt16)
    }

    /// `UINT32` leaf.
    pub const fn uint32() -> Self {
        Schema::Primitive(StorageType::UInt32)
    }

    /// `FLOAT32` leaf.
    pub const fn float32() -> Self {
        Schema::Primitive(StorageType::Float32)
    }

    /// `FLOAT64` leaf.
    pub const fn float64() -> Self {
        Schema::Primitive(StorageType::Float64)
    }

    /// `BIGINT64` leaf.
    pub const fn bigint64() -> Self {
        Schema::Primitive(StorageType::BigInt64)
    }

    /// `BIGUINT64` leaf.
    pub const fn biguint64() -> Self {
        Schema::Primitive(StorageType::BigUInt64)
    }

    /// `STRING` leaf.
    pub const fn string() -> Self {
        Schema::Primitive(StorageType::String)
    }

    /// `BOOL` leaf.
    pub const fn bool() -> Self {
        Schema::Primitive(StorageType::Bool)
    }

    /// `BUFFER` leaf.
    pub const fn buffer() -> Self {
        Schema::Primitive(StorageType::Buffer)
    }

    /// `UUID` leaf.
    pub const fn uuid() -> Self {
        Schema::Primitive(StorageType::Uuid)
    }

    /// `ASSET_UUID` leaf.
    pub const fn asset_uuid() -> Self {
        Schema::Primitive(StorageType::AssetUuid)
    }

    /// The storage type of this node.
    pub fn storage_type(&self) -> StorageType {
        match self {
            Schema::Primitive(ty) => *ty,
            Schema::Struct(_) => StorageType::Struct,
            Schema::Array(_) => StorageType::Array,
            Schema::Union(_) => StorageType::Union,
            Schema::Nullable(_) => StorageType::Nullable,
        }
    }

    /// Reports whether `value` structurally fits this node.
    ///
    /// Numeric leaves accept any number. Uuid leaves accept null, a uuid
    /// string or a live asset. Structs accept objects whose keys are all
    /// declared fields.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Schema::Primitive(ty) => primitive_accepts(*ty, value),
            Schema::Struct(structure) => match value {
                Value::Object(fields) => fields.keys().all(|key| structure.field(key).is_some()),
                _ => false,
            },
            Schema::Array(element) => match value {
                Value::Array(items) => items.iter().all(|item| element.accepts(item)),
                _ => false,
            },
            Schema::Union(variants) => variants.iter().any(|variant| variant.accepts(value)),
            Schema::Nullable(inner) => value.is_null() || inner.accepts(value),
        }
    }
}

fn primitive_accepts(ty: StorageType, value: &Value) -> bool {
    match ty {
        StorageType::Int8
        | StorageType::Int16
        | StorageType::Int32
        | StorageType::UInt8
        | StorageType::UInt16
        | StorageType::UInt32
        | StorageType::Float32
        | StorageType::Float64
        | StorageType::BigInt64
        | StorageType::BigUInt64 => {
            matches!(value, Value::Int(_) | Value::UInt(_) | Value::Float(_))
        }
        StorageType::String => matches!(value, Value::String(_)),
        StorageType::Bool => matches!(value, Value::Bool(_)),
        StorageType::Buffer => matches!(value, Value::Buffer(_)),
        StorageType::Uuid | StorageType::AssetUuid => match value {
            Value::Null | Value::Asset(_) => true,
            Value::String(text) => AssetUuid::parse(text).is_ok(),
            _ => false,
        },
        _ => false,
    }
}
