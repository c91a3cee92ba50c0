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

use anyhow::Result;
use async_trait::async_trait;
use kiln_core::asset::{Asset, AssetLoadOptions, AssetLoader, AssetUuid, LiveAsset};
use kiln_core::storage::{Schema, StorageType, StructField, Value};
use kiln_io::codec::{
    decode, decode_with_hook, decode_with_options, encode, encode_with_options, AssetLoaderHook,
    CodecOptions, PlacedKey, TransformContext, TransformHook,
};
use kiln_io::binary::Endianness;
use kiln_io::CodecError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

const FIRST_ASSET: &str = "00000000-0000-0000-0000-000000000001";

fn material_schema() -> Schema {
    Schema::structure([
        StructField::new("name", 1, Schema::string()),
        StructField::new("albedo", 2, Schema::asset_uuid()),
        StructField::new("tint", 3, Schema::array(Schema::float64())),
        StructField::new("opacity", 4, Schema::nullable(Schema::float32())),
        StructField::new("flags", 5, Schema::uint16()),
        StructField::new("offset", 6, Schema::int32()),
        StructField::new("blob", 7, Schema::buffer()),
        StructField::new(
            "layers",
            8,
            Schema::array(
                Schema::structure([
                    StructField::new("texture", 1, Schema::asset_uuid()),
                    StructField::new("scale", 2, Schema::biguint64()),
                ])
                .unwrap(),
            ),
        ),
        StructField::new(
            "extra",
            9,
            Schema::union([Schema::bool(), Schema::string()]).unwrap(),
        ),
    ])
    .unwrap()
}

#[test]
fn nested_value_round_trips() -> Result<()> {
    let schema = material_schema();
    let value = Value::object([
        ("name", Value::from("rock")),
        ("albedo", Value::from(AssetUuid::new())),
        ("tint", Value::from(vec![Value::from(0.5), Value::from(1.0)])),
        ("opacity", Value::from(0.25f32)),
        ("flags", Value::from(7u16)),
        ("offset", Value::from(-12i32)),
        ("blob", Value::from(vec![1u8, 2, 3])),
        (
            "layers",
            Value::from(vec![Value::object([
                ("texture", Value::Null),
                ("scale", Value::from(u64::MAX)),
            ])]),
        ),
        ("extra", Value::from("label")),
    ]);

    let bytes = encode(&value, &schema)?;
    assert_eq!(decode(&bytes, &schema)?, value);

    let options = CodecOptions {
        endianness: Endianness::Big,
    };
    let bytes = encode_with_options(&value, &schema, &options)?;
    assert_eq!(decode_with_options(&bytes, &schema, &options)?, value);
    Ok(())
}

#[test]
fn absent_fields_decode_as_zero_values() -> Result<()> {
    let schema = material_schema();
    let bytes = encode(&Value::object([("name", Value::from("bare"))]), &schema)?;
    let decoded = decode(&bytes, &schema)?;

    assert_eq!(decoded.get("name"), Some(&Value::from("bare")));
    assert_eq!(decoded.get("albedo"), Some(&Value::Null));
    assert_eq!(decoded.get("tint"), Some(&Value::Array(Vec::new())));
    assert_eq!(decoded.get("opacity"), Some(&Value::Null));
    assert_eq!(decoded.get("flags"), Some(&Value::from(0u16)));
    assert_eq!(decoded.get("blob"), Some(&Value::Buffer(Vec::new())));
    assert_eq!(decoded.get("extra"), Some(&Value::Bool(false)));
    Ok(())
}

#[test]
fn decoding_with_a_different_schema_is_a_mismatch() -> Result<()> {
    let written = Schema::structure([
        StructField::new("a", 1, Schema::uint8()),
        StructField::new("b", 2, Schema::uint8()),
    ])?;
    let swapped = Schema::structure([
        StructField::new("b", 2, Schema::uint8()),
        StructField::new("a", 1, Schema::uint8()),
    ])?;

    let bytes = encode(&Value::object([("a", Value::from(1u8))]), &written)?;
    assert!(matches!(
        decode(&bytes, &swapped),
        Err(CodecError::SchemaMismatch(_))
    ));
    Ok(())
}

#[test]
fn truncated_input_reports_end_of_buffer() -> Result<()> {
    let schema = material_schema();
    let mut bytes = encode(&Value::object([("name", Value::from("rock"))]), &schema)?;
    bytes.truncate(bytes.len() - 1);

    assert!(matches!(
        decode(&bytes, &schema),
        Err(CodecError::UnexpectedEndOfBuffer { .. })
    ));
    Ok(())
}

/// Records every call and replaces nothing.
#[derive(Default)]
struct RecordingHook {
    calls: Mutex<Vec<(PlacedKey, StorageType, usize)>>,
}

#[async_trait]
impl TransformHook for RecordingHook {
    async fn transform(&self, context: TransformContext<'_>) -> Result<Option<Value>> {
        let siblings = match context.placed_on_object {
            Some(Value::Object(fields)) => fields.len(),
            _ => 0,
        };
        self.calls.lock().unwrap().push((
            context.placed_on_key.clone(),
            context.storage_type,
            siblings,
        ));
        Ok(None)
    }
}

#[tokio::test]
async fn hook_sees_leaves_in_declaration_order() -> Result<()> {
    let schema = Schema::structure([
        StructField::new("a", 1, Schema::uint32()),
        StructField::new("b", 2, Schema::asset_uuid()),
    ])?;
    let value = Value::object([
        ("a", Value::from(3u32)),
        ("b", Value::from(FIRST_ASSET)),
    ]);

    let hook = RecordingHook::default();
    let decoded = decode_with_hook(&encode(&value, &schema)?, &schema, &hook).await?;

    assert_eq!(decoded, value);
    assert_eq!(
        *hook.calls.lock().unwrap(),
        vec![
            (PlacedKey::Field("a".into()), StorageType::UInt32, 2),
            (PlacedKey::Field("b".into()), StorageType::AssetUuid, 2),
        ]
    );
    Ok(())
}

/// Suspends in the middle of every call and notes whether another call was
/// still running when it started.
#[derive(Default)]
struct SuspendingHook {
    in_flight: AtomicBool,
    overlapped: AtomicBool,
    order: Mutex<Vec<PlacedKey>>,
}

#[async_trait]
impl TransformHook for SuspendingHook {
    async fn transform(&self, context: TransformContext<'_>) -> Result<Option<Value>> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.order.lock().unwrap().push(context.placed_on_key.clone());
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        self.in_flight.store(false, Ordering::SeqCst);
        Ok(None)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn suspending_hook_calls_never_overlap() -> Result<()> {
    let schema = Schema::structure([
        StructField::new("a", 1, Schema::uint32()),
        StructField::new("b", 2, Schema::asset_uuid()),
    ])?;
    let value = Value::object([
        ("a", Value::from(3u32)),
        ("b", Value::from(FIRST_ASSET)),
    ]);

    let hook = SuspendingHook::default();
    let decoded = decode_with_hook(&encode(&value, &schema)?, &schema, &hook).await?;

    assert_eq!(decoded, value);
    assert!(!hook.overlapped.load(Ordering::SeqCst));
    assert!(!hook.in_flight.load(Ordering::SeqCst));
    assert_eq!(
        *hook.order.lock().unwrap(),
        vec![PlacedKey::Field("a".into()), PlacedKey::Field("b".into())]
    );
    Ok(())
}

/// Replaces every asset reference with `{loadedAssetUuid: uuid}`.
struct EchoLoadHook;

#[async_trait]
impl TransformHook for EchoLoadHook {
    async fn transform(&self, context: TransformContext<'_>) -> Result<Option<Value>> {
        if context.storage_type != StorageType::AssetUuid {
            return Ok(None);
        }
        Ok(Some(Value::object([(
            "loadedAssetUuid",
            context.value.clone(),
        )])))
    }
}

#[tokio::test]
async fn hook_replacements_are_installed_in_place() -> Result<()> {
    let schema = Schema::structure([
        StructField::new("asset", 1, Schema::asset_uuid()),
        StructField::new("num", 2, Schema::uint32()),
    ])?;
    let value = Value::object([
        ("asset", Value::from(FIRST_ASSET)),
        ("num", Value::from(42u32)),
    ]);

    let decoded = decode_with_hook(&encode(&value, &schema)?, &schema, &EchoLoadHook).await?;

    assert_eq!(
        decoded,
        Value::object([
            (
                "asset",
                Value::object([("loadedAssetUuid", Value::from(FIRST_ASSET))]),
            ),
            ("num", Value::from(42u32)),
        ])
    );
    Ok(())
}

#[derive(Debug, PartialEq)]
struct Texture {
    width: u32,
}
impl Asset for Texture {}

/// Loads textures whose width is the last byte of their uuid.
#[derive(Default)]
struct TextureLoader {
    requests: Mutex<Vec<(AssetUuid, AssetLoadOptions)>>,
}

#[async_trait]
impl AssetLoader for TextureLoader {
    async fn get_asset(&self, uuid: AssetUuid, options: &AssetLoadOptions) -> Result<LiveAsset> {
        self.requests.lock().unwrap().push((uuid, options.clone()));
        let width = u32::from(uuid.as_bytes()[15]);
        Ok(LiveAsset::new(uuid, Texture { width }))
    }
}

#[tokio::test]
async fn asset_loader_hook_installs_live_assets() -> Result<()> {
    let schema = Schema::structure([
        StructField::new("textures", 1, Schema::array(Schema::asset_uuid())),
        StructField::new("label", 2, Schema::string()),
    ])?;
    let value = Value::object([
        (
            "textures",
            Value::from(vec![Value::from(FIRST_ASSET), Value::Null]),
        ),
        ("label", Value::from(FIRST_ASSET)),
    ]);

    let options = AssetLoadOptions {
        expected_type: Some(AssetUuid::new_v5("texture")),
        create_new_instance: true,
    };
    let hook = AssetLoaderHook::with_options(TextureLoader::default(), options.clone());
    let decoded = decode_with_hook(&encode(&value, &schema)?, &schema, &hook).await?;

    let textures = decoded.get("textures").and_then(Value::as_array).unwrap();
    let live = textures[0].as_asset().unwrap();
    assert_eq!(live.uuid(), AssetUuid::parse(FIRST_ASSET)?);
    assert_eq!(live.downcast::<Texture>().unwrap().width, 1);
    assert_eq!(textures[1], Value::Null);
    // Plain strings are not asset references.
    assert_eq!(decoded.get("label"), Some(&Value::from(FIRST_ASSET)));

    let expected_uuid = AssetUuid::parse(FIRST_ASSET)?;
    assert_eq!(
        *hook_requests(&hook),
        vec![(expected_uuid, options)]
    );
    Ok(())
}

fn hook_requests(
    hook: &AssetLoaderHook<TextureLoader>,
) -> std::sync::MutexGuard<'_, Vec<(AssetUuid, AssetLoadOptions)>> {
    hook.loader().requests.lock().unwrap()
}

#[tokio::test]
async fn failing_hook_aborts_the_decode() -> Result<()> {
    struct Failing;

    #[async_trait]
    impl TransformHook for Failing {
        async fn transform(&self, _: TransformContext<'_>) -> Result<Option<Value>> {
            anyhow::bail!("loader offline")
        }
    }

    let bytes = encode(&Value::from(FIRST_ASSET), &Schema::asset_uuid())?;
    assert!(matches!(
        decode_with_hook(&bytes, &Schema::asset_uuid(), &Failing).await,
        Err(CodecError::Hook(_))
    ));
    Ok(())
}
