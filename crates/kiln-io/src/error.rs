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

//! Error types for the codec and the bundle services.

use kiln_core::{
    asset::{AssetUuid, UuidError},
    bundle::{BundleFormatError, SinkError},
    StorageType,
};
use thiserror::Error;

/// Errors raised while encoding or decoding objects.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The reader was asked for more bytes than remain in the buffer.
    #[error("unexpected end of buffer at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEndOfBuffer {
        /// Cursor position of the failed read.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// The bytes do not fit the schema they are decoded with.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A value handed to the encoder has the wrong shape for its schema node.
    #[error("cannot encode {found} as {expected}")]
    InvalidValue {
        /// The storage type the schema asked for.
        expected: StorageType,
        /// The kind of value that was supplied.
        found: &'static str,
    },

    /// A uuid string handed to the encoder could not be parsed.
    #[error(transparent)]
    InvalidUuid(#[from] UuidError),

    /// A string on the wire is not valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        /// Cursor position of the string bytes.
        offset: usize,
    },

    /// A length or count does not fit the 32 bit prefix.
    #[error("length {0} does not fit a 32 bit prefix")]
    LengthOverflow(usize),

    /// A schema descriptor names a storage tag that does not exist.
    #[error("unknown storage type tag {0}")]
    UnknownStorageTag(u8),

    /// A transform hook failed.
    #[error("transform hook failed: {0}")]
    Hook(#[source] anyhow::Error),
}

/// Convenience alias for codec results.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while collecting or packing a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The destination is already being written.
    #[error("bundle sink is unavailable: it is already in use")]
    SinkUnavailable,

    /// Writing to the destination failed.
    #[error("bundle sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A payload is too large for the 32 bit length field.
    #[error("payload of asset {uuid} is {length} bytes, more than a bundle entry can describe")]
    PayloadTooLarge {
        /// The offending asset.
        uuid: AssetUuid,
        /// Its payload length.
        length: usize,
    },

    /// More assets were requested than the 32 bit asset count can describe.
    #[error("{0} assets do not fit a bundle header")]
    TooManyAssets(usize),

    /// Enumerating the references of an asset failed.
    #[error("failed to enumerate references of asset {uuid}: {source}")]
    Reference {
        /// The asset whose references were requested.
        uuid: AssetUuid,
        /// The enumerator's error.
        #[source]
        source: anyhow::Error,
    },

    /// The bundle being read is malformed.
    #[error(transparent)]
    Format(#[from] BundleFormatError),

    /// The requested asset is not in the bundle.
    #[error("asset {0} is not in the bundle")]
    MissingAsset(AssetUuid),
}

impl From<SinkError> for BundleError {
    fn from(error: SinkError) -> Self {
        match error {
            SinkError::Unavailable => BundleError::SinkUnavailable,
            SinkError::Io(io) => BundleError::Io(io),
        }
    }
}

/// Convenience alias for bundle results.
pub type BundleResult<T> = Result<T, BundleError>;
