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

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Number of bytes an [`AssetUuid`] occupies in binary form.
pub const UUID_BYTE_LENGTH: usize = 16;

/// Errors produced when parsing an [`AssetUuid`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UuidError {
    /// The string is not a 36 character hyphenated uuid.
    #[error("invalid asset uuid '{0}'")]
    Invalid(String),
}

/// A globally unique, persistent identifier for a project asset.
///
/// The uuid names the "idea" of an asset, completely decoupled from the file
/// it is stored in. It travels on the wire as 16 raw bytes and in text form as
/// the 36 character hyphenated representation.
///
/// The all-zero uuid is reserved: binary encoders write it for "no asset", and
/// decoders turn it back into a null value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetUuid(Uuid);

impl AssetUuid {
    /// Creates a new, random (version 4) `AssetUuid`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic (version 5) `AssetUuid` from a name, such as a
    /// project-relative path.
    pub fn new_v5(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }

    /// The all-zero uuid.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` for the all-zero uuid.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Parses a hyphenated uuid string.
    pub fn parse(text: &str) -> Result<Self, UuidError> {
        if text.len() != 36 {
            return Err(UuidError::Invalid(text.to_string()));
        }
        Uuid::try_parse(text)
            .map(Self)
            .map_err(|_| UuidError::Invalid(text.to_string()))
    }

    /// Builds a uuid from its 16 byte binary form.
    pub const fn from_bytes(bytes: [u8; UUID_BYTE_LENGTH]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns the 16 byte binary form.
    pub fn as_bytes(&self) -> &[u8; UUID_BYTE_LENGTH] {
        self.0.as_bytes()
    }
}

impl Default for AssetUuid {
    /// Creates a new, random (version 4) `AssetUuid`.
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AssetUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for AssetUuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_are_inverse() {
        let text = "00000000-0000-0000-0000-000000000001";
        let uuid = AssetUuid::parse(text).unwrap();
        assert_eq!(uuid.to_string(), text);
        assert_eq!(uuid.as_bytes()[15], 1);
    }

    #[test]
    fn rejects_non_hyphenated_forms() {
        assert!(AssetUuid::parse("00000000000000000000000000000001").is_err());
        assert!(AssetUuid::parse("not-a-uuid").is_err());
    }

    #[test]
    fn nil_is_all_zero() {
        assert!(AssetUuid::nil().is_nil());
        assert_eq!(AssetUuid::nil().as_bytes(), &[0u8; 16]);
        assert!(!AssetUuid::new().is_nil());
    }

    #[test]
    fn v5_is_deterministic() {
        assert_eq!(
            AssetUuid::new_v5("textures/brick.png"),
            AssetUuid::new_v5("textures/brick.png")
        );
    }
}
