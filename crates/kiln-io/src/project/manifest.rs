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

use kiln_core::{asset::AssetUuid, bundle::BundleDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up when no manifest path is given.
pub const DEFAULT_MANIFEST_NAME: &str = "Assets.toml";

fn default_root() -> PathBuf {
    PathBuf::from("assets")
}

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest '{path}': {source}")]
    Io {
        /// Path of the manifest.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML, or does not have the expected shape.
    #[error("failed to parse manifest '{path}': {source}")]
    Parse {
        /// Path of the manifest.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// One asset known to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Identity of the asset.
    pub uuid: AssetUuid,
    /// Identity of the asset's type.
    pub type_uuid: AssetUuid,
    /// Payload file, relative to the manifest's asset root.
    pub path: PathBuf,
    /// Assets this one depends on.
    #[serde(default)]
    pub references: Vec<AssetUuid>,
}

/// A default asset link: `uuid` stands in for `original`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultLinkRecord {
    /// The link.
    pub uuid: AssetUuid,
    /// The asset it points at.
    pub original: AssetUuid,
}

/// The `Assets.toml` project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Directory holding the payload files, relative to the manifest.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Every asset of the project.
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    /// Default asset links.
    #[serde(default)]
    pub default_links: Vec<DefaultLinkRecord>,
    /// What to put in the project's bundle.
    #[serde(default)]
    pub bundle: BundleDescriptor,
}

impl Default for ProjectManifest {
    /// An empty project whose payloads live in `assets/`.
    fn default() -> Self {
        Self {
            root: default_root(),
            assets: Vec::new(),
            default_links: Vec::new(),
            bundle: BundleDescriptor::default(),
        }
    }
}

impl ProjectManifest {
    /// Parses a manifest from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`load`](Self::load), but an absent file yields the default
    /// manifest.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading project manifest '{}'", path.display());
            Self::load(path)
        } else {
            log::info!(
                "No manifest found at '{}', using the default configuration",
                path.display()
            );
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_manifest_parses() {
        let manifest = ProjectManifest::from_toml(
            r#"
            root = "content"

            [[assets]]
            uuid = "6f1c1f1e-3a3b-4c1d-9a51-1d2b3c4d5e6f"
            type_uuid = "0e4ad7c2-1f4b-4f0a-8a11-52c1a4f1e2d3"
            path = "meshes/rock.bin"
            references = ["a7d0c5a6-9b1e-4d7e-8f3a-2b4c6d8e0f12"]

            [[default_links]]
            uuid = "a7d0c5a6-9b1e-4d7e-8f3a-2b4c6d8e0f12"
            original = "6f1c1f1e-3a3b-4c1d-9a51-1d2b3c4d5e6f"

            [bundle]
            assets = [{ uuid = "6f1c1f1e-3a3b-4c1d-9a51-1d2b3c4d5e6f" }]
            exclude_recursive = ["0e4ad7c2-1f4b-4f0a-8a11-52c1a4f1e2d3"]
            "#,
        )
        .unwrap();

        assert_eq!(manifest.root, PathBuf::from("content"));
        assert_eq!(manifest.assets.len(), 1);
        assert_eq!(manifest.assets[0].references.len(), 1);
        assert_eq!(manifest.default_links.len(), 1);
        assert!(manifest.bundle.assets[0].include_children);
        assert!(manifest.bundle.exclude.is_empty());
        assert_eq!(manifest.bundle.exclude_recursive.len(), 1);
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        assert_eq!(
            ProjectManifest::from_toml("").unwrap(),
            ProjectManifest::default()
        );
    }

    #[test]
    fn malformed_uuid_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MANIFEST_NAME);
        std::fs::write(
            &path,
            "[[assets]]\nuuid = \"nope\"\ntype_uuid = \"nope\"\npath = \"x\"\n",
        )
        .unwrap();

        assert!(matches!(
            ProjectManifest::load(&path),
            Err(ManifestError::Parse { .. })
        ));
    }

    #[test]
    fn missing_manifest_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ProjectManifest::load_or_default(dir.path().join("Missing.toml")).unwrap();
        assert_eq!(manifest, ProjectManifest::default());
        assert!(matches!(
            ProjectManifest::load(dir.path().join("Missing.toml")),
            Err(ManifestError::Io { .. })
        ));
    }
}
