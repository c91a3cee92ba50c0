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

use crate::helpers::*;
use anyhow::{Context, Result};
use kiln_io::bundle::FileSink;
use kiln_io::project::{ProjectAssets, ProjectManifest};
use kiln_io::AssetBundler;
use std::path::Path;

/// Bundles the `[bundle]` section of the manifest at `manifest_path` into `out`.
pub async fn run(manifest_path: &Path, out: &Path) -> Result<()> {
    print_task_start("Bundling Assets", PACKAGE, MAGENTA);

    let manifest = ProjectManifest::load_or_default(manifest_path)?;
    if manifest.bundle.assets.is_empty() {
        print_warning("The manifest names no bundle roots; the bundle will be empty.");
    }

    // Payload paths are relative to the directory holding the manifest.
    let base_dir = manifest_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let assets = ProjectAssets::new(&manifest, base_dir);
    print_info(&format!(
        "{} assets known, payloads under '{}'",
        assets.len(),
        assets.asset_root().display()
    ));

    if let Some(parent) = out.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    let links = assets.default_links().clone();
    let bundler = AssetBundler::new(assets, links);
    let summary = bundler
        .bundle(&manifest.bundle, &FileSink::new(out))
        .await
        .with_context(|| format!("Failed to write bundle '{}'", out.display()))?;

    for uuid in &summary.skipped {
        print_warning(&format!("Skipped {uuid}: no type or payload available"));
    }
    print_success(&format!(
        "Wrote {} of {} assets to '{}' ({})",
        summary.written.len(),
        summary.requested,
        out.display(),
        human_size(summary.total_bytes)
    ));
    Ok(())
}
