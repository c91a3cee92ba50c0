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
use kiln_core::asset::AssetUuid;
use kiln_io::bundle::BundleReader;
use std::path::Path;

/// Prints the header of a bundle.
pub fn inspect(path: &Path) -> Result<()> {
    print_task_start("Inspecting Bundle", MAGNIFIER, CYAN);

    let reader = BundleReader::open(path)
        .with_context(|| format!("Failed to read bundle '{}'", path.display()))?;
    let header = reader.header();
    let unused = header.entries.iter().filter(|entry| entry.is_unused()).count();

    print_info(&format!(
        "{} header rows ({} unused), header is {}",
        header.entries.len(),
        unused,
        human_size(header.byte_length() as u64)
    ));
    for (offset, entry) in header.located_entries() {
        println!(
            "  {}{}{}  type {}  offset {:>8}  {}",
            BOLD,
            entry.asset_uuid,
            RESET,
            entry.asset_type_uuid,
            offset,
            human_size(entry.payload_length as u64)
        );
    }
    print_success(&format!("{} assets in '{}'", reader.entries().count(), path.display()));
    Ok(())
}

/// Writes the payload of `uuid` to `out`.
pub fn extract(path: &Path, uuid: &str, out: &Path) -> Result<()> {
    print_task_start("Extracting Asset", OUTBOX, CYAN);

    let uuid = AssetUuid::parse(uuid)?;
    let mut reader = BundleReader::open(path)
        .with_context(|| format!("Failed to read bundle '{}'", path.display()))?;
    let payload = reader.read_payload(uuid)?;

    std::fs::write(out, &payload)
        .with_context(|| format!("Failed to write '{}'", out.display()))?;
    print_success(&format!(
        "Extracted {uuid} to '{}' ({})",
        out.display(),
        human_size(payload.len() as u64)
    ));
    Ok(())
}
