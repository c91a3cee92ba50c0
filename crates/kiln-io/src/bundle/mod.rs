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

//! Building and reading asset bundles.
//!
//! [`collect_asset_uuids`] turns a set of root assets into the closure of
//! everything they reference, [`write_bundle`] streams those assets into a
//! [`BundleSink`](kiln_core::bundle::BundleSink), and [`BundleReader`] reads
//! the result back.

mod collector;
mod packer;
mod reader;
mod sink;

pub use collector::collect_asset_uuids;
pub use packer::{write_bundle, BundleSummary};
pub use reader::BundleReader;
pub use sink::{FileSink, FileWriteStream, MemorySink, MemoryWriteStream};
