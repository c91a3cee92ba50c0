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

//! Schema types for the binary object codec.
//!
//! A [`Schema`] is a recursive descriptor built from [`StorageType`] nodes:
//! primitive leaves, structs with stable per-field name ids, arrays, unions
//! and nullable wrappers. [`Value`] is the runtime representation the codec
//! reads from and writes into.

mod schema;
mod storage_type;
mod value;

pub use schema::*;
pub use storage_type::*;
pub use value::*;
