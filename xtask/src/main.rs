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

// Asset bundle tooling for kiln projects
// Run with: cargo xtask <command>

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Asset bundle tooling for kiln projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect the manifest's bundle roots and pack them into one file
    Bundle {
        /// Project manifest; a missing file means an empty project
        #[arg(long, default_value = kiln_io::project::DEFAULT_MANIFEST_NAME)]
        manifest: PathBuf,
        /// Destination bundle file
        #[arg(long)]
        out: PathBuf,
    },
    /// List the entries of a bundle
    Inspect {
        /// Bundle file to read
        bundle: PathBuf,
    },
    /// Write the payload of one asset to a file
    Extract {
        /// Bundle file to read
        bundle: PathBuf,
        /// Asset to extract
        uuid: String,
        /// Destination file
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Bundle { manifest, out } => commands::bundle::run(&manifest, &out).await,
        Commands::Inspect { bundle } => commands::inspect::inspect(&bundle),
        Commands::Extract { bundle, uuid, out } => commands::inspect::extract(&bundle, &uuid, &out),
    };

    if let Err(error) = &result {
        helpers::print_error(&format!("{error:#}"));
    }
    result
}
