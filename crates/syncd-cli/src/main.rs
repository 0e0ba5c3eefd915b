// Copyright (c) Syncd contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under CLA

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use syncd_core::config::Config;
use syncd_core::protocol::PushMapping;
use syncd_core::push::{self, MappingSource};
use syncd_core::Reconciler;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "syncd", about = "Bidirectional filesystem/editor tree synchronization daemon", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the daemon, mirroring a connected editor's tree onto disk.
    Serve {
        /// Directory the filesystem mirror is rooted at.
        #[arg(long, value_name = "PATH")]
        sync_dir: Option<PathBuf>,
        /// TCP port the transport endpoint binds to.
        #[arg(long, value_name = "NUMBER")]
        port: Option<u16>,
        /// JSON config file, overlaid by any of the flags above.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// One-shot push of a source tree to a connected editor.
    Push {
        /// Filesystem path to push, relative to the current directory.
        #[arg(short, long, value_name = "PATH")]
        source: Option<PathBuf>,
        /// Destination instance path within the DataModel, dot-separated,
        /// e.g. `game.ServerScriptService`.
        #[arg(short, long, value_name = "DOTTED.PATH")]
        destination: Option<String>,
        /// Remove destination instances absent from the pushed tree.
        #[arg(long)]
        destructive: bool,
        /// Interpret `source` (or `--rojo-project`) as a Rojo-compatible
        /// project manifest instead of a plain directory.
        #[arg(long)]
        rojo: bool,
        /// Project manifest to push, when `--rojo` is set and the manifest
        /// isn't named by `--source`.
        #[arg(long = "rojo-project", value_name = "FILE")]
        rojo_project: Option<PathBuf>,
        /// Require an explicit `--source`/`--destination` instead of asking
        /// the connected editor for its own place-level mapping.
        #[arg(long = "no-place-config")]
        no_place_config: bool,
        /// TCP port the transport endpoint binds to.
        #[arg(long, value_name = "NUMBER")]
        port: Option<u16>,
    },

    /// One-shot build of a sourcemap-equivalent structure purely from disk.
    Build {
        /// Directory (or, with `--rojo`, project root) to build from.
        #[arg(long, value_name = "PATH")]
        sync_dir: Option<PathBuf>,
        /// Interpret the source as a Rojo-compatible project manifest.
        #[arg(long)]
        rojo: bool,
        /// Project manifest to build from, when `--rojo` is set and it isn't
        /// `default.project.json` under `--sync-dir`.
        #[arg(long = "rojo-project", value_name = "FILE")]
        rojo_project: Option<PathBuf>,
    },
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Installs a `tracing-subscriber` writing to stderr, gated on `RUST_LOG` or
/// the config's `debug` flag.
fn init_tracing(debug: bool) {
    if std::env::var("RUST_LOG").is_err() && !debug {
        return;
    }
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new("syncd_core=debug")
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Loads the config overlay from `--config`, or the documented defaults if
/// none was given.
fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(path).with_context(|| format!("reading config file {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn run_serve(sync_dir: Option<PathBuf>, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(config_path.as_ref())?;
    if let Some(sync_dir) = sync_dir {
        config.sync_dir = sync_dir;
    }
    if let Some(port) = port {
        config.port = port;
    }

    init_tracing(config.debug);
    tracing::info!(sync_dir = %config.sync_dir.display(), port = config.port, "starting syncd");

    let mut reconciler = Reconciler::start(config).context("starting daemon")?;
    let shutdown = reconciler.shutdown_handle();
    ctrlc::set_handler(move || shutdown.store(false, Ordering::SeqCst)).context("installing signal handler")?;

    reconciler.run().context("daemon loop")
}

fn run_push(
    source: Option<PathBuf>, destination: Option<String>, destructive: bool, rojo: bool, rojo_project: Option<PathBuf>,
    no_place_config: bool, port: Option<u16>,
) -> Result<()> {
    let mut config = Config::default();
    if let Some(port) = port {
        config.port = port;
    }
    init_tracing(config.debug);

    let mapping_source = match (source, destination) {
        (Some(source), Some(destination)) => {
            let destination = destination.split('.').map(String::from).collect();
            let source = if rojo { rojo_project.unwrap_or(source) } else { source };
            MappingSource::Explicit(vec![PushMapping {
                source: source.to_string_lossy().into_owned(),
                destination,
                destructive,
                rojo_mode: rojo,
            }])
        }
        (None, Some(destination)) if rojo => {
            let source = rojo_project.unwrap_or_else(|| config.sync_dir.join("default.project.json"));
            let destination = destination.split('.').map(String::from).collect();
            MappingSource::Explicit(vec![PushMapping {
                source: source.to_string_lossy().into_owned(),
                destination,
                destructive,
                rojo_mode: rojo,
            }])
        }
        (None, None) => {
            if no_place_config {
                bail!("--source and --destination are required when --no-place-config is set");
            }
            MappingSource::RequestFromEditor
        }
        _ => bail!("--source and --destination must be given together"),
    };

    push::run(&config, mapping_source).context("push failed")
}

fn run_build(sync_dir: Option<PathBuf>, rojo: bool, rojo_project: Option<PathBuf>) -> Result<()> {
    let mut config = Config::default();
    if let Some(sync_dir) = sync_dir {
        config.sync_dir = sync_dir;
    }
    init_tracing(config.debug);

    let source = if rojo { rojo_project.unwrap_or_else(|| config.sync_dir.join("default.project.json")) } else { config.sync_dir.clone() };
    let mapping = PushMapping { source: source.to_string_lossy().into_owned(), destination: vec![String::from("game")], destructive: false, rojo_mode: rojo };

    push::build(&config, std::slice::from_ref(&mapping)).context("build failed")
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { sync_dir, port, config } => run_serve(sync_dir, port, config),
        Command::Push { source, destination, destructive, rojo, rojo_project, no_place_config, port } => {
            run_push(source, destination, destructive, rojo, rojo_project, no_place_config, port)
        }
        Command::Build { sync_dir, rojo, rojo_project } => run_build(sync_dir, rojo, rojo_project),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            tracing::error!(%err, "exiting");
            ExitCode::from(1)
        }
    }
}
