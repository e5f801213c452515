// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EGADS-Lite command line tool.
//!
//! Loads a JSON model snapshot and either exports one of its models to an
//! EGADS-lite byte stream or prints a summary of what it contains.
//!
//! Buffer sizing and the equivalence tolerance come from the
//! `EGADS_LITE_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use egads_lite_export::{ExportConfig, Exporter};
use egads_lite_topology::{BrepArena, ModelExtra, ModelKey};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "egads-lite", version, about = "Export B-Rep snapshots to EGADS-lite streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a model to a binary stream.
    Export {
        /// JSON snapshot to read.
        input: PathBuf,
        /// Stream file to write.
        output: PathBuf,
        /// 1-based model index within the snapshot.
        #[arg(long, default_value_t = 1)]
        model: usize,
    },
    /// Print a JSON summary of the snapshot's models.
    Info {
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct BodySummary {
    body_type: String,
    nodes: usize,
    edges: usize,
    loops: usize,
    faces: usize,
    shells: usize,
}

#[derive(Serialize)]
struct ModelSummary {
    index: usize,
    bodies: Vec<BodySummary>,
    tessellations: usize,
    ebodies: usize,
}

fn load(path: &Path) -> Result<BrepArena> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    BrepArena::from_json(&json).with_context(|| format!("invalid snapshot {}", path.display()))
}

fn select_model(arena: &BrepArena, index: usize) -> Result<ModelKey> {
    let models = arena.model_keys();
    if index == 0 || index > models.len() {
        bail!("model {index} requested, snapshot has {}", models.len());
    }
    Ok(models[index - 1])
}

fn summarize(arena: &BrepArena) -> Result<Vec<ModelSummary>> {
    let mut out = Vec::new();
    for (i, key) in arena.model_keys().into_iter().enumerate() {
        let model = arena.model(key)?;
        let mut bodies = Vec::new();
        for &bk in &model.bodies {
            let topo = arena.body_topology(bk)?;
            bodies.push(BodySummary {
                body_type: arena.body(bk)?.mtype.to_string(),
                nodes: topo.nodes.len(),
                edges: topo.edges.len(),
                loops: topo.loops.len(),
                faces: topo.faces.len(),
                shells: topo.shells.len(),
            });
        }
        let tessellations = model
            .extras
            .iter()
            .filter(|e| matches!(e, ModelExtra::Tessellation(_)))
            .count();
        out.push(ModelSummary {
            index: i + 1,
            bodies,
            tessellations,
            ebodies: model.extras.len() - tessellations,
        });
    }
    Ok(out)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "warn,egads_lite_export=info,egads_lite=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Export {
            input,
            output,
            model,
        } => {
            let arena = load(&input)?;
            let key = select_model(&arena, model)?;
            let config = ExportConfig::from_env();
            tracing::info!(
                input = %input.display(),
                model,
                initial_capacity = config.initial_capacity,
                "exporting"
            );

            let bytes = Exporter::with_config(&arena, config)
                .export(key)
                .with_context(|| format!("failed to export model {model}"))?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(output = %output.display(), bytes = bytes.len(), "done");
        }
        Command::Info { input } => {
            let arena = load(&input)?;
            let summary = summarize(&arena)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
