//! `slotctl run` — apply a sequence of operations to a pool.
//!
//! Engine errors on individual operations are reported per step and do
//! not stop the run; malformed operations abort before anything runs.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use slotgrid_alloc::{Engine, PoolSnapshot, PoolStats};
use slotgrid_core::LayoutConfig;

use crate::commands::check::format_stats;
use crate::ops::{self, Op};

/// Where the starting pool comes from.
#[derive(Debug, Clone)]
pub enum Source {
    Layout(String),
    Snapshot(String),
}

/// Outcome of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub op: String,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub steps: Vec<StepOutcome>,
    pub occupants: Vec<(String, String)>,
    pub stats: PoolStats,
}

pub fn run(
    source: &Source,
    strategy: Option<&str>,
    raw_ops: &[String],
    save: Option<&str>,
    format: &str,
) -> anyhow::Result<()> {
    let ops = ops::parse_all(raw_ops)?;
    let engine = load_engine(source)?;
    if let Some(name) = strategy {
        engine.set_strategy_by_name(name)?;
    }

    let report = execute(&engine, &ops)?;

    if let Some(path) = save {
        let json = engine.snapshot()?.to_json()?;
        std::fs::write(path, json).with_context(|| format!("failed to write snapshot {path}"))?;
        info!(path, "snapshot saved");
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", format_report(&report)),
    }
    Ok(())
}

fn load_engine(source: &Source) -> anyhow::Result<Engine> {
    match source {
        Source::Layout(path) => {
            let config = LayoutConfig::from_file(Path::new(path))?;
            Ok(Engine::from_layout(&config)?)
        }
        Source::Snapshot(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read snapshot {path}"))?;
            Ok(Engine::restore(&PoolSnapshot::from_json(&json)?)?)
        }
    }
}

/// Apply `ops` in order and collect the outcome of each.
pub fn execute(engine: &Engine, ops: &[Op]) -> anyhow::Result<RunReport> {
    let steps = ops
        .iter()
        .map(|op| {
            let result = match op {
                Op::Park(req) => engine
                    .allocate(req)
                    .map(|unit| format!("{} parked in {unit}", req.owner_id)),
                Op::Leave(owner) => engine
                    .release(owner)
                    .map(|unit| format!("{owner} left {unit}")),
                Op::Free(unit) => engine
                    .release_unit(unit)
                    .map(|owner| format!("{owner} removed from {unit}")),
                Op::Strategy(name) => engine
                    .set_strategy_by_name(name)
                    .map(|s| format!("strategy set to {s}")),
                Op::Provision { container, unit } => engine
                    .provision(container, unit.clone())
                    .map(|()| format!("{} added to {container}", unit.id)),
            };
            match result {
                Ok(message) => StepOutcome {
                    op: op.to_string(),
                    ok: true,
                    message,
                },
                Err(e) => StepOutcome {
                    op: op.to_string(),
                    ok: false,
                    message: e.to_string(),
                },
            }
        })
        .collect();

    Ok(RunReport {
        steps,
        occupants: engine.active_occupants()?,
        stats: engine.stats()?,
    })
}

pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();
    for step in &report.steps {
        let mark = if step.ok { "✓" } else { "✗" };
        out.push_str(&format!("{mark} {:<28} {}\n", step.op, step.message));
    }
    out.push('\n');
    for (owner, unit) in &report.occupants {
        out.push_str(&format!("  {owner} → {unit}\n"));
    }
    out.push_str(&format_stats(&report.stats));
    out
}
