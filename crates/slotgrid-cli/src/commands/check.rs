use std::path::Path;

use slotgrid_alloc::{Engine, PoolStats};
use slotgrid_core::LayoutConfig;

pub fn check(layout: &str, format: &str) -> anyhow::Result<()> {
    let config = LayoutConfig::from_file(Path::new(layout))?;
    let engine = Engine::from_layout(&config)?;
    let stats = engine.stats()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        _ => {
            println!("✓ {layout} is valid");
            print!("{}", format_stats(&stats));
        }
    }

    Ok(())
}

/// Human-readable pool summary.
pub fn format_stats(stats: &PoolStats) -> String {
    let mut out = format!(
        "  Strategy: {}\n  Units:    {} total, {} free, {} occupied\n",
        stats.strategy, stats.total, stats.free, stats.occupied
    );
    for (class, counts) in &stats.by_class {
        out.push_str(&format!("  {class:<10} {}/{} free\n", counts.free, counts.total));
    }
    for container in &stats.containers {
        out.push_str(&format!(
            "  [{}] {}/{} free\n",
            container.id, container.free, container.total
        ));
    }
    out
}
