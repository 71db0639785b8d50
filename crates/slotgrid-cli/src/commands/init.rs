use std::path::Path;

use anyhow::bail;
use slotgrid_core::LayoutConfig;

pub fn init(path: &str, force: bool) -> anyhow::Result<()> {
    let output = Path::new(path);
    write_scaffold(output, force)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

fn write_scaffold(output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    let config = LayoutConfig::scaffold();
    std::fs::write(output, config.to_toml_string()?)?;
    Ok(())
}
