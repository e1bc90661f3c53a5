mod renderer;

use std::path::Path;

use anyhow::{Context, Result};
use folio_core::FolioConfig;

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(arg) => load_config(Path::new(&arg))?,
        None => FolioConfig::default(),
    };

    renderer::render_tui(config)
}

/// `FolioConfig::from_json` already validates.
fn load_config(path: &Path) -> Result<FolioConfig> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(FolioConfig::from_json(&data)?)
}
