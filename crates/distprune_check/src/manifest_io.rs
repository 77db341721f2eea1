use anyhow::{Context, Result};
use distprune_core::Manifest;
use log::debug;
use std::{fs, path::Path};

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    debug!("Reading manifest: {}", path.display());
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Manifest::parse_str(&content).with_context(|| format!("Failed to load {}", path.display()))
}

/// Writes the manifest as two-space indented JSON with a trailing newline.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    debug!("Writing manifest: {}", path.display());
    let mut payload = serde_json::to_string_pretty(&manifest.to_value())?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("Failed to write {}", path.display()))
}
