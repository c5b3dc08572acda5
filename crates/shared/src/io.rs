use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::ExportedDocument;

/// Where exports land when no directory is given
pub fn get_default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes an exported document into `dir`, creating it if needed
pub fn save_document(document: &ExportedDocument, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let filepath = dir.join(&document.file_name);
    fs::write(&filepath, &document.bytes)
        .with_context(|| format!("Failed to write {}", filepath.display()))?;

    Ok(filepath)
}
