//! Caption manifests
//!
//! A CSV file listing photos in report order with their captions:
//!
//! ```text
//! file,caption
//! fachada.jpg,Fachada principal
//! fundos/muro.png,"Muro dos fundos, lado leste"
//! ```
//!
//! Relative paths resolve against the manifest's directory.

use crate::types::{ReportError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub file: PathBuf,
    pub caption: String,
}

/// Load a caption manifest
pub async fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ManifestEntry>> {
    let path = path.as_ref().to_owned();
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let contents = tokio::fs::read_to_string(&path).await?;

    let entries =
        tokio::task::spawn_blocking(move || parse_manifest(&contents, &base_dir)).await??;

    Ok(entries)
}

/// Parse manifest CSV text; rows with an empty file column are skipped
pub fn parse_manifest(contents: &str, base_dir: &Path) -> Result<Vec<ManifestEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result?;
        let file = match record.get(0) {
            Some(file) if !file.is_empty() => file,
            _ => continue,
        };
        let file = PathBuf::from(file);
        entries.push(ManifestEntry {
            file: if file.is_absolute() {
                file
            } else {
                base_dir.join(file)
            },
            caption: record.get(1).unwrap_or_default().to_string(),
        });
    }

    if entries.is_empty() {
        return Err(ReportError::Config(
            "Manifest lists no photos".to_string(),
        ));
    }
    Ok(entries)
}
