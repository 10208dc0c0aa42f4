//! Report file output

use crate::document::Document;
use crate::types::*;
use std::path::{Path, PathBuf};

/// Write rendered report bytes to `path`
pub async fn save_pdf(bytes: Vec<u8>, path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Write a rendered report into `dir` under the document's file name.
///
/// Returns the full path written.
pub async fn write_report(
    document: &Document,
    bytes: Vec<u8>,
    dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&document.file_name);
    save_pdf(bytes, &path).await?;
    log::info!("wrote {} ({} pages)", path.display(), document.page_count());
    Ok(path)
}
