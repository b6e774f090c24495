use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::storage::GeneratedFiles;
use crate::{AppError, Result};

pub const ARCHIVE_NAME: &str = "arquivos.zip";

/// Zips the selected files, each under its own name.
///
/// An empty selection produces no archive (`None`). Names selected twice are
/// packed once; a name that is not among `files` is an error.
pub fn pack(files: &GeneratedFiles, selected: &[String]) -> Result<Option<Vec<u8>>> {
    if selected.is_empty() {
        return Ok(None);
    }
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut packed = HashSet::new();
    for name in selected {
        if !packed.insert(name.as_str()) {
            continue;
        }
        let content = files
            .get(name)
            .ok_or_else(|| AppError::FileNotFound(name.clone()))?;
        writer.start_file(name.as_str(), options)?;
        writer.write_all(content)?;
    }
    let buffer = writer.finish()?.into_inner();
    debug!("Zip com {} arquivos, {} bytes", packed.len(), buffer.len());
    Ok(Some(buffer))
}
