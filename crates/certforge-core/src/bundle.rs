//! Packaging of converted PDFs into one archive.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// PDFs directly inside `dir`, sorted by file name
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }

    pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pdfs)
}

/// Zip every PDF in `dir` into `destination`, returning the entry names
pub fn bundle_pdfs(dir: &Path, destination: &Path) -> Result<Vec<String>> {
    let pdfs = list_pdfs(dir)?;

    let file = File::create(destination)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut names = Vec::with_capacity(pdfs.len());
    for pdf in pdfs {
        let name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(entry = %name, "adding to archive");

        zip.start_file(name.as_str(), options)?;
        zip.write_all(&fs::read(&pdf)?)?;
        names.push(name);
    }

    zip.finish()?;
    Ok(names)
}
