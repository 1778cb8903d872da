//! Archive handling for PPTX files
//!
//! PPTX files are ZIP archives containing XML parts and media. Parts are
//! kept in their original order so a saved deck lists entries the way the
//! template did.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{PptxError, Result};

/// An unpacked PPTX package
#[derive(Debug, Clone, Default)]
pub struct PptxArchive {
    /// Part paths in archive order
    order: Vec<String>,
    /// Part contents keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl PptxArchive {
    /// Open and unpack a PPTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PptxError::template_not_found(path.display().to_string()),
            _ => PptxError::IoError(e),
        })?;
        Self::from_reader(file)
    }

    /// Unpack from in-memory bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut order = Vec::with_capacity(archive.len());
        let mut files = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            order.push(name.clone());
            files.insert(name, contents);
        }

        Ok(Self { order, files })
    }

    /// Get a part's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a part, failing when it is absent
    pub fn require(&self, path: &str) -> Result<&[u8]> {
        self.get(path).ok_or_else(|| PptxError::missing_part(path))
    }

    /// Check if a part exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all parts in archive order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Set or update a part's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        let path = path.into();
        if !self.files.contains_key(&path) {
            self.order.push(path.clone());
        }
        self.files.insert(path, contents);
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Serialize the archive to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        for path in &self.order {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&self.files[path])?;
        }

        zip.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_operations() {
        let mut archive = PptxArchive::default();

        archive.set("ppt/slides/slide1.xml", b"<p:sld/>".to_vec());
        assert!(archive.contains("ppt/slides/slide1.xml"));
        assert_eq!(archive.get("ppt/slides/slide1.xml"), Some(&b"<p:sld/>"[..]));

        // Updating keeps a single entry
        archive.set("ppt/slides/slide1.xml", b"<p:sld></p:sld>".to_vec());
        assert_eq!(archive.file_list().count(), 1);
    }

    #[test]
    fn test_require_missing_part() {
        let archive = PptxArchive::default();
        let err = archive.require("ppt/presentation.xml").unwrap_err();
        assert!(matches!(err, PptxError::MissingPart { .. }));
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let mut archive = PptxArchive::default();
        archive.set("[Content_Types].xml", b"<Types/>".to_vec());
        archive.set("ppt/presentation.xml", b"<p:presentation/>".to_vec());
        archive.set("_rels/.rels", b"<Relationships/>".to_vec());

        let bytes = archive.to_bytes().unwrap();
        let restored = PptxArchive::from_bytes(&bytes).unwrap();

        assert_eq!(
            restored.file_list().collect::<Vec<_>>(),
            vec!["[Content_Types].xml", "ppt/presentation.xml", "_rels/.rels"]
        );
        assert_eq!(restored.get("_rels/.rels"), Some(&b"<Relationships/>"[..]));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            PptxArchive::from_bytes(b"not a zip"),
            Err(PptxError::ZipError(_))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            PptxArchive::open("/nonexistent/certificado.pptx"),
            Err(PptxError::TemplateNotFound { .. })
        ));
    }
}
