//! An opened template deck.
//!
//! The deck owns the unpacked package plus a parsed tree for every slide
//! part, in presentation order. Edits go through [`Deck::slides_mut`];
//! saving serializes the slide trees back into the package and writes it.

use std::path::Path;

use crate::archive::PptxArchive;
use crate::error::{PptxError, Result};
use crate::relationships::{slide_id_order, Relationships};
use crate::xml::XmlDocument;

/// Presentation part path
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Presentation relationships part path
pub const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// A slide part and its parsed tree
#[derive(Debug, Clone)]
pub struct SlidePart {
    /// Package path, e.g. `ppt/slides/slide1.xml`
    pub path: String,
    pub xml: XmlDocument,
}

impl SlidePart {
    /// Slide number taken from the part name (`slide3.xml` is 3)
    pub fn number(&self) -> Option<u32> {
        slide_number(&self.path)
    }
}

/// A template deck ready for editing
#[derive(Debug, Clone)]
pub struct Deck {
    archive: PptxArchive,
    slides: Vec<SlidePart>,
}

impl Deck {
    /// Open a deck from a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let archive = PptxArchive::open(path)?;
        Self::from_archive(archive)
    }

    /// Open a deck from in-memory bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let archive = PptxArchive::from_bytes(data).map_err(|e| match e {
            PptxError::ZipError(zip) => {
                PptxError::invalid_template(format!("not a PPTX package: {}", zip))
            }
            other => other,
        })?;
        Self::from_archive(archive)
    }

    /// Build a deck from an unpacked package
    pub fn from_archive(archive: PptxArchive) -> Result<Self> {
        let presentation = archive.get(PRESENTATION_PART).ok_or_else(|| {
            PptxError::invalid_template(format!("package has no {}", PRESENTATION_PART))
        })?;

        let paths = ordered_slide_paths(&archive, presentation)?;
        let mut slides = Vec::with_capacity(paths.len());
        for path in paths {
            let xml = XmlDocument::parse(archive.require(&path)?)?;
            slides.push(SlidePart { path, xml });
        }

        Ok(Self { archive, slides })
    }

    /// Slides in presentation order
    pub fn slides(&self) -> &[SlidePart] {
        &self.slides
    }

    /// Slides in presentation order, mutable
    pub fn slides_mut(&mut self) -> &mut [SlidePart] {
        &mut self.slides
    }

    /// Number of slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Underlying package
    pub fn archive(&self) -> &PptxArchive {
        &self.archive
    }

    /// Paragraph text of every shape, one paragraph per line
    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        for slide in &self.slides {
            crate::substitute::for_each_paragraph(&slide.xml.root, &mut |paragraph| {
                lines.push(paragraph.text());
            });
        }
        lines.join("\n")
    }

    /// Serialize the edited deck to bytes
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.into_archive()?.to_bytes()
    }

    /// Write the edited deck to a file
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        self.into_archive()?.write_to_file(path)
    }

    fn into_archive(self) -> Result<PptxArchive> {
        let mut archive = self.archive;
        for slide in self.slides {
            let bytes = slide.xml.to_bytes()?;
            archive.set(slide.path, bytes);
        }
        Ok(archive)
    }
}

/// Resolve slide part paths through the presentation's slide list, falling
/// back to numbered slide parts when the relationships are unusable.
fn ordered_slide_paths(archive: &PptxArchive, presentation: &[u8]) -> Result<Vec<String>> {
    let ids = slide_id_order(presentation)?;

    if let Some(rels_xml) = archive.get(PRESENTATION_RELS_PART) {
        let rels = Relationships::parse(rels_xml)?;
        let resolved: Vec<String> = ids
            .iter()
            .filter_map(|id| rels.get(id))
            .map(|rel| Relationships::resolve("ppt", &rel.target))
            .filter(|path| archive.contains(path))
            .collect();

        if !resolved.is_empty() {
            return Ok(resolved);
        }
    }

    let mut numbered: Vec<(u32, String)> = archive
        .file_list()
        .filter(|name| name.starts_with("ppt/slides/") && name.ends_with(".xml"))
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    numbered.sort();

    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn slide_number(path: &str) -> Option<u32> {
    let file = path.rsplit('/').next()?;
    file.strip_prefix("slide")?.strip_suffix(".xml")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_pptx, build_pptx_with_slides};

    #[test]
    fn test_open_orders_slides_by_presentation_list() {
        let bytes = build_pptx(&[&["first"], &["second"], &["third"]]);
        let deck = Deck::from_bytes(&bytes).unwrap();

        assert_eq!(deck.slide_count(), 3);
        let numbers: Vec<_> = deck.slides().iter().filter_map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(deck.text(), "first\nsecond\nthird");
    }

    #[test]
    fn test_fallback_to_numbered_slides() {
        let mut archive = PptxArchive::from_bytes(&build_pptx(&[&["a"], &["b"]])).unwrap();
        archive.set(PRESENTATION_RELS_PART, b"<Relationships/>".to_vec());

        let deck = Deck::from_archive(archive).unwrap();
        assert_eq!(deck.slide_count(), 2);
        assert_eq!(deck.slides()[0].path, "ppt/slides/slide1.xml");
    }

    #[test]
    fn test_save_roundtrip() {
        let bytes = build_pptx_with_slides(&[crate::test_utils::slide_xml(&["Hola"])]);
        let deck = Deck::from_bytes(&bytes).unwrap();
        let saved = deck.clone().into_bytes().unwrap();

        let reopened = Deck::from_bytes(&saved).unwrap();
        assert_eq!(reopened.text(), deck.text());
        assert_eq!(
            reopened.archive().file_list().collect::<Vec<_>>(),
            deck.archive().file_list().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_not_a_package() {
        let err = Deck::from_bytes(b"plain text").unwrap_err();
        assert!(matches!(err, PptxError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_missing_presentation_part() {
        let mut archive = PptxArchive::default();
        archive.set("ppt/slides/slide1.xml", b"<p:sld/>".to_vec());
        let err = Deck::from_archive(archive).unwrap_err();
        assert!(matches!(err, PptxError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_slide_number() {
        assert_eq!(slide_number("ppt/slides/slide12.xml"), Some(12));
        assert_eq!(slide_number("ppt/slides/_rels/slide1.xml.rels"), None);
    }
}
