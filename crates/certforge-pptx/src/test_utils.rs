//! Shared test utilities for certforge-pptx
//!
//! In-memory PPTX fixtures: a package with `[Content_Types].xml`, the root
//! relationships, `ppt/presentation.xml` with its slide list, the
//! presentation relationships, and one part per slide.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{NS_DRAWINGML, NS_PRESENTATIONML, NS_RELATIONSHIPS};

/// Slide XML with one text box per entry, each a single run
pub fn slide_xml(texts: &[&str]) -> String {
    let shapes: String = texts
        .iter()
        .enumerate()
        .map(|(i, text)| text_box(i as u32 + 2, text))
        .collect();
    slide_with_shapes(&shapes)
}

/// Slide XML wrapping raw `p:spTree` children
pub fn slide_with_shapes(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sld>"#,
        a = NS_DRAWINGML,
        r = NS_RELATIONSHIPS,
        p = NS_PRESENTATIONML,
        shapes = shapes,
    )
}

/// A text box shape holding one paragraph with one run
pub fn text_box(id: u32, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="es-AR" sz="1800" dirty="0"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id = id,
        text = escape(text),
    )
}

/// Package with one slide per entry, each slide holding the given texts
pub fn build_pptx(slides: &[&[&str]]) -> Vec<u8> {
    let xml: Vec<String> = slides.iter().map(|texts| slide_xml(texts)).collect();
    build_pptx_with_slides(&xml)
}

/// Package from complete slide part XML
pub fn build_pptx_with_slides(slides: &[String]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let overrides: String = (1..=slides.len())
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                n
            )
        })
        .collect();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>{}</Types>"#,
            overrides
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#,
    )
    .unwrap();

    let slide_ids: String = (1..=slides.len())
        .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 1))
        .collect();
    zip.start_file("ppt/presentation.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="10692000" cy="7560000"/><p:notesSz cx="7560000" cy="10692000"/></p:presentation>"#,
            NS_DRAWINGML, NS_RELATIONSHIPS, NS_PRESENTATIONML, slide_ids
        )
        .as_bytes(),
    )
    .unwrap();

    let slide_rels: String = (1..=slides.len())
        .map(|n| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                n + 1,
                n
            )
        })
        .collect();
    zip.start_file("ppt/_rels/presentation.xml.rels", options)
        .unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            slide_rels
        )
        .as_bytes(),
    )
    .unwrap();

    for (i, xml) in slides.iter().enumerate() {
        zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

/// Read one part of a package as a string
pub fn read_part(pptx: &[u8], path: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(pptx)).unwrap();
    let mut file = archive.by_name(path).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
