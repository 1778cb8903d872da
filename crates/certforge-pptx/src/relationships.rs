//! Relationship parsing for PPTX packages
//!
//! The presentation part lists its slides by relationship ID
//! (`<p:sldId r:id="rId2"/>`); `ppt/_rels/presentation.xml.rels` maps those
//! IDs to slide part paths. Resolving them gives the real slide order,
//! which file names alone do not guarantee.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{PptxError, Result};

/// Parsed relationships from a .rels file
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Relationship ID to (type, target)
    map: HashMap<String, RelationshipTarget>,
}

/// A relationship target with its type
#[derive(Debug, Clone)]
pub struct RelationshipTarget {
    /// The target path, relative to the owning part's folder
    pub target: String,
    /// The relationship type URI
    pub rel_type: String,
}

impl Relationships {
    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut map = HashMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            match attr.key.as_ref() {
                                b"Id" => {
                                    id = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"Target" => {
                                    target = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"Type" => {
                                    rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            map.insert(
                                id,
                                RelationshipTarget {
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { map })
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether there are no relationships
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve a target to a package path, given the owning part's folder
    /// (e.g. `"ppt"` for `ppt/presentation.xml`)
    pub fn resolve(base_dir: &str, target: &str) -> String {
        if let Some(absolute) = target.strip_prefix('/') {
            return absolute.to_string();
        }

        let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                s => parts.push(s),
            }
        }
        parts.join("/")
    }
}

/// Read the ordered slide relationship IDs from presentation.xml
pub fn slide_id_order(presentation_xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(presentation_xml);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"sldId" =>
            {
                let rel_id = e
                    .attributes()
                    .filter_map(|a| a.ok())
                    .find(|a| a.key.local_name().as_ref() == b"id" && a.key.prefix().is_some())
                    .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()));
                if let Some(rel_id) = rel_id {
                    ids.push(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}
