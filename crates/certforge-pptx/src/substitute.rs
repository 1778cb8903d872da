//! Placeholder substitution over slide text.
//!
//! Every text-bearing shape (`p:sp` with a `p:txBody`, group members
//! included) is scanned paragraph by paragraph. A run whose text contains a
//! sentinel gets the replacement text and the field's style; every
//! paragraph of those shapes is centered whether or not it matched.
//!
//! Sentinels are matched per run. A placeholder split across several runs
//! in the template is not found.

use crate::color::ColorSpec;
use crate::deck::Deck;
use crate::error::{PptxError, Result};
use crate::style::FieldStyle;
use crate::xml::{XmlElement, XmlNode};

/// Run-property children that carry a fill
const FILL_ELEMENTS: [&str; 6] = [
    "noFill",
    "solidFill",
    "gradFill",
    "blipFill",
    "pattFill",
    "grpFill",
];

/// Run-property children that follow `a:latin` in schema order
const AFTER_LATIN: [&str; 7] = [
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// One sentinel to replace, with the text and style that replace it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub sentinel: String,
    pub replacement: String,
    pub style: FieldStyle,
}

impl Substitution {
    pub fn new(
        sentinel: impl Into<String>,
        replacement: impl Into<String>,
        style: FieldStyle,
    ) -> Self {
        Self {
            sentinel: sentinel.into(),
            replacement: replacement.into(),
            style,
        }
    }
}

/// Runs matched for one sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelHits {
    pub sentinel: String,
    pub runs: usize,
}

/// What a substitution pass (or a dry scan) found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Hits per sentinel, in the order the sentinels were given
    pub hits: Vec<SentinelHits>,
    /// Paragraphs whose alignment was set to center
    pub paragraphs_centered: usize,
}

impl SubstitutionReport {
    fn for_sentinels<'a>(sentinels: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            hits: sentinels
                .into_iter()
                .map(|sentinel| SentinelHits {
                    sentinel: sentinel.to_string(),
                    runs: 0,
                })
                .collect(),
            paragraphs_centered: 0,
        }
    }

    /// Runs matched across all sentinels
    pub fn total_hits(&self) -> usize {
        self.hits.iter().map(|h| h.runs).sum()
    }

    /// Runs matched for one sentinel, zero if it was not searched for
    pub fn hits_for(&self, sentinel: &str) -> usize {
        self.hits
            .iter()
            .find(|h| h.sentinel == sentinel)
            .map(|h| h.runs)
            .unwrap_or(0)
    }
}

/// Replace sentinels across the deck.
///
/// The deck is edited in place. When no run matched any sentinel the
/// result is [`PptxError::SentinelNotFound`]; paragraphs are centered even
/// then, and the deck stays usable.
pub fn substitute(deck: &mut Deck, substitutions: &[Substitution]) -> Result<SubstitutionReport> {
    let mut report =
        SubstitutionReport::for_sentinels(substitutions.iter().map(|s| s.sentinel.as_str()));

    for slide in deck.slides_mut() {
        for_each_paragraph_mut(&mut slide.xml.root, &mut |paragraph| {
            substitute_paragraph(paragraph, substitutions, &mut report.hits);
            center_paragraph(paragraph);
            report.paragraphs_centered += 1;
        });
    }

    if report.total_hits() == 0 {
        return Err(PptxError::sentinel_not_found(
            substitutions.iter().map(|s| s.sentinel.as_str()),
        ));
    }

    Ok(report)
}

/// Count runs containing each sentinel without editing anything
pub fn scan_sentinels(deck: &Deck, sentinels: &[&str]) -> SubstitutionReport {
    let mut report = SubstitutionReport::for_sentinels(sentinels.iter().copied());

    for slide in deck.slides() {
        for_each_paragraph(&slide.xml.root, &mut |paragraph| {
            for run in paragraph.elements().filter(|e| e.local_name() == "r") {
                let text = run_text(run);
                for hit in report.hits.iter_mut() {
                    if !hit.sentinel.is_empty() && text.contains(&hit.sentinel) {
                        hit.runs += 1;
                    }
                }
            }
        });
    }

    report
}

/// Visit every paragraph of every text-bearing shape under `element`
pub(crate) fn for_each_paragraph<F: FnMut(&XmlElement)>(element: &XmlElement, f: &mut F) {
    if element.local_name() == "sp" {
        if let Some(body) = element.child("txBody") {
            for paragraph in body.elements().filter(|e| e.local_name() == "p") {
                f(paragraph);
            }
        }
        return;
    }

    for child in element.elements() {
        for_each_paragraph(child, f);
    }
}

fn for_each_paragraph_mut<F: FnMut(&mut XmlElement)>(element: &mut XmlElement, f: &mut F) {
    if element.local_name() == "sp" {
        if let Some(body) = element.child_mut("txBody") {
            for paragraph in body.elements_mut().filter(|e| e.local_name() == "p") {
                f(paragraph);
            }
        }
        return;
    }

    for child in element.elements_mut() {
        for_each_paragraph_mut(child, f);
    }
}

fn substitute_paragraph(
    paragraph: &mut XmlElement,
    substitutions: &[Substitution],
    hits: &mut [SentinelHits],
) {
    for run in paragraph.elements_mut().filter(|e| e.local_name() == "r") {
        let original = run_text(run);
        let mut text = original.clone();
        let mut style = None;

        for (substitution, hit) in substitutions.iter().zip(hits.iter_mut()) {
            if substitution.sentinel.is_empty() || !original.contains(&substitution.sentinel) {
                continue;
            }
            text = text.replace(&substitution.sentinel, &substitution.replacement);
            style = Some(&substitution.style);
            hit.runs += 1;
        }

        if let Some(style) = style {
            set_run_text(run, text);
            apply_style(run, style);
        }
    }
}

fn run_text(run: &XmlElement) -> String {
    run.child("t").map(|t| t.text()).unwrap_or_default()
}

fn set_run_text(run: &mut XmlElement, text: String) {
    match run.child_mut("t") {
        Some(t) => t.set_text(text),
        None => {
            let mut t = XmlElement::new(run.qualify("t"));
            t.set_text(text);
            run.push(t);
        }
    }
}

fn apply_style(run: &mut XmlElement, style: &FieldStyle) {
    if run.child("rPr").is_none() {
        let properties = XmlElement::new(run.qualify("rPr"));
        run.insert(0, properties);
    }

    if let Some(properties) = run.child_mut("rPr") {
        style_run_properties(properties, style);
    }
}

fn style_run_properties(properties: &mut XmlElement, style: &FieldStyle) {
    properties.set_attr("sz", style.size_hundredths().to_string());
    properties.set_attr("b", flag(style.bold));
    properties.set_attr("i", flag(style.italic));

    properties.remove_elements(|local| FILL_ELEMENTS.contains(&local) || local == "latin");

    // Fill goes right after an outline, otherwise first
    let fill = solid_fill(properties, style.color);
    let fill_index = properties.position("ln").map(|i| i + 1).unwrap_or(0);
    properties.insert(fill_index, fill);

    let latin = XmlElement::new(properties.qualify("latin")).with_attr("typeface", &style.font_name);
    let latin_index = properties
        .children
        .iter()
        .position(|c| matches!(c, XmlNode::Element(e) if AFTER_LATIN.contains(&e.local_name())))
        .unwrap_or(properties.children.len());
    properties.insert(latin_index, latin);
}

fn solid_fill(properties: &XmlElement, color: ColorSpec) -> XmlElement {
    XmlElement::new(properties.qualify("solidFill")).with_child(
        XmlElement::new(properties.qualify("srgbClr")).with_attr("val", color.to_hex()),
    )
}

fn center_paragraph(paragraph: &mut XmlElement) {
    match paragraph.child_mut("pPr") {
        Some(properties) => properties.set_attr("algn", "ctr"),
        None => {
            let properties = XmlElement::new(paragraph.qualify("pPr")).with_attr("algn", "ctr");
            paragraph.insert(0, properties);
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_pptx, build_pptx_with_slides, slide_with_shapes, text_box};
    use crate::{IDENTIFIER_SENTINEL, NAME_SENTINEL};

    fn name_style() -> FieldStyle {
        FieldStyle::default().with_color(ColorSpec::new(0, 0, 180))
    }

    fn first_run(deck: &Deck) -> XmlElement {
        let mut found = None;
        for_each_paragraph(&deck.slides()[0].xml.root, &mut |p| {
            if found.is_none() {
                found = p.child("r").cloned();
            }
        });
        found.unwrap()
    }

    #[test]
    fn test_replaces_name_and_styles_run() {
        let bytes = build_pptx(&[&["Certificamos que Nombre y apellido asistió"]]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        let report = substitute(
            &mut deck,
            &[Substitution::new(NAME_SENTINEL, "Garcia Ana", name_style())],
        )
        .unwrap();

        assert_eq!(report.hits_for(NAME_SENTINEL), 1);
        assert_eq!(deck.text(), "Certificamos que Garcia Ana asistió");

        let run = first_run(&deck);
        let properties = run.child("rPr").unwrap();
        assert_eq!(properties.attr("lang"), Some("es-AR"));
        assert_eq!(properties.attr("sz"), Some("2500"));
        assert_eq!(properties.attr("b"), Some("1"));
        assert_eq!(properties.attr("i"), Some("1"));
        assert_eq!(
            properties.child("latin").unwrap().attr("typeface"),
            Some("DejaVu Sans")
        );
        assert_eq!(
            properties
                .child("solidFill")
                .and_then(|f| f.child("srgbClr"))
                .and_then(|c| c.attr("val")),
            Some("0000B4")
        );
    }

    #[test]
    fn test_every_paragraph_centered() {
        let bytes = build_pptx(&[&["Nombre y apellido", "Otro texto"]]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        let report = substitute(
            &mut deck,
            &[Substitution::new(NAME_SENTINEL, "Ana", FieldStyle::default())],
        )
        .unwrap();
        assert_eq!(report.paragraphs_centered, 2);

        let mut alignments = Vec::new();
        for_each_paragraph(&deck.slides()[0].xml.root, &mut |p| {
            assert_eq!(p.elements().next().unwrap().local_name(), "pPr");
            alignments.push(p.child("pPr").and_then(|pr| pr.attr("algn")).map(String::from));
        });
        assert_eq!(alignments, vec![Some("ctr".to_string()), Some("ctr".to_string())]);
    }

    #[test]
    fn test_miss_reports_error_but_centers() {
        let bytes = build_pptx(&[&["Sin marcador"]]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        let err = substitute(
            &mut deck,
            &[Substitution::new(NAME_SENTINEL, "Ana", FieldStyle::default())],
        )
        .unwrap_err();
        assert!(err.is_sentinel_miss());
        assert_eq!(deck.text(), "Sin marcador");

        let saved = deck.into_bytes().unwrap();
        let xml = crate::test_utils::read_part(&saved, "ppt/slides/slide1.xml");
        assert!(xml.contains("algn=\"ctr\""));
    }

    #[test]
    fn test_name_and_identifier_in_one_pass() {
        let bytes = build_pptx(&[&["Nombre y apellido", "DNI: Numero de DNI"]]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        let id_style = FieldStyle::default().with_size(18);
        let report = substitute(
            &mut deck,
            &[
                Substitution::new(NAME_SENTINEL, "Lopez Juan", FieldStyle::default()),
                Substitution::new(IDENTIFIER_SENTINEL, "30123456", id_style),
            ],
        )
        .unwrap();

        assert_eq!(report.total_hits(), 2);
        assert_eq!(deck.text(), "Lopez Juan\nDNI: 30123456");
    }

    #[test]
    fn test_group_shapes_are_searched() {
        let group = format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="9" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
            text_box(10, "Nombre y apellido")
        );
        let bytes = build_pptx_with_slides(&[slide_with_shapes(&group)]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        substitute(
            &mut deck,
            &[Substitution::new(NAME_SENTINEL, "Ana", FieldStyle::default())],
        )
        .unwrap();
        assert_eq!(deck.text(), "Ana");
    }

    #[test]
    fn test_replaces_every_occurrence_in_run() {
        let bytes = build_pptx(&[&["Nombre y apellido / Nombre y apellido"]]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        let report = substitute(
            &mut deck,
            &[Substitution::new(NAME_SENTINEL, "Ana", FieldStyle::default())],
        )
        .unwrap();
        assert_eq!(report.hits_for(NAME_SENTINEL), 1);
        assert_eq!(deck.text(), "Ana / Ana");
    }

    #[test]
    fn test_existing_fill_and_font_replaced_in_schema_order() {
        let shape = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="T"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:pPr algn="l"/><a:r><a:rPr lang="es-AR" b="0"><a:ln w="9525"/><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="Arial"/><a:cs typeface="Arial"/></a:rPr><a:t>Nombre y apellido</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let bytes = build_pptx_with_slides(&[slide_with_shapes(shape)]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        let style = FieldStyle::default().with_font("Liberation Serif");
        substitute(&mut deck, &[Substitution::new(NAME_SENTINEL, "Ana", style)]).unwrap();

        let run = first_run(&deck);
        let properties = run.child("rPr").unwrap();
        let order: Vec<&str> = properties.elements().map(|e| e.local_name()).collect();
        assert_eq!(order, vec!["ln", "solidFill", "latin", "cs"]);
        assert_eq!(properties.attr("b"), Some("1"));
        assert_eq!(
            properties.child("latin").unwrap().attr("typeface"),
            Some("Liberation Serif")
        );
        assert!(properties
            .child("solidFill")
            .unwrap()
            .child("schemeClr")
            .is_none());
    }

    #[test]
    fn test_run_without_properties_gets_them() {
        let shape = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="T"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Nombre y apellido</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let bytes = build_pptx_with_slides(&[slide_with_shapes(shape)]);
        let mut deck = Deck::from_bytes(&bytes).unwrap();

        substitute(
            &mut deck,
            &[Substitution::new(NAME_SENTINEL, "Ana", FieldStyle::default())],
        )
        .unwrap();

        let run = first_run(&deck);
        assert_eq!(run.elements().next().unwrap().name, "a:rPr");
    }

    #[test]
    fn test_scan_does_not_edit() {
        let bytes = build_pptx(&[&["Nombre y apellido"], &["Nombre y apellido"]]);
        let deck = Deck::from_bytes(&bytes).unwrap();

        let report = scan_sentinels(&deck, &[NAME_SENTINEL, IDENTIFIER_SENTINEL]);
        assert_eq!(report.hits_for(NAME_SENTINEL), 2);
        assert_eq!(report.hits_for(IDENTIFIER_SENTINEL), 0);
        assert_eq!(report.paragraphs_centered, 0);
        assert_eq!(deck.text(), "Nombre y apellido\nNombre y apellido");
    }
}
