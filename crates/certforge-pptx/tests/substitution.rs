//! End-to-end template filling: open, substitute, save, reopen

use certforge_pptx::test_utils::{build_pptx, read_part};
use certforge_pptx::{
    scan_sentinels, substitute, ColorInput, Deck, FieldStyle, Substitution, IDENTIFIER_SENTINEL,
    NAME_SENTINEL,
};
use tempfile::TempDir;

#[test]
fn test_fill_save_and_reopen_leaves_no_sentinel() {
    let template = build_pptx(&[&["Certificado", "Se otorga a Nombre y apellido"]]);
    let mut deck = Deck::from_bytes(&template).unwrap();

    let color = ColorInput::HexText("#228B22".to_string()).resolve();
    assert!(color.warning.is_none());
    let style = FieldStyle::default().with_color(color.color);

    substitute(
        &mut deck,
        &[Substitution::new(NAME_SENTINEL, "Garcia Ana", style)],
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Certificado_Garcia_Ana.pptx");
    deck.save(&path).unwrap();

    let reopened = Deck::open(&path).unwrap();
    let text = reopened.text();
    assert!(text.contains("Se otorga a Garcia Ana"));
    assert!(!text.contains(NAME_SENTINEL));
    assert_eq!(scan_sentinels(&reopened, &[NAME_SENTINEL]).total_hits(), 0);

    let xml = read_part(&std::fs::read(&path).unwrap(), "ppt/slides/slide1.xml");
    assert!(xml.contains("<a:srgbClr val=\"228B22\"/>"));
    assert!(xml.contains("typeface=\"DejaVu Sans\""));
}

#[test]
fn test_each_record_starts_from_template() {
    let template = build_pptx(&[&["Nombre y apellido", "Numero de DNI"]]);

    for (name, id) in [("Garcia Ana", "30111222"), ("Lopez Juan", "28999000")] {
        let mut deck = Deck::from_bytes(&template).unwrap();
        substitute(
            &mut deck,
            &[
                Substitution::new(NAME_SENTINEL, name, FieldStyle::default()),
                Substitution::new(
                    IDENTIFIER_SENTINEL,
                    id,
                    FieldStyle::default().with_size(18),
                ),
            ],
        )
        .unwrap();
        assert_eq!(deck.text(), format!("{}\n{}", name, id));
    }
}

#[test]
fn test_text_with_markup_characters() {
    let template = build_pptx(&[&["Nombre y apellido"]]);
    let mut deck = Deck::from_bytes(&template).unwrap();

    substitute(
        &mut deck,
        &[Substitution::new(NAME_SENTINEL, "O'Brien & <Hijos>", FieldStyle::default())],
    )
    .unwrap();

    let reopened = Deck::from_bytes(&deck.into_bytes().unwrap()).unwrap();
    assert_eq!(reopened.text(), "O'Brien & <Hijos>");
}
