use super::*;

#[test]
fn empty_database_resolves_nothing() {
    let mut engine = TextEngine::new(false);
    assert_eq!(engine.face_count(), 0);
    assert!(engine.resolve("Poppins, Arial, sans-serif").is_none());
    let block = engine
        .layout("Hello", "sans-serif", 28.0, Rgba8::BLACK, 200.0)
        .unwrap();
    assert!(block.is_none());
}

#[test]
fn invalid_font_size_is_rejected() {
    let mut engine = TextEngine::new(false);
    assert!(matches!(
        engine.layout("x", "sans-serif", 0.0, Rgba8::BLACK, 100.0),
        Err(EditorError::Validation(_))
    ));
    assert!(
        engine
            .layout("x", "sans-serif", f32::NAN, Rgba8::BLACK, 100.0)
            .is_err()
    );
}

#[test]
fn system_font_layout_grows_with_size() {
    let mut engine = TextEngine::new(true);
    let Some(small) = engine
        .layout("Hello", "Arial, sans-serif", 28.0, Rgba8::BLACK, 400.0)
        .unwrap()
    else {
        eprintln!("no system fonts available; skipping");
        return;
    };
    let large = engine
        .layout("Hello", "Arial, sans-serif", 48.0, Rgba8::BLACK, 400.0)
        .unwrap()
        .unwrap();
    assert!(large.height() > small.height());
    assert!(small.layout.lines().count() >= 1);
}

#[test]
fn brush_converts_from_color() {
    let b = TextBrush::from(Rgba8::rgba(1, 2, 3, 4));
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 4));
}
