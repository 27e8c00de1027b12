use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(1000, 700).unwrap();
    assert_eq!(c.center(), Point::new(500.0, 350.0));
}

#[test]
fn canvas_rejects_sizes_the_rasterizer_cannot_hold() {
    assert!(Canvas::new(70_000, 10).is_err());
    assert!(Canvas::new(10, 70_000).is_err());
    assert!(Canvas::new(Canvas::MAX_SIDE, 1).is_ok());
    assert!(Canvas::new(10_000, 10_000).is_err());
    assert!(Canvas::new(8192, 8192).is_ok());
}

#[test]
fn hex_parse_accepts_short_long_and_alpha_forms() {
    assert_eq!(Rgba8::parse_hex("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(
        Rgba8::parse_hex("#111827").unwrap(),
        Rgba8::rgb(0x11, 0x18, 0x27)
    );
    assert_eq!(
        Rgba8::parse_hex("2563EB80").unwrap(),
        Rgba8::rgba(0x25, 0x63, 0xeb, 0x80)
    );
    assert!(Rgba8::parse_hex("#12345").is_err());
    assert!(Rgba8::parse_hex("#gg0000").is_err());
}

#[test]
fn hex_serde_uses_short_form_for_opaque_colors() {
    let json = serde_json::to_string(&Rgba8::rgb(255, 0, 0)).unwrap();
    assert_eq!(json, "\"#ff0000\"");
    let back: Rgba8 = serde_json::from_str("\"#00ff0080\"").unwrap();
    assert_eq!(back, Rgba8::rgba(0, 255, 0, 128));
    assert_eq!(
        serde_json::to_string(&back).unwrap(),
        "\"#00ff0080\""
    );
}

#[test]
fn premul_array_scales_channels_by_alpha() {
    assert_eq!(Rgba8::rgba(255, 0, 0, 128).to_premul_array(), [128, 0, 0, 128]);
    assert_eq!(Rgba8::TRANSPARENT.to_premul_array(), [0, 0, 0, 0]);
}
