use super::*;

#[test]
fn png_export_unpremultiplies() {
    let premul = vec![128u8, 0, 0, 128, 0, 0, 0, 0];
    let bytes = encode_premul_rgba8(&premul, 2, 1, ExportFormat::Png).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 128]);
    assert_eq!(img.get_pixel(1, 0).0[3], 0);
}

#[test]
fn jpeg_export_composites_over_black() {
    let mut premul = Vec::new();
    for _ in 0..64 {
        premul.extend_from_slice(&[0, 0, 0, 0]);
    }
    let bytes =
        encode_premul_rgba8(&premul, 8, 8, ExportFormat::Jpeg { quality: 92 }).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    let px = img.get_pixel(4, 4).0;
    assert!(px.iter().all(|&c| c < 8), "{px:?}");
}

#[test]
fn export_rejects_bad_inputs() {
    assert!(encode_premul_rgba8(&[0, 0, 0], 1, 1, ExportFormat::Png).is_err());
    assert!(matches!(
        encode_premul_rgba8(&[0; 4], 1, 1, ExportFormat::Jpeg { quality: 0 }),
        Err(EditorError::Validation(_))
    ));
}

#[test]
fn mask_png_round_trips() {
    let mask = vec![0u8, 64, 128, 255];
    let bytes = encode_mask_png(&mask, 2, 2).unwrap();
    let (w, h, back) = decode_mask_png(&bytes).unwrap();
    assert_eq!((w, h), (2, 2));
    assert_eq!(back, mask);
}

#[test]
fn file_names_follow_format() {
    assert_eq!(ExportFormat::Png.file_name(), "sticker.png");
    assert_eq!(ExportFormat::Jpeg { quality: 92 }.file_name(), "sticker.jpg");
}
