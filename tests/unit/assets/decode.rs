use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let decoded = decode_image(&png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage_with_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, EditorError::Decode(_)));
}

#[test]
fn content_key_tracks_encoded_bytes() {
    let a = decode_image(&png_1x1([1, 2, 3, 255])).unwrap();
    let b = decode_image(&png_1x1([1, 2, 3, 255])).unwrap();
    let c = decode_image(&png_1x1([3, 2, 1, 255])).unwrap();
    assert_eq!(a.content_key, b.content_key);
    assert_ne!(a.content_key, c.content_key);
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_clear() {
    let mut px = vec![10u8, 20, 30, 255, 9, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);

    let mut half = vec![64u8, 0, 0, 128];
    unpremultiply_rgba8_in_place(&mut half);
    assert_eq!(half[..], [128, 0, 0, 128]);
}

#[test]
fn aspect_is_width_over_height() {
    let img = image::RgbaImage::from_pixel(40, 16, image::Rgba([0, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    assert_eq!(decode_image(&buf).unwrap().aspect(), 2.5);
}
