use std::io::Cursor;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::error::{EditorError, EditorResult};

/// Encoded raster format for exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ExportFormat {
    Png,
    /// Quality in `1..=100`.
    Jpeg { quality: u8 },
}

impl ExportFormat {
    /// Fixed download name for this format.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Png => "sticker.png",
            ExportFormat::Jpeg { .. } => "sticker.jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

fn check_len(data: &[u8], width: u32, height: u32, channels: usize) -> EditorResult<()> {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(channels);
    if data.len() != expected {
        return Err(EditorError::encode(format!(
            "buffer length {} does not match {width}x{height}x{channels}",
            data.len()
        )));
    }
    Ok(())
}

/// Encode a premultiplied RGBA8 buffer.
///
/// JPEG has no alpha; the premultiplied color channels are used directly, which equals
/// compositing over black.
pub fn encode_premul_rgba8(
    data: &[u8],
    width: u32,
    height: u32,
    format: ExportFormat,
) -> EditorResult<Vec<u8>> {
    check_len(data, width, height, 4)?;
    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => {
            let mut straight = data.to_vec();
            unpremultiply_rgba8_in_place(&mut straight);
            let img = image::RgbaImage::from_raw(width, height, straight)
                .ok_or_else(|| EditorError::encode("rgba buffer size mismatch"))?;
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| EditorError::encode(format!("encode png: {e}")))?;
        }
        ExportFormat::Jpeg { quality } => {
            if !(1..=100).contains(&quality) {
                return Err(EditorError::validation("jpeg quality must be in 1..=100"));
            }
            let rgb: Vec<u8> = data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            encoder
                .encode(&rgb, width, height, image::ExtendedColorType::Rgb8)
                .map_err(|e| EditorError::encode(format!("encode jpeg: {e}")))?;
        }
    }
    Ok(buf)
}

/// Encode an 8-bit coverage mask as a grayscale PNG.
pub(crate) fn encode_mask_png(mask: &[u8], width: u32, height: u32) -> EditorResult<Vec<u8>> {
    check_len(mask, width, height, 1)?;
    let img = image::GrayImage::from_raw(width, height, mask.to_vec())
        .ok_or_else(|| EditorError::encode("mask buffer size mismatch"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| EditorError::encode(format!("encode mask png: {e}")))?;
    Ok(buf)
}

pub(crate) fn decode_mask_png(bytes: &[u8]) -> EditorResult<(u32, u32, Vec<u8>)> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| EditorError::decode(format!("decode mask png: {e}")))?
        .to_luma8();
    let (w, h) = img.dimensions();
    Ok((w, h, img.into_raw()))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
