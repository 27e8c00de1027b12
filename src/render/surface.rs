use crate::{
    assets::encode::{ExportFormat, encode_premul_rgba8},
    foundation::error::{EditorError, EditorResult},
};

/// A rendered raster in premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Fully transparent frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub(crate) fn from_data(width: u32, height: u32, data: Vec<u8>) -> EditorResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(EditorError::encode("frame byte length mismatch"));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiplied pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Pixel with alpha divided out.
    pub fn straight_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let mut px = self.pixel(x, y);
        crate::assets::decode::unpremultiply_rgba8_in_place(&mut px);
        px
    }

    pub fn encode(&self, format: ExportFormat) -> EditorResult<Vec<u8>> {
        encode_premul_rgba8(&self.data, self.width, self.height, format)
    }
}
