//! Freehand paint surface: a premultiplied raster the size of the canvas, composited
//! above every layer.

use crate::{
    assets::decode::decode_image,
    assets::encode::{ExportFormat, decode_mask_png, encode_mask_png, encode_premul_rgba8},
    foundation::core::{Point, Rgba8},
    foundation::error::{EditorError, EditorResult},
};

/// How erase strokes affect the composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraseMode {
    /// Erase removes previously painted strokes only.
    #[default]
    Strokes,
    /// Erase also punches through layers and background beneath the paint surface.
    Knockout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushMode {
    Paint,
    Erase,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    pub color: Rgba8,
    /// Stroke width in canvas pixels.
    pub size: f64,
    pub mode: BrushMode,
}

/// Inclusive-exclusive pixel bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaintSurface {
    width: u32,
    height: u32,
    erase_mode: EraseMode,
    /// Premultiplied RGBA8.
    pixels: Vec<u8>,
    /// Knockout coverage, one byte per pixel; all zero unless `EraseMode::Knockout`.
    knockout: Vec<u8>,
}

impl PaintSurface {
    pub fn new(width: u32, height: u32, erase_mode: EraseMode) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            erase_mode,
            pixels: vec![0; n * 4],
            knockout: vec![0; n],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn erase_mode(&self) -> EraseMode {
        self.erase_mode
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn knockout(&self) -> &[u8] {
        &self.knockout
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    pub fn has_knockout(&self) -> bool {
        self.knockout.iter().any(|&b| b != 0)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.knockout.fill(0);
    }

    /// Recreate the surface at a new size, keeping the overlapping top-left region.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        let mut next = Self::new(width, height, self.erase_mode);
        next.copy_overlap_from(&self.pixels, &self.knockout, self.width, self.height);
        *self = next;
    }

    fn copy_overlap_from(&mut self, pixels: &[u8], knockout: &[u8], src_w: u32, src_h: u32) {
        let w = self.width.min(src_w) as usize;
        let h = self.height.min(src_h) as usize;
        for y in 0..h {
            let src = y * src_w as usize;
            let dst = y * self.width as usize;
            self.pixels[dst * 4..(dst + w) * 4].copy_from_slice(&pixels[src * 4..(src + w) * 4]);
            self.knockout[dst..dst + w].copy_from_slice(&knockout[src..src + w]);
        }
    }

    /// Rasterize one round-capped stroke segment from `a` to `b`.
    ///
    /// Returns `false` when the segment misses the surface entirely.
    pub fn stamp_segment(&mut self, a: Point, b: Point, brush: &Brush) -> bool {
        let radius = (brush.size / 2.0).max(0.5);
        let reach = radius + 1.0;
        let x0 = (a.x.min(b.x) - reach).floor().max(0.0);
        let y0 = (a.y.min(b.y) - reach).floor().max(0.0);
        let x1 = (a.x.max(b.x) + reach).ceil().min(f64::from(self.width));
        let y1 = (a.y.max(b.y) + reach).ceil().min(f64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        let color = brush.color.to_premul_array();
        let mut touched = false;
        for y in (y0 as u32)..(y1 as u32) {
            for x in (x0 as u32)..(x1 as u32) {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let coverage = (radius + 0.5 - distance_to_segment(p, a, b)).clamp(0.0, 1.0) as f32;
                if coverage <= 0.0 {
                    continue;
                }
                touched = true;
                let idx = (y as usize) * (self.width as usize) + (x as usize);
                match brush.mode {
                    BrushMode::Paint => self.paint_px(idx, color, coverage),
                    BrushMode::Erase => self.erase_px(idx, coverage),
                }
            }
        }
        touched
    }

    fn paint_px(&mut self, idx: usize, src: [u8; 4], coverage: f32) {
        let dst = &mut self.pixels[idx * 4..idx * 4 + 4];
        let inv = 1.0 - f32::from(src[3]) * coverage / 255.0;
        for c in 0..4 {
            let v = f32::from(src[c]) * coverage + f32::from(dst[c]) * inv;
            dst[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }

    fn erase_px(&mut self, idx: usize, coverage: f32) {
        for c in &mut self.pixels[idx * 4..idx * 4 + 4] {
            *c = crate::foundation::math::scale_u8(*c, 1.0 - coverage);
        }
        if self.erase_mode == EraseMode::Knockout {
            let k = &mut self.knockout[idx];
            let add = f32::from(255 - *k) * coverage;
            *k = (f32::from(*k) + add).round().min(255.0) as u8;
        }
    }

    /// Tight bounds of pixels with non-zero alpha.
    pub fn inked_bounds(&self) -> Option<PixelBounds> {
        let mut out: Option<PixelBounds> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4 + 3;
                if self.pixels[i] == 0 {
                    continue;
                }
                let b = out.get_or_insert(PixelBounds {
                    x0: x,
                    y0: y,
                    x1: x + 1,
                    y1: y + 1,
                });
                b.x0 = b.x0.min(x);
                b.y0 = b.y0.min(y);
                b.x1 = b.x1.max(x + 1);
                b.y1 = b.y1.max(y + 1);
            }
        }
        out
    }

    /// Encode the region `bounds` as PNG.
    pub fn encode_region_png(&self, bounds: PixelBounds) -> EditorResult<Vec<u8>> {
        if bounds.x1 > self.width || bounds.y1 > self.height || bounds.x0 >= bounds.x1 {
            return Err(EditorError::validation("paint region out of bounds"));
        }
        let mut region = Vec::with_capacity((bounds.width() * bounds.height() * 4) as usize);
        for y in bounds.y0..bounds.y1 {
            let row = (y as usize) * (self.width as usize);
            let start = (row + bounds.x0 as usize) * 4;
            let end = (row + bounds.x1 as usize) * 4;
            region.extend_from_slice(&self.pixels[start..end]);
        }
        encode_premul_rgba8(&region, bounds.width(), bounds.height(), ExportFormat::Png)
    }

    pub fn encode_png(&self) -> EditorResult<Vec<u8>> {
        encode_premul_rgba8(&self.pixels, self.width, self.height, ExportFormat::Png)
    }

    pub fn encode_knockout_png(&self) -> EditorResult<Vec<u8>> {
        encode_mask_png(&self.knockout, self.width, self.height)
    }

    /// Replace the surface pixels from PNG bytes produced by [`Self::encode_png`].
    ///
    /// A PNG of a different size is copied into the overlapping region.
    pub fn load_png(&mut self, png: &[u8], knockout_png: Option<&[u8]>) -> EditorResult<()> {
        let img = decode_image(png)?;
        let (kw, kh, mask) = match knockout_png {
            Some(bytes) => decode_mask_png(bytes)?,
            None => (
                img.width,
                img.height,
                vec![0; (img.width as usize) * (img.height as usize)],
            ),
        };
        if (kw, kh) != (img.width, img.height) {
            return Err(EditorError::decode("paint and knockout sizes differ"));
        }
        self.clear();
        self.copy_overlap_from(&img.rgba8_premul, &mask, img.width, img.height);
        Ok(())
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/paint.rs"]
mod tests;
