//! Editor configuration: JSON file, then environment overrides, then validation.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::core::{Canvas, Rgba8},
    foundation::error::{EditorError, EditorResult},
    geometry::handles::HandleMetrics,
    scene::paint::EraseMode,
};

pub const ENV_HISTORY_CAPACITY: &str = "STICKERKIT_HISTORY_CAPACITY";
pub const ENV_DEVICE_PIXEL_RATIO: &str = "STICKERKIT_DEVICE_PIXEL_RATIO";

/// Overlay handle geometry in CSS pixels; multiplied by the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    pub corner_hit: f64,
    pub corner_size: f64,
    pub rotate_offset: f64,
    pub rotate_radius: f64,
    pub rotate_hit: f64,
    pub dash: f64,
    pub outline_width: f64,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            corner_hit: 8.0,
            corner_size: 12.0,
            rotate_offset: 24.0,
            rotate_radius: 6.0,
            rotate_hit: 8.0,
            dash: 6.0,
            outline_width: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub size: f64,
    pub color: Rgba8,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: 6.0,
            color: Rgba8::BLACK,
        }
    }
}

/// Defaults for newly added text layers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    pub color: Rgba8,
    pub box_width: f64,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            content: "Your text".to_string(),
            font_size: 28.0,
            font_family: "Poppins, Arial, sans-serif".to_string(),
            color: Rgba8::rgb(0x11, 0x18, 0x27),
            box_width: 400.0,
        }
    }
}

/// Default sizes for newly added shapes, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShapeDefaults {
    pub rect_width: f64,
    pub rect_height: f64,
    pub circle_diameter: f64,
    pub star_size: f64,
    pub fill: Rgba8,
}

impl Default for ShapeDefaults {
    fn default() -> Self {
        Self {
            rect_width: 300.0,
            rect_height: 180.0,
            circle_diameter: 240.0,
            star_size: 260.0,
            fill: Rgba8::BLACK,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub device_pixel_ratio: f64,
    pub history_capacity: usize,
    pub min_layer_size: f64,
    pub handles: HandleConfig,
    pub brush: BrushConfig,
    pub erase_mode: EraseMode,
    pub text: TextDefaults,
    pub shapes: ShapeDefaults,
    /// Uploaded images fit within this fraction of the canvas.
    pub image_max_fraction: f64,
    pub sticker_max_side: f64,
    pub jpeg_quality: u8,
    pub load_system_fonts: bool,
    pub image_cache_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1000,
            canvas_height: 700,
            device_pixel_ratio: 1.0,
            history_capacity: 100,
            min_layer_size: 20.0,
            handles: HandleConfig::default(),
            brush: BrushConfig::default(),
            erase_mode: EraseMode::default(),
            text: TextDefaults::default(),
            shapes: ShapeDefaults::default(),
            image_max_fraction: 0.6,
            sticker_max_side: 360.0,
            jpeg_quality: 92,
            load_system_fonts: true,
            image_cache_capacity: 64,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> EditorResult<Self> {
        serde_json::from_str(s).map_err(|e| EditorError::serde(format!("config: {e}")))
    }

    pub fn from_path(path: &Path) -> EditorResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply `STICKERKIT_*` environment overrides; unparsable or out-of-range values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(cap) = get(ENV_HISTORY_CAPACITY)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&v| v > 0)
        {
            self.history_capacity = cap;
        }
        if let Some(dpr) = get(ENV_DEVICE_PIXEL_RATIO)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
        {
            self.device_pixel_ratio = dpr;
        }
        self
    }

    pub fn validate(&self) -> EditorResult<()> {
        Canvas::new(self.canvas_width, self.canvas_height)?;
        if self.history_capacity == 0 {
            return Err(EditorError::validation("history_capacity must be > 0"));
        }
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(EditorError::validation(
                "device_pixel_ratio must be finite and > 0",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(EditorError::validation("jpeg_quality must be in 1..=100"));
        }
        if !self.min_layer_size.is_finite() || self.min_layer_size <= 0.0 {
            return Err(EditorError::validation("min_layer_size must be > 0"));
        }
        if !(self.image_max_fraction > 0.0 && self.image_max_fraction <= 1.0) {
            return Err(EditorError::validation(
                "image_max_fraction must be in (0, 1]",
            ));
        }
        if !self.text.font_size.is_finite() || self.text.font_size <= 0.0 {
            return Err(EditorError::validation("text.font_size must be > 0"));
        }
        Ok(())
    }

    /// Multiply a CSS-pixel length by the device pixel ratio.
    pub fn px(&self, css: f64) -> f64 {
        css * self.device_pixel_ratio
    }

    pub fn min_size_px(&self) -> f64 {
        self.px(self.min_layer_size)
    }

    pub fn handle_metrics(&self) -> HandleMetrics {
        let h = &self.handles;
        HandleMetrics {
            corner_hit: self.px(h.corner_hit),
            corner_size: self.px(h.corner_size),
            rotate_offset: self.px(h.rotate_offset),
            rotate_radius: self.px(h.rotate_radius),
            rotate_hit: self.px(h.rotate_hit),
            dash: self.px(h.dash),
            outline_width: self.px(h.outline_width),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
