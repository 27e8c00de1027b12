use std::collections::HashSet;

use crate::{
    assets::source::ImageSource,
    foundation::core::{Canvas, Rgba8},
    foundation::error::{EditorError, EditorResult},
    scene::layer::{ImageContent, Layer, LayerId},
    scene::model::Scene,
    scene::paint::PaintSurface,
};

/// Immutable, serializable copy of the document part of a [`Scene`].
///
/// Decoded pixels are never stored: image layers and the background image keep their
/// [`ImageSource`], and restoring asks the caller to decode them again. The paint
/// surface is stored PNG-encoded.
///
/// A snapshot doubles as the on-disk scene document format.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    canvas: Canvas,
    background_color: Rgba8,
    #[serde(default)]
    background_image: Option<ImageSource>,
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(default)]
    paint_png: Option<Vec<u8>>,
    #[serde(default)]
    knockout_png: Option<Vec<u8>>,
}

/// Image that lost its pixels during a restore and needs a fresh decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingImage {
    Layer { id: LayerId, source: ImageSource },
    Background { source: ImageSource },
}

impl Snapshot {
    /// Capture the scene synchronously. Blank paint surfaces are not encoded.
    pub fn capture(scene: &Scene) -> EditorResult<Self> {
        let paint = scene.paint();
        let paint_png = if paint.is_blank() {
            None
        } else {
            Some(paint.encode_png()?)
        };
        let knockout_png = if paint.has_knockout() {
            Some(paint.encode_knockout_png()?)
        } else {
            None
        };
        Ok(Self {
            canvas: scene.canvas(),
            background_color: scene.background_color(),
            background_image: scene.background_image().map(|img| img.source.clone()),
            layers: scene.layers().iter().map(Layer::without_pixels).collect(),
            paint_png,
            knockout_png,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn background_color(&self) -> Rgba8 {
        self.background_color
    }

    pub fn background_image(&self) -> Option<&ImageSource> {
        self.background_image.as_ref()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn has_paint(&self) -> bool {
        self.paint_png.is_some()
    }

    /// Structural checks for documents that did not come from [`Self::capture`].
    pub fn validate(&self) -> EditorResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.id) {
                return Err(EditorError::validation(format!(
                    "duplicate layer id {}",
                    layer.id
                )));
            }
            let p = &layer.placement;
            if ![p.x, p.y, p.width, p.height, p.rotation]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(EditorError::validation(format!(
                    "layer {} has a non-finite placement",
                    layer.id
                )));
            }
            if let Some(text) = layer.content.text()
                && !(text.font_size.is_finite() && text.font_size > 0.0)
            {
                return Err(EditorError::validation(format!(
                    "layer {} font size must be > 0",
                    layer.id
                )));
            }
        }
        Ok(())
    }

    /// Replace the scene's document state with this snapshot.
    ///
    /// The scene is left untouched when the stored paint surface cannot be decoded.
    #[tracing::instrument(skip_all, fields(layers = self.layers.len()))]
    pub fn restore_into(&self, scene: &mut Scene) -> EditorResult<Vec<PendingImage>> {
        let mut paint = PaintSurface::new(
            self.canvas.width,
            self.canvas.height,
            scene.paint().erase_mode(),
        );
        if let Some(png) = &self.paint_png {
            paint.load_png(png, self.knockout_png.as_deref())?;
        }

        let mut pending = Vec::new();
        for layer in &self.layers {
            if let Some(img) = layer.content.image() {
                pending.push(PendingImage::Layer {
                    id: layer.id,
                    source: img.source.clone(),
                });
            }
        }
        if let Some(source) = &self.background_image {
            pending.push(PendingImage::Background {
                source: source.clone(),
            });
        }

        scene.replace_document(
            self.canvas,
            self.background_color,
            self.background_image.clone().map(ImageContent::new),
            self.layers.clone(),
        );
        *scene.paint_mut() = paint;
        Ok(pending)
    }

    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EditorError::serde(e.to_string()))
    }

    pub fn from_json(s: &str) -> EditorResult<Self> {
        let snap: Self = serde_json::from_str(s).map_err(|e| EditorError::serde(e.to_string()))?;
        snap.validate()?;
        Ok(snap)
    }
}

/// Capture for history; a failure is logged and the edit proceeds without undo coverage.
pub(crate) fn capture_or_warn(scene: &Scene) -> Option<Snapshot> {
    match Snapshot::capture(scene) {
        Ok(snap) => Some(snap),
        Err(err) => {
            tracing::warn!(error = %err, "snapshot capture failed, edit proceeds without undo entry");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/snapshot.rs"]
mod tests;
