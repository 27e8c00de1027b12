use std::path::Path;

use crate::{
    assets::encode::ExportFormat,
    foundation::core::Affine,
    foundation::error::{EditorError, EditorResult},
    geometry::handles::HandleMetrics,
    render::composite::{knockout_in_place, over_in_place},
    render::cpu::{ImagePaintCache, affine_to_cpu, draw_scene, draw_selection_overlay, image_paint},
    render::surface::Frame,
    render::text::TextEngine,
    scene::model::Scene,
};

/// Rasterizes scenes with `vello_cpu`.
///
/// Owns the font database, a decoded-image paint cache and a reusable render
/// context. One compositor per session; it is not shared across threads.
pub struct Compositor {
    text: TextEngine,
    images: ImagePaintCache,
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("font_faces", &self.text.face_count())
            .field("cached_images", &self.images.len())
            .finish_non_exhaustive()
    }
}

impl Compositor {
    pub fn new(load_system_fonts: bool, image_cache_capacity: usize) -> Self {
        Self {
            text: TextEngine::new(load_system_fonts),
            images: ImagePaintCache::new(image_cache_capacity),
            ctx: None,
        }
    }

    pub fn register_font(&mut self, bytes: Vec<u8>) {
        self.text.register_font(bytes);
    }

    pub fn load_fonts_from_dir(&mut self, dir: &Path) {
        self.text.load_fonts_from_dir(dir);
    }

    /// Whether any font face is available for text layers.
    pub fn has_fonts(&self) -> bool {
        self.text.face_count() > 0
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> EditorResult<R>,
    ) -> EditorResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    /// The scene at canvas resolution: background, layers, then the paint surface.
    #[tracing::instrument(skip_all, fields(layers = scene.layers().len()))]
    pub fn flatten(&mut self, scene: &Scene) -> EditorResult<Frame> {
        let canvas = scene.canvas();
        let (w, h) = dims_u16(canvas.width, canvas.height)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |this, ctx| {
            draw_scene(ctx, &mut this.images, &mut this.text, scene)?;
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;

        let mut frame = Frame::from_data(
            canvas.width,
            canvas.height,
            pixmap.data_as_u8_slice().to_vec(),
        )?;
        let paint = scene.paint();
        if paint.width() != canvas.width || paint.height() != canvas.height {
            return Err(EditorError::validation(
                "paint surface does not match canvas size",
            ));
        }
        if paint.has_knockout() {
            knockout_in_place(&mut frame.data, paint.knockout())?;
        }
        if !paint.is_blank() {
            over_in_place(&mut frame.data, paint.pixels(), 1.0)?;
        }
        Ok(frame)
    }

    /// Render into `target`, scaling the canvas to the target size and optionally
    /// drawing selection handles for the selected layer.
    pub fn render(
        &mut self,
        scene: &Scene,
        target: &mut Frame,
        overlay: Option<&HandleMetrics>,
    ) -> EditorResult<()> {
        let flat = self.flatten(scene)?;
        let selected = overlay.zip(scene.selected_layer());
        if selected.is_none() && target.width == flat.width && target.height == flat.height {
            *target = flat;
            return Ok(());
        }

        let (tw, th) = dims_u16(target.width, target.height)?;
        let view = Affine::scale_non_uniform(
            f64::from(target.width) / f64::from(flat.width),
            f64::from(target.height) / f64::from(flat.height),
        );
        let paint = image_paint(&flat.data, flat.width, flat.height)?;
        let mut pixmap = vello_cpu::Pixmap::new(tw, th);
        self.with_ctx_mut(tw, th, |_, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(view));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(flat.width),
                f64::from(flat.height),
            ));
            if let Some((metrics, layer)) = selected {
                draw_selection_overlay(ctx, layer, metrics, view);
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;
        *target = Frame::from_data(
            target.width,
            target.height,
            pixmap.data_as_u8_slice().to_vec(),
        )?;
        Ok(())
    }

    /// Flatten and encode; never includes selection handles.
    pub fn export_flattened(&mut self, scene: &Scene, format: ExportFormat) -> EditorResult<Vec<u8>> {
        self.flatten(scene)?.encode(format)
    }
}

fn dims_u16(width: u32, height: u32) -> EditorResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| EditorError::validation("render width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| EditorError::validation("render height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(EditorError::validation("render size must be non-zero"));
    }
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
