//! `vello_cpu` drawing for scene content and the selection overlay.

use std::{
    collections::{HashMap, VecDeque},
    f64::consts::{FRAC_PI_2, PI},
    sync::Arc,
};

use vello_cpu::kurbo::Shape as _;

use crate::{
    assets::decode::DecodedImage,
    foundation::core::{Affine, Rgba8, Vec2},
    foundation::error::{EditorError, EditorResult},
    geometry::handles::{Corner, HandleMetrics},
    render::text::TextEngine,
    scene::layer::{Layer, LayerContent},
    scene::model::Scene,
};

/// Selection overlay color (`#2563eb`).
pub(crate) const OVERLAY_COLOR: Rgba8 = Rgba8::rgb(0x25, 0x63, 0xeb);

/// Star outer radius over inner radius.
const STAR_RADIUS_RATIO: f64 = 2.0;
const STAR_POINTS: usize = 5;

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> EditorResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| EditorError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| EditorError::validation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(EditorError::validation("pixmap byte len mismatch"));
    }
    let pixels: Vec<_> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub(crate) fn image_paint(bytes: &[u8], width: u32, height: u32) -> EditorResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Five-point star inscribed in `min(w, h)`, first spike pointing up.
pub(crate) fn star_path(width: f64, height: f64) -> vello_cpu::kurbo::BezPath {
    let outer = width.min(height) / 2.0;
    let inner = outer / STAR_RADIUS_RATIO;
    let step = PI / STAR_POINTS as f64;
    let mut path = vello_cpu::kurbo::BezPath::new();
    for i in 0..STAR_POINTS * 2 {
        let r = if i % 2 == 0 { outer } else { inner };
        let angle = -FRAC_PI_2 + step * i as f64;
        let p = vello_cpu::kurbo::Point::new(r * angle.cos(), r * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Rasterizer-ready images keyed by decoded content, least recently used evicted first.
pub(crate) struct ImagePaintCache {
    entries: HashMap<u64, vello_cpu::Image>,
    lru: VecDeque<u64>,
    capacity: usize,
}

impl ImagePaintCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn paint_for(&mut self, img: &DecodedImage) -> EditorResult<vello_cpu::Image> {
        let key = img.content_key;
        if let Some(paint) = self.entries.get(&key).cloned() {
            self.touch(key);
            return Ok(paint);
        }
        let paint = image_paint(&img.rgba8_premul, img.width, img.height)?;
        self.entries.insert(key, paint.clone());
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
            }
        }
        Ok(paint)
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|x| *x == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    draw(ctx);
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

/// Draw a decoded image stretched over `dst_w x dst_h`, with `tr` mapping that box's
/// top-left corner.
fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    images: &mut ImagePaintCache,
    img: &DecodedImage,
    tr: Affine,
    dst_w: f64,
    dst_h: f64,
    opacity: f32,
) -> EditorResult<()> {
    let paint = images.paint_for(img)?;
    let (iw, ih) = (f64::from(img.width), f64::from(img.height));
    let scale = Affine::scale_non_uniform(dst_w / iw, dst_h / ih);
    ctx.set_transform(affine_to_cpu(tr * scale));
    ctx.set_paint(paint);
    with_opacity(ctx, opacity, |ctx| {
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
    });
    Ok(())
}

/// Background color, cover-fit background image, then layers bottom to top.
pub(crate) fn draw_scene(
    ctx: &mut vello_cpu::RenderContext,
    images: &mut ImagePaintCache,
    text: &mut TextEngine,
    scene: &Scene,
) -> EditorResult<()> {
    let canvas = scene.canvas().size();
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(scene.background_color()));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        canvas.width,
        canvas.height,
    ));

    if let Some(img) = scene.background_image().and_then(|b| b.pixels.as_deref()) {
        let (iw, ih) = (f64::from(img.width), f64::from(img.height));
        let scale = (canvas.width / iw).max(canvas.height / ih);
        let (dw, dh) = (iw * scale, ih * scale);
        let tr = Affine::translate(Vec2::new(
            (canvas.width - dw) / 2.0,
            (canvas.height - dh) / 2.0,
        ));
        draw_image(ctx, images, img, tr, dw, dh, 1.0)?;
    }

    for layer in scene.layers() {
        draw_layer(ctx, images, text, layer)?;
    }
    Ok(())
}

fn draw_layer(
    ctx: &mut vello_cpu::RenderContext,
    images: &mut ImagePaintCache,
    text: &mut TextEngine,
    layer: &Layer,
) -> EditorResult<()> {
    let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return Ok(());
    }
    let p = &layer.placement;
    let tr = p.to_affine();
    let (w, h) = (p.width, p.height);
    let local = vello_cpu::kurbo::Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0);

    match &layer.content {
        LayerContent::Image(img) | LayerContent::Drawing(img) => {
            // Not decoded yet (fresh restore or pending load): nothing to draw.
            let Some(px) = img.pixels.as_deref() else {
                return Ok(());
            };
            let corner = tr * Affine::translate(Vec2::new(-w / 2.0, -h / 2.0));
            draw_image(ctx, images, px, corner, w, h, opacity)?;
        }
        LayerContent::Text(t) => {
            let Some(block) =
                text.layout(&t.text, &t.font_family, t.font_size as f32, t.fill, w as f32)?
            else {
                return Ok(());
            };
            let top_left = tr
                * Affine::translate(Vec2::new(
                    -w / 2.0,
                    -f64::from(block.height()) / 2.0,
                ));
            ctx.set_transform(affine_to_cpu(top_left));
            with_opacity(ctx, opacity, |ctx| {
                for line in block.layout.lines() {
                    let indent = ((block.box_width - line.metrics().advance) / 2.0).max(0.0);
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));
                        let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x + indent,
                            y: g.y,
                        });
                        ctx.glyph_run(&block.face.font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            });
        }
        LayerContent::Rect { fill } => {
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(color_to_cpu(*fill));
            with_opacity(ctx, opacity, |ctx| ctx.fill_rect(&local));
        }
        LayerContent::Circle { fill } => {
            let ellipse = vello_cpu::kurbo::Ellipse::new((0.0, 0.0), (w / 2.0, h / 2.0), 0.0);
            let path = ellipse.to_path(0.1);
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(color_to_cpu(*fill));
            with_opacity(ctx, opacity, |ctx| ctx.fill_path(&path));
        }
        LayerContent::Star { fill } => {
            let path = star_path(w, h);
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(color_to_cpu(*fill));
            with_opacity(ctx, opacity, |ctx| ctx.fill_path(&path));
        }
    }
    Ok(())
}

/// Dashed outline, corner squares and rotation knob around `layer`.
///
/// Everything is drawn as filled shapes in the layer's local frame, composed with `view`.
pub(crate) fn draw_selection_overlay(
    ctx: &mut vello_cpu::RenderContext,
    layer: &Layer,
    metrics: &HandleMetrics,
    view: Affine,
) {
    let p = &layer.placement;
    let (hw, hh) = (p.width / 2.0, p.height / 2.0);
    let lw = metrics.outline_width.max(1.0);
    let dash = metrics.dash.max(1.0);
    ctx.set_transform(affine_to_cpu(view * p.to_affine()));
    ctx.set_paint(color_to_cpu(OVERLAY_COLOR));

    let mut x = -hw;
    while x < hw {
        let x1 = (x + dash).min(hw);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, -hh - lw / 2.0, x1, -hh + lw / 2.0));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, hh - lw / 2.0, x1, hh + lw / 2.0));
        x += dash * 2.0;
    }
    let mut y = -hh;
    while y < hh {
        let y1 = (y + dash).min(hh);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(-hw - lw / 2.0, y, -hw + lw / 2.0, y1));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(hw - lw / 2.0, y, hw + lw / 2.0, y1));
        y += dash * 2.0;
    }

    let half = metrics.corner_size / 2.0;
    for corner in Corner::ALL {
        let c = corner.local_position(p);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            c.x - half,
            c.y - half,
            c.x + half,
            c.y + half,
        ));
    }

    let knob = metrics.rotation_handle_local(p);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        -lw / 2.0,
        knob.y,
        lw / 2.0,
        -hh,
    ));
    let circle = vello_cpu::kurbo::Circle::new((knob.x, knob.y), metrics.rotate_radius);
    ctx.fill_path(&circle.to_path(0.1));
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
