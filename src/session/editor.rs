//! The editor session: one owned value holding the scene, history, gesture state and
//! async bookkeeping. All mutation happens on the caller's thread.

use std::{collections::HashMap, path::Path, sync::Arc};

use crate::{
    assets::cutout::{CutoutCompletion, CutoutReply, CutoutRequest, CutoutService, CutoutTicket},
    assets::decode::DecodedImage,
    assets::encode::{ExportFormat, encode_premul_rgba8},
    assets::loader::{AssetLoader, DecodeCompletion, DecodeJob, DecodeTicket},
    assets::source::ImageSource,
    foundation::core::{Canvas, Point, Rgba8},
    foundation::error::{EditorError, EditorResult},
    geometry::placement::Placement,
    history::snapshot::{PendingImage, Snapshot, capture_or_warn},
    history::stack::History,
    interaction::gesture::{GestureController, GestureState, PointerContext, TextEditRequest, Tool},
    render::pipeline::Compositor,
    render::surface::Frame,
    scene::layer::{ImageContent, LayerContent, LayerId, ShapeKind, TextContent},
    scene::model::{ReorderDirection, Scene},
    session::config::EditorConfig,
};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Last user-visible message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub severity: Severity,
}

/// Encoded export ready to be saved or offered as a download.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ImageKind {
    Upload,
    Sticker,
}

/// What a decode completion is for.
enum DecodeTarget {
    NewLayer { kind: ImageKind, source: ImageSource },
    NewBackground { source: ImageSource },
    /// Pixels for a layer restored from a snapshot.
    LayerPixels { id: LayerId, fingerprint: u64 },
    /// Pixels for a background image restored from a snapshot.
    BackgroundPixels { fingerprint: u64 },
    CutoutResult { id: LayerId, source: ImageSource },
}

impl DecodeTarget {
    fn label(&self) -> &'static str {
        match self {
            DecodeTarget::NewLayer { .. } => "new_layer",
            DecodeTarget::NewBackground { .. } => "new_background",
            DecodeTarget::LayerPixels { .. } => "layer_pixels",
            DecodeTarget::BackgroundPixels { .. } => "background_pixels",
            DecodeTarget::CutoutResult { .. } => "cutout_result",
        }
    }
}

pub struct EditorSession {
    config: EditorConfig,
    scene: Scene,
    history: History,
    gesture: GestureController,
    tool: Tool,
    brush_size: f64,
    brush_color: Rgba8,
    loader: Box<dyn AssetLoader>,
    cutout: Option<Box<dyn CutoutService>>,
    pending_decodes: HashMap<DecodeTicket, DecodeTarget>,
    pending_cutouts: HashMap<CutoutTicket, LayerId>,
    next_ticket: u64,
    compositor: Compositor,
    status: Option<Status>,
    needs_redraw: bool,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("canvas", &self.scene.canvas())
            .field("layers", &self.scene.layers().len())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .field("gesture", &self.gesture.state().name())
            .field("pending_decodes", &self.pending_decodes.len())
            .field("pending_cutouts", &self.pending_cutouts.len())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    pub fn create(
        config: EditorConfig,
        loader: Box<dyn AssetLoader>,
    ) -> EditorResult<Self> {
        config.validate()?;
        let canvas = Canvas::new(config.canvas_width, config.canvas_height)?;
        let scene = Scene::new(canvas, config.min_size_px(), config.erase_mode);
        tracing::info!(
            width = canvas.width,
            height = canvas.height,
            dpr = config.device_pixel_ratio,
            "editor session created"
        );
        Ok(Self {
            history: History::new(config.history_capacity),
            gesture: GestureController::new(),
            tool: Tool::Select,
            brush_size: config.px(config.brush.size),
            brush_color: config.brush.color,
            loader,
            cutout: None,
            pending_decodes: HashMap::new(),
            pending_cutouts: HashMap::new(),
            next_ticket: 1,
            compositor: Compositor::new(config.load_system_fonts, config.image_cache_capacity),
            status: None,
            needs_redraw: true,
            scene,
            config,
        })
    }

    pub fn with_cutout_service(mut self, service: Box<dyn CutoutService>) -> Self {
        self.cutout = Some(service);
        self
    }

    /// End the session. Completions still in flight are dropped unapplied.
    pub fn dispose(self) {
        tracing::info!(
            pending_decodes = self.pending_decodes.len(),
            pending_cutouts = self.pending_cutouts.len(),
            "editor session disposed"
        );
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.gesture.state()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Whether the scene changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn pending_decodes(&self) -> usize {
        self.pending_decodes.len()
    }

    pub fn pending_cutouts(&self) -> usize {
        self.pending_cutouts.len()
    }

    pub fn register_font(&mut self, bytes: Vec<u8>) {
        self.compositor.register_font(bytes);
        self.needs_redraw = true;
    }

    pub fn load_fonts_from_dir(&mut self, dir: &Path) {
        self.compositor.load_fonts_from_dir(dir);
        self.needs_redraw = true;
    }

    pub fn has_fonts(&self) -> bool {
        self.compositor.has_fonts()
    }

    fn record(&mut self) {
        if let Some(snap) = capture_or_warn(&self.scene) {
            self.history.push(snap);
        }
    }

    fn set_status(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info => tracing::info!(%message, "status"),
            Severity::Error => tracing::warn!(%message, "status"),
        }
        self.status = Some(Status { message, severity });
    }

    fn reject<T>(&mut self, err: EditorError) -> EditorResult<T> {
        self.set_status(Severity::Error, err.to_string());
        Err(err)
    }

    fn selected_id(&mut self) -> EditorResult<LayerId> {
        match self.scene.selected() {
            Some(id) => Ok(id),
            None => self.reject(EditorError::rejected("no layer selected")),
        }
    }

    fn changed(&mut self) {
        self.needs_redraw = true;
    }

    fn submit_decode(&mut self, source: ImageSource, target: DecodeTarget) -> DecodeTicket {
        let ticket = DecodeTicket(self.next_ticket);
        self.next_ticket += 1;
        tracing::debug!(ticket = ticket.0, target = target.label(), "decode submitted");
        self.pending_decodes.insert(ticket, target);
        self.loader.submit(DecodeJob { ticket, source });
        ticket
    }

    fn submit_restored(&mut self, pending: Vec<PendingImage>) {
        for p in pending {
            match p {
                PendingImage::Layer { id, source } => {
                    let fingerprint = source.fingerprint();
                    self.submit_decode(source, DecodeTarget::LayerPixels { id, fingerprint });
                }
                PendingImage::Background { source } => {
                    let fingerprint = source.fingerprint();
                    self.submit_decode(source, DecodeTarget::BackgroundPixels { fingerprint });
                }
            }
        }
    }

    /// Queue an uploaded image. The layer appears once decoding completes.
    pub fn add_image(&mut self, bytes: Vec<u8>) -> DecodeTicket {
        let source = ImageSource::embedded(bytes);
        self.submit_decode(
            source.clone(),
            DecodeTarget::NewLayer {
                kind: ImageKind::Upload,
                source,
            },
        )
    }

    /// Queue a catalog sticker by URI.
    pub fn add_sticker(&mut self, uri: &str) -> DecodeTicket {
        let source = ImageSource::linked(uri);
        self.submit_decode(
            source.clone(),
            DecodeTarget::NewLayer {
                kind: ImageKind::Sticker,
                source,
            },
        )
    }

    pub fn add_text(&mut self, text: Option<&str>) -> LayerId {
        self.record();
        let defaults = &self.config.text;
        let font_size = self.config.px(defaults.font_size);
        let content = TextContent {
            text: text.unwrap_or(defaults.content.as_str()).to_string(),
            font_size,
            font_family: defaults.font_family.clone(),
            fill: defaults.color,
        };
        let placement = Placement::new(
            self.scene.canvas().center(),
            self.config.px(defaults.box_width),
            font_size * 2.0,
        );
        let id = self.scene.add_layer(placement, LayerContent::Text(content));
        self.changed();
        id
    }

    pub fn add_shape(&mut self, kind: ShapeKind, fill: Option<Rgba8>) -> LayerId {
        self.record();
        let s = &self.config.shapes;
        let (w, h) = match kind {
            ShapeKind::Rect => (s.rect_width, s.rect_height),
            ShapeKind::Circle => (s.circle_diameter, s.circle_diameter),
            ShapeKind::Star => (s.star_size, s.star_size),
        };
        let fill = fill.unwrap_or(s.fill);
        let placement = Placement::new(
            self.scene.canvas().center(),
            self.config.px(w),
            self.config.px(h),
        );
        let id = self.scene.add_layer(placement, kind.content(fill));
        self.changed();
        id
    }

    pub fn select(&mut self, id: Option<LayerId>) -> bool {
        let changed = self.scene.set_selection(id);
        if changed {
            self.changed();
        }
        changed
    }

    pub fn delete_selected(&mut self) -> EditorResult<LayerId> {
        let id = self.selected_id()?;
        self.record();
        self.scene.remove_layer(id);
        self.changed();
        Ok(id)
    }

    fn reorder_selected(&mut self, direction: ReorderDirection) -> EditorResult<bool> {
        let id = self.selected_id()?;
        let len = self.scene.layers().len();
        let movable = match (self.scene.index_of(id), direction) {
            (Some(idx), ReorderDirection::Forward) => idx + 1 < len,
            (Some(idx), ReorderDirection::Backward) => idx > 0,
            (None, _) => false,
        };
        if !movable {
            return Ok(false);
        }
        self.record();
        let moved = self.scene.reorder(id, direction);
        self.changed();
        Ok(moved)
    }

    pub fn bring_forward(&mut self) -> EditorResult<bool> {
        self.reorder_selected(ReorderDirection::Forward)
    }

    pub fn send_backward(&mut self) -> EditorResult<bool> {
        self.reorder_selected(ReorderDirection::Backward)
    }

    /// Opacity of the selection, clamped to `0..=1`.
    pub fn set_opacity(&mut self, opacity: f64) -> EditorResult<()> {
        let id = self.selected_id()?;
        if !opacity.is_finite() {
            return self.reject(EditorError::validation("opacity must be finite"));
        }
        self.record();
        self.scene.update_layer(id, |l| l.opacity = opacity);
        self.changed();
        Ok(())
    }

    /// Font size of the selected text layer; its box height follows at twice the size.
    pub fn set_font_size(&mut self, size: f64) -> EditorResult<()> {
        let id = self.selected_id()?;
        if !size.is_finite() || size <= 0.0 {
            return self.reject(EditorError::validation("font size must be > 0"));
        }
        if self.scene.layer(id).and_then(|l| l.content.text()).is_none() {
            return self.reject(EditorError::rejected("font size applies to text layers"));
        }
        self.record();
        self.scene.update_layer(id, |l| {
            if let Some(t) = l.content.text_mut() {
                t.font_size = size;
            }
            l.placement.height = size * 2.0;
        });
        self.changed();
        Ok(())
    }

    pub fn set_font_family(&mut self, family: &str) -> EditorResult<()> {
        let id = self.selected_id()?;
        if family.trim().is_empty() {
            return self.reject(EditorError::validation("font family must not be empty"));
        }
        if self.scene.layer(id).and_then(|l| l.content.text()).is_none() {
            return self.reject(EditorError::rejected("font family applies to text layers"));
        }
        self.record();
        self.scene.update_layer(id, |l| {
            if let Some(t) = l.content.text_mut() {
                t.font_family = family.to_string();
            }
        });
        self.changed();
        Ok(())
    }

    /// Fill color of the selected text or shape layer.
    pub fn set_fill_color(&mut self, color: Rgba8) -> EditorResult<()> {
        let id = self.selected_id()?;
        let fillable = self
            .scene
            .layer(id)
            .is_some_and(|l| !matches!(l.content, LayerContent::Image(_) | LayerContent::Drawing(_)));
        if !fillable {
            return self.reject(EditorError::rejected("fill color applies to text and shapes"));
        }
        self.record();
        self.scene.update_layer(id, |l| {
            if let Some(fill) = l.content.fill_mut() {
                *fill = color;
            }
        });
        self.changed();
        Ok(())
    }

    /// Replace the content of the selected text layer.
    pub fn set_text(&mut self, text: &str) -> EditorResult<()> {
        let id = self.selected_id()?;
        self.commit_text_edit(id, text)
    }

    /// Finish an inline edit started by [`EditorSession::double_click`].
    pub fn commit_text_edit(&mut self, id: LayerId, text: &str) -> EditorResult<()> {
        let Some(current) = self.scene.layer(id).and_then(|l| l.content.text()) else {
            return self.reject(EditorError::rejected(format!("layer {id} is not a text layer")));
        };
        if current.text == text {
            return Ok(());
        }
        self.record();
        self.scene.update_layer(id, |l| {
            if let Some(t) = l.content.text_mut() {
                t.text = text.to_string();
            }
        });
        self.changed();
        Ok(())
    }

    /// Explicit size for a layer; the minimum size floor still applies.
    pub fn resize_layer(&mut self, id: LayerId, width: f64, height: f64) -> EditorResult<()> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return self.reject(EditorError::validation("layer size must be > 0"));
        }
        if !self.scene.contains_layer(id) {
            return self.reject(EditorError::rejected(format!("no layer {id}")));
        }
        self.record();
        self.scene.update_layer(id, |l| {
            l.placement.width = width;
            l.placement.height = height;
        });
        self.changed();
        Ok(())
    }

    pub fn set_background_color(&mut self, color: Rgba8) {
        if self.scene.background_color() == color {
            return;
        }
        self.record();
        self.scene.set_background_color(color);
        self.changed();
    }

    /// Queue a background image; it replaces the current one once decoded.
    pub fn set_background_image(&mut self, bytes: Vec<u8>) -> DecodeTicket {
        let source = ImageSource::embedded(bytes);
        self.submit_decode(source.clone(), DecodeTarget::NewBackground { source })
    }

    pub fn clear_background_image(&mut self) -> bool {
        if self.scene.background_image().is_none() {
            return false;
        }
        self.record();
        self.scene.set_background_image(None);
        self.changed();
        true
    }

    /// Remove every layer, the paint strokes and the background image.
    pub fn clear(&mut self) {
        self.gesture.cancel();
        self.record();
        self.scene.clear();
        self.changed();
    }

    pub fn resize_canvas(&mut self, width: u32, height: u32) -> EditorResult<()> {
        let canvas = match Canvas::new(width, height) {
            Ok(c) => c,
            Err(err) => return self.reject(err),
        };
        if canvas == self.scene.canvas() {
            return Ok(());
        }
        self.gesture.cancel();
        self.record();
        self.scene.resize_canvas(canvas);
        tracing::debug!(width, height, "canvas resized");
        self.changed();
        Ok(())
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.gesture.is_active() {
            self.gesture.release();
        }
        self.tool = tool;
    }

    /// Brush size in CSS pixels and color for the paint tool.
    pub fn set_brush(&mut self, size: f64, color: Rgba8) -> EditorResult<()> {
        if !size.is_finite() || size <= 0.0 {
            return self.reject(EditorError::validation("brush size must be > 0"));
        }
        self.brush_size = self.config.px(size);
        self.brush_color = color;
        Ok(())
    }

    fn pointer_context(&self) -> PointerContext {
        PointerContext {
            tool: self.tool,
            brush_size: self.brush_size,
            brush_color: self.brush_color,
            metrics: self.config.handle_metrics(),
        }
    }

    /// Pointer press in canvas pixels. Returns whether the scene changed.
    pub fn pointer_down(&mut self, p: Point) -> bool {
        let ctx = self.pointer_context();
        let changed = self
            .gesture
            .press(&mut self.scene, &mut self.history, p, &ctx);
        if changed {
            self.changed();
        }
        changed
    }

    pub fn pointer_move(&mut self, p: Point) -> bool {
        let changed = self.gesture.move_to(&mut self.scene, &mut self.history, p);
        if changed {
            self.changed();
        }
        changed
    }

    /// Returns whether the finished gesture mutated the scene.
    pub fn pointer_up(&mut self) -> bool {
        self.gesture.release()
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.gesture.release()
    }

    pub fn double_click(&mut self, p: Point) -> Option<TextEditRequest> {
        let req = self.gesture.double_click(&mut self.scene, p);
        if req.is_some() {
            self.changed();
        }
        req
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.gesture.cancel();
        let current = capture_or_warn(&self.scene);
        let Some(prev) = self.history.undo(current) else {
            return false;
        };
        self.apply_snapshot(&prev)
    }

    pub fn redo(&mut self) -> bool {
        self.gesture.cancel();
        let current = capture_or_warn(&self.scene);
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        self.apply_snapshot(&next)
    }

    fn apply_snapshot(&mut self, snap: &Snapshot) -> bool {
        match snap.restore_into(&mut self.scene) {
            Ok(pending) => {
                self.submit_restored(pending);
                self.changed();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "snapshot restore failed");
                self.set_status(Severity::Error, format!("could not restore state: {err}"));
                false
            }
        }
    }

    /// Replace the document with `doc` and start a fresh history.
    pub fn load_document(&mut self, doc: &Snapshot) -> EditorResult<()> {
        if let Err(err) = doc.validate() {
            return self.reject(err);
        }
        self.gesture.cancel();
        let pending = match doc.restore_into(&mut self.scene) {
            Ok(p) => p,
            Err(err) => return self.reject(err),
        };
        self.scene.set_selection(None);
        self.history.clear();
        self.submit_restored(pending);
        self.changed();
        Ok(())
    }

    /// The current document, without decoded pixels.
    pub fn document(&self) -> EditorResult<Snapshot> {
        Snapshot::capture(&self.scene)
    }

    /// Move the inked part of the paint surface into a new `drawing` layer.
    ///
    /// `Ok(None)` when nothing is painted.
    pub fn commit_paint_to_layer(&mut self) -> EditorResult<Option<LayerId>> {
        let Some(bounds) = self.scene.paint().inked_bounds() else {
            return Ok(None);
        };
        let png = self.scene.paint().encode_region_png(bounds)?;
        let pixels = crate::assets::decode::decode_image(&png)?;
        self.gesture.cancel();
        self.record();
        let center = Point::new(
            f64::from(bounds.x0) + f64::from(bounds.width()) / 2.0,
            f64::from(bounds.y0) + f64::from(bounds.height()) / 2.0,
        );
        let placement = Placement::new(
            center,
            f64::from(bounds.width()),
            f64::from(bounds.height()),
        );
        let content = ImageContent::decoded(ImageSource::embedded(png), Arc::new(pixels));
        let id = self
            .scene
            .add_layer(placement, LayerContent::Drawing(content));
        self.scene.paint_mut().clear();
        self.changed();
        Ok(Some(id))
    }

    /// Send the selected image layer to the cutout service.
    pub fn request_cutout(&mut self) -> EditorResult<CutoutTicket> {
        if self.cutout.is_none() {
            return self.reject(EditorError::rejected("no cutout service configured"));
        }
        let id = self.selected_id()?;
        let png = match self.cutout_png(id) {
            Ok(png) => png,
            Err(err) => return self.reject(err),
        };

        let ticket = CutoutTicket(self.next_ticket);
        self.next_ticket += 1;
        if let Some(service) = self.cutout.as_mut() {
            service.submit(CutoutRequest { ticket, png });
        }
        self.pending_cutouts.insert(ticket, id);
        tracing::debug!(ticket = ticket.0, layer = id.0, "cutout requested");
        self.set_status(Severity::Info, "removing background");
        Ok(ticket)
    }

    fn cutout_png(&self, id: LayerId) -> EditorResult<Vec<u8>> {
        let layer = self
            .scene
            .layer(id)
            .ok_or_else(|| EditorError::rejected(format!("no layer {id}")))?;
        let LayerContent::Image(img) = &layer.content else {
            return Err(EditorError::rejected(format!(
                "cutout needs an image layer, selection is {}",
                layer.kind_name()
            )));
        };
        let Some(bytes) = img.source.embedded_bytes() else {
            return Err(EditorError::rejected(
                "image source is linked and cannot be sent for cutout",
            ));
        };
        if bytes.starts_with(PNG_SIGNATURE) {
            return Ok(bytes.to_vec());
        }
        let Some(px) = img.pixels.as_deref() else {
            return Err(EditorError::rejected("image is still loading"));
        };
        encode_premul_rgba8(&px.rgba8_premul, px.width, px.height, ExportFormat::Png)
    }

    /// Apply every completion that is ready. Returns how many were processed.
    #[tracing::instrument(skip_all)]
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        let cutouts = match self.cutout.as_mut() {
            Some(service) => service.poll(),
            None => Vec::new(),
        };
        for c in cutouts {
            self.apply_cutout(c);
            n += 1;
        }
        for c in self.loader.poll() {
            self.apply_decode(c);
            n += 1;
        }
        n
    }

    /// Block until every submitted decode has been applied.
    ///
    /// Cutout replies that are already available are applied too; outstanding cutout
    /// requests are not waited for.
    pub fn settle(&mut self) -> usize {
        let mut n = self.pump();
        while self.loader.in_flight() > 0 {
            let batch = self.loader.wait();
            if batch.is_empty() {
                tracing::warn!(
                    in_flight = self.loader.in_flight(),
                    "loader reported work in flight but delivered nothing"
                );
                break;
            }
            for c in batch {
                self.apply_decode(c);
                n += 1;
            }
            n += self.pump();
        }
        n
    }

    fn apply_decode(&mut self, completion: DecodeCompletion) {
        let DecodeCompletion { ticket, result } = completion;
        let Some(target) = self.pending_decodes.remove(&ticket) else {
            tracing::debug!(ticket = ticket.0, "decode completion for unknown ticket discarded");
            return;
        };
        let pixels = match result {
            Ok(px) => px,
            Err(err) => {
                match target {
                    DecodeTarget::NewLayer { .. } | DecodeTarget::NewBackground { .. } => {
                        self.set_status(Severity::Error, format!("could not load image: {err}"));
                    }
                    DecodeTarget::CutoutResult { .. } => {
                        self.set_status(Severity::Error, format!("remove-bg failed: {err}"));
                    }
                    DecodeTarget::LayerPixels { .. } | DecodeTarget::BackgroundPixels { .. } => {
                        tracing::warn!(error = %err, "restored image failed to decode");
                    }
                }
                return;
            }
        };

        match target {
            DecodeTarget::NewLayer { kind, source } => {
                self.record();
                let (w, h) = self.fitted_size(kind, &pixels);
                let placement = Placement::new(self.scene.canvas().center(), w, h);
                let content = ImageContent::decoded(source, pixels);
                let id = self.scene.add_layer(placement, LayerContent::Image(content));
                tracing::debug!(layer = id.0, w, h, "image layer added");
                self.changed();
            }
            DecodeTarget::NewBackground { source } => {
                self.record();
                self.scene
                    .set_background_image(Some(ImageContent::decoded(source, pixels)));
                self.changed();
            }
            DecodeTarget::LayerPixels { id, fingerprint } => {
                let mut attached = false;
                self.scene.update_layer(id, |l| {
                    if let Some(img) = l.content.image_mut()
                        && img.source.fingerprint() == fingerprint
                    {
                        img.pixels = Some(pixels);
                        attached = true;
                    }
                });
                if attached {
                    self.changed();
                } else {
                    tracing::debug!(layer = id.0, "stale restored-image decode discarded");
                }
            }
            DecodeTarget::BackgroundPixels { fingerprint } => {
                let attached = match self.scene.background_image_mut() {
                    Some(bg) if bg.source.fingerprint() == fingerprint => {
                        bg.pixels = Some(pixels);
                        true
                    }
                    _ => false,
                };
                if attached {
                    self.changed();
                } else {
                    tracing::debug!("stale background decode discarded");
                }
            }
            DecodeTarget::CutoutResult { id, source } => self.apply_cutout_pixels(id, source, pixels),
        }
    }

    /// Layer size for a freshly decoded image; never upscales.
    fn fitted_size(&self, kind: ImageKind, img: &DecodedImage) -> (f64, f64) {
        let (iw, ih) = (f64::from(img.width), f64::from(img.height));
        let canvas = self.scene.canvas().size();
        let (max_w, max_h) = match kind {
            ImageKind::Upload => (
                canvas.width * self.config.image_max_fraction,
                canvas.height * self.config.image_max_fraction,
            ),
            ImageKind::Sticker => {
                let side = self.config.px(self.config.sticker_max_side);
                (side, side)
            }
        };
        let scale = (max_w / iw).min(max_h / ih).min(1.0);
        (iw * scale, ih * scale)
    }

    fn apply_cutout(&mut self, completion: CutoutCompletion) {
        let Some(id) = self.pending_cutouts.remove(&completion.ticket) else {
            tracing::debug!(ticket = completion.ticket.0, "cutout reply for unknown ticket discarded");
            return;
        };
        match completion.reply {
            CutoutReply::Failure { message } => {
                self.set_status(Severity::Error, format!("remove-bg failed: {message}"));
            }
            CutoutReply::Success { image } => {
                if !self.scene.contains_layer(id) {
                    tracing::debug!(layer = id.0, "cutout reply for deleted layer discarded");
                    return;
                }
                let source = ImageSource::embedded(image);
                self.submit_decode(source.clone(), DecodeTarget::CutoutResult { id, source });
            }
        }
    }

    fn apply_cutout_pixels(&mut self, id: LayerId, source: ImageSource, pixels: Arc<DecodedImage>) {
        let is_image = self
            .scene
            .layer(id)
            .is_some_and(|l| matches!(l.content, LayerContent::Image(_)));
        if !is_image {
            tracing::debug!(layer = id.0, "cutout result for vanished layer discarded");
            return;
        }
        self.record();
        let canvas_w = self.scene.canvas().size().width;
        let fraction = self.config.image_max_fraction;
        let iw = f64::from(pixels.width);
        let aspect = pixels.aspect();
        self.scene.update_layer(id, |l| {
            let w = if iw > canvas_w {
                canvas_w * fraction
            } else {
                l.placement.width
            };
            l.placement.width = w;
            l.placement.height = w / aspect;
            l.content = LayerContent::Image(ImageContent::decoded(source, pixels));
        });
        self.set_status(Severity::Info, "Background removed");
        self.changed();
    }

    /// Live preview at `width x height`, selection handles included.
    pub fn render_preview(&mut self, width: u32, height: u32) -> EditorResult<Frame> {
        self.render_scaled(width, height, true)
    }

    /// The canvas scaled to `width x height`, optionally with selection handles.
    pub fn render_scaled(
        &mut self,
        width: u32,
        height: u32,
        with_handles: bool,
    ) -> EditorResult<Frame> {
        let mut frame = Frame::new(width, height);
        let metrics = self.config.handle_metrics();
        let overlay = with_handles.then_some(&metrics);
        self.compositor.render(&self.scene, &mut frame, overlay)?;
        Ok(frame)
    }

    /// The flattened canvas at its own resolution, without handles.
    pub fn flatten(&mut self) -> EditorResult<Frame> {
        self.compositor.flatten(&self.scene)
    }

    #[tracing::instrument(skip(self))]
    pub fn export(&mut self, format: ExportFormat) -> EditorResult<ExportArtifact> {
        let bytes = match self.compositor.export_flattened(&self.scene, format) {
            Ok(b) => b,
            Err(err) => return self.reject(err),
        };
        tracing::info!(bytes = bytes.len(), file = format.file_name(), "exported");
        Ok(ExportArtifact {
            file_name: format.file_name(),
            mime_type: format.mime_type(),
            bytes,
        })
    }

    pub fn export_png(&mut self) -> EditorResult<ExportArtifact> {
        self.export(ExportFormat::Png)
    }

    /// JPEG at the configured quality.
    pub fn export_jpeg(&mut self) -> EditorResult<ExportArtifact> {
        let quality = self.config.jpeg_quality;
        self.export(ExportFormat::Jpeg { quality })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
