use crate::{
    foundation::core::{Canvas, Point, Rgba8},
    geometry::placement::Placement,
    scene::layer::{ImageContent, Layer, LayerContent, LayerId},
    scene::paint::{EraseMode, PaintSurface},
};

/// Direction for a one-step z-order swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderDirection {
    /// Towards the top of the stack (painted later).
    Forward,
    /// Towards the bottom of the stack.
    Backward,
}

/// The editable document: background, ordered layers, selection and paint surface.
///
/// `layers` is bottom-to-top: the last layer paints last and wins hit tests.
#[derive(Clone, Debug)]
pub struct Scene {
    canvas: Canvas,
    background_color: Rgba8,
    background_image: Option<ImageContent>,
    layers: Vec<Layer>,
    selected: Option<LayerId>,
    paint: PaintSurface,
    min_size: f64,
    next_id: u64,
}

impl Scene {
    pub fn new(canvas: Canvas, min_size: f64, erase_mode: EraseMode) -> Self {
        Self {
            canvas,
            background_color: Rgba8::WHITE,
            background_image: None,
            layers: Vec::new(),
            selected: None,
            paint: PaintSurface::new(canvas.width, canvas.height, erase_mode),
            min_size: min_size.max(1.0),
            next_id: 1,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn background_color(&self) -> Rgba8 {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Rgba8) {
        self.background_color = color;
    }

    pub fn background_image(&self) -> Option<&ImageContent> {
        self.background_image.as_ref()
    }

    pub fn set_background_image(&mut self, image: Option<ImageContent>) {
        self.background_image = image;
    }

    pub(crate) fn background_image_mut(&mut self) -> Option<&mut ImageContent> {
        self.background_image.as_mut()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.layer(id))
    }

    pub fn paint(&self) -> &PaintSurface {
        &self.paint
    }

    pub fn paint_mut(&mut self) -> &mut PaintSurface {
        &mut self.paint
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn enforce_invariants(min_size: f64, layer: &mut Layer) {
        let p = &mut layer.placement;
        p.width = if p.width.is_finite() { p.width.max(min_size) } else { min_size };
        p.height = if p.height.is_finite() { p.height.max(min_size) } else { min_size };
        layer.opacity = if layer.opacity.is_finite() {
            layer.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Append a layer on top of the stack and select it.
    pub fn add_layer(&mut self, placement: Placement, content: LayerContent) -> LayerId {
        let id = self.allocate_id();
        let mut layer = Layer {
            id,
            placement,
            opacity: 1.0,
            content,
        };
        Self::enforce_invariants(self.min_size, &mut layer);
        self.layers.push(layer);
        self.selected = Some(id);
        id
    }

    /// Remove a layer; no-op when absent. Clears the selection if it pointed at it.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let idx = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.layers.remove(idx))
    }

    /// Mutate a layer in place; no-op when absent. Identity, size floor and opacity range
    /// are re-established after `f` runs.
    pub fn update_layer(&mut self, id: LayerId, f: impl FnOnce(&mut Layer)) -> bool {
        let min_size = self.min_size;
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        f(layer);
        layer.id = id;
        Self::enforce_invariants(min_size, layer);
        true
    }

    /// Swap with the adjacent layer; no-op at either end of the stack.
    pub fn reorder(&mut self, id: LayerId, direction: ReorderDirection) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let other = match direction {
            ReorderDirection::Forward if idx + 1 < self.layers.len() => idx + 1,
            ReorderDirection::Backward if idx > 0 => idx - 1,
            _ => return false,
        };
        self.layers.swap(idx, other);
        true
    }

    /// Select a layer, or clear the selection with `None`. Unknown ids are ignored.
    pub fn set_selection(&mut self, id: Option<LayerId>) -> bool {
        match id {
            Some(id) if !self.contains_layer(id) => false,
            _ => {
                self.selected = id;
                true
            }
        }
    }

    /// Topmost layer containing `p`.
    pub fn hit_test(&self, p: Point) -> Option<LayerId> {
        self.layers
            .iter()
            .rev()
            .find(|l| l.placement.contains(p))
            .map(|l| l.id)
    }

    /// Empty the layer list, paint surface and background image; keeps the background color.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.selected = None;
        self.paint.clear();
        self.background_image = None;
    }

    /// Change the canvas size. Layer coordinates are kept as absolute pixels.
    pub fn resize_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
        self.paint.resize(canvas.width, canvas.height);
    }

    /// Replace document state wholesale (snapshot restore).
    ///
    /// The id counter never moves backwards, so ids stay unique for the session.
    pub(crate) fn replace_document(
        &mut self,
        canvas: Canvas,
        background_color: Rgba8,
        background_image: Option<ImageContent>,
        layers: Vec<Layer>,
    ) {
        self.canvas = canvas;
        self.paint.resize(canvas.width, canvas.height);
        self.background_color = background_color;
        self.background_image = background_image;
        self.layers = layers;
        for layer in &mut self.layers {
            Self::enforce_invariants(self.min_size, layer);
        }
        let max_id = self.layers.iter().map(|l| l.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
        if self.selected.is_some_and(|id| !self.contains_layer(id)) {
            self.selected = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
