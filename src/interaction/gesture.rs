//! Pointer gesture state machine: press, move, release.
//!
//! A gesture that edits a layer captures a snapshot at press and pushes it to history on
//! its first actual mutation, so a click without movement leaves history untouched and
//! a drag produces exactly one undo entry. Paint strokes push at press.

use crate::{
    foundation::core::{Point, Rgba8, Size, Vec2},
    geometry::handles::{Corner, HandleMetrics},
    geometry::placement::Placement,
    history::snapshot::{Snapshot, capture_or_warn},
    history::stack::History,
    interaction::hit::{PressTarget, resolve_press},
    scene::layer::{Layer, LayerId},
    scene::model::Scene,
    scene::paint::{Brush, BrushMode},
};

/// Active pointer tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Select,
    Paint,
    Erase,
}

/// Per-press inputs that come from the session rather than the scene.
#[derive(Clone, Copy, Debug)]
pub struct PointerContext {
    pub tool: Tool,
    pub brush_size: f64,
    pub brush_color: Rgba8,
    pub metrics: HandleMetrics,
}

impl PointerContext {
    fn brush(&self) -> Option<Brush> {
        let mode = match self.tool {
            Tool::Select => return None,
            Tool::Paint => BrushMode::Paint,
            Tool::Erase => BrushMode::Erase,
        };
        Some(Brush {
            color: self.brush_color,
            size: self.brush_size,
            mode,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureState {
    Idle,
    /// Press on empty canvas with the select tool; selection was cleared.
    Selecting,
    Dragging {
        target: LayerId,
        press: Point,
        origin: Point,
    },
    Resizing {
        target: LayerId,
        corner: Corner,
        press: Point,
        start: Placement,
    },
    Rotating {
        target: LayerId,
        /// Angle of the rotation handle in the layer's local frame.
        rest_angle: f64,
    },
    Painting {
        last: Point,
        brush: Brush,
    },
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Selecting => "selecting",
            GestureState::Dragging { .. } => "dragging",
            GestureState::Resizing { .. } => "resizing",
            GestureState::Rotating { .. } => "rotating",
            GestureState::Painting { .. } => "painting",
        }
    }
}

/// Request to open inline editing for a text layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEditRequest {
    pub id: LayerId,
    pub current: String,
}

#[derive(Debug)]
pub struct GestureController {
    state: GestureState,
    /// Pre-gesture snapshot and the history generation it was taken at.
    pending: Option<(u64, Snapshot)>,
    mutated: bool,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            pending: None,
            mutated: false,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Drop gesture-local state without touching the scene.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
        self.pending = None;
        self.mutated = false;
    }

    /// Start a gesture. Returns `true` when the scene changed visibly (selection).
    pub fn press(
        &mut self,
        scene: &mut Scene,
        history: &mut History,
        p: Point,
        ctx: &PointerContext,
    ) -> bool {
        if self.is_active() {
            self.release();
        }

        if let Some(brush) = ctx.brush() {
            if let Some(snap) = capture_or_warn(scene) {
                history.push(snap);
            }
            self.mutated = true;
            self.state = GestureState::Painting { last: p, brush };
            return false;
        }

        let target = resolve_press(scene, p, &ctx.metrics);
        tracing::debug!(?target, x = p.x, y = p.y, "press");
        match target {
            PressTarget::RotationHandle(id) => {
                let Some(layer) = scene.layer(id) else {
                    return false;
                };
                let handle = ctx.metrics.rotation_handle_local(&layer.placement);
                self.pending = capture_or_warn(scene).map(|snap| (history.generation(), snap));
                self.state = GestureState::Rotating {
                    target: id,
                    rest_angle: handle.y.atan2(handle.x),
                };
                false
            }
            PressTarget::Corner(id, corner) => {
                let Some(layer) = scene.layer(id) else {
                    return false;
                };
                self.pending = capture_or_warn(scene).map(|snap| (history.generation(), snap));
                self.state = GestureState::Resizing {
                    target: id,
                    corner,
                    press: p,
                    start: layer.placement,
                };
                false
            }
            PressTarget::Layer(id) => {
                let changed = scene.selected() != Some(id);
                scene.set_selection(Some(id));
                let origin = scene
                    .layer(id)
                    .map(|l| l.placement.center())
                    .unwrap_or(p);
                self.pending = capture_or_warn(scene).map(|snap| (history.generation(), snap));
                self.state = GestureState::Dragging {
                    target: id,
                    press: p,
                    origin,
                };
                changed
            }
            PressTarget::Empty => {
                let changed = scene.selected().is_some();
                scene.set_selection(None);
                self.state = GestureState::Selecting;
                changed
            }
        }
    }

    /// Continue the gesture. Returns `true` when the scene changed.
    pub fn move_to(&mut self, scene: &mut Scene, history: &mut History, p: Point) -> bool {
        match self.state.clone() {
            GestureState::Idle | GestureState::Selecting => false,
            GestureState::Dragging {
                target,
                press,
                origin,
            } => {
                let center = origin + (p - press);
                self.mutate(scene, history, target, |l| l.placement.set_center(center))
            }
            GestureState::Resizing {
                target,
                corner,
                press,
                start,
            } => {
                let canvas = scene.canvas().size();
                let next = resized(&start, corner, press, p, scene.min_size(), canvas);
                self.mutate(scene, history, target, |l| l.placement = next)
            }
            GestureState::Rotating { target, rest_angle } => {
                let Some(center) = scene.layer(target).map(|l| l.placement.center()) else {
                    return false;
                };
                let rotation = (p.y - center.y).atan2(p.x - center.x) - rest_angle;
                self.mutate(scene, history, target, |l| l.placement.rotation = rotation)
            }
            GestureState::Painting { last, brush } => {
                let touched = scene.paint_mut().stamp_segment(last, p, &brush);
                self.state = GestureState::Painting { last: p, brush };
                touched
            }
        }
    }

    /// End the gesture. Returns whether anything was mutated during it.
    pub fn release(&mut self) -> bool {
        let mutated = self.mutated;
        if self.is_active() {
            tracing::debug!(state = self.state.name(), mutated, "release");
        }
        self.cancel();
        mutated
    }

    /// Double-click: a text layer under the pointer asks for inline editing.
    pub fn double_click(&mut self, scene: &mut Scene, p: Point) -> Option<TextEditRequest> {
        self.cancel();
        let id = scene.hit_test(p)?;
        let text = scene.layer(id)?.content.text()?.text.clone();
        scene.set_selection(Some(id));
        Some(TextEditRequest { id, current: text })
    }

    fn mutate(
        &mut self,
        scene: &mut Scene,
        history: &mut History,
        target: LayerId,
        f: impl FnOnce(&mut Layer),
    ) -> bool {
        if !scene.contains_layer(target) {
            return false;
        }
        if !self.mutated {
            let snap = match self.pending.take() {
                Some((generation, snap)) if generation == history.generation() => Some(snap),
                Some(_) => {
                    tracing::debug!("history moved since press, recapturing gesture snapshot");
                    capture_or_warn(scene)
                }
                None => None,
            };
            if let Some(snap) = snap {
                history.push(snap);
            }
            self.mutated = true;
        }
        scene.update_layer(target, f)
    }
}

/// Corner resize in the layer's local frame; the opposite corner stays fixed.
pub(crate) fn resized(
    start: &Placement,
    corner: Corner,
    press: Point,
    p: Point,
    min_size: f64,
    canvas: Size,
) -> Placement {
    let delta = start.to_local(p) - start.to_local(press);
    let (sx, sy) = corner.signs();
    let width = (start.width + sx * delta.x)
        .min(canvas.width)
        .max(min_size);
    let height = (start.height + sy * delta.y)
        .min(canvas.height)
        .max(min_size);
    let shift = Vec2::new(
        sx * (width - start.width) / 2.0,
        sy * (height - start.height) / 2.0,
    );
    let mut out = *start;
    out.width = width;
    out.height = height;
    out.set_center(start.center() + start.rotate_vec(shift));
    out
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/gesture.rs"]
mod tests;
