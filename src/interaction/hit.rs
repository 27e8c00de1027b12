use crate::{
    foundation::core::Point,
    geometry::handles::{Corner, HandleMetrics},
    scene::layer::LayerId,
    scene::model::Scene,
};

/// What a select-tool press landed on, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressTarget {
    /// Rotation handle of the selected layer.
    RotationHandle(LayerId),
    /// Corner handle of the selected layer.
    Corner(LayerId, Corner),
    /// Body of the topmost layer under the pointer.
    Layer(LayerId),
    Empty,
}

/// Resolve a press: selected layer's handles first, then layers topmost-first.
pub fn resolve_press(scene: &Scene, p: Point, metrics: &HandleMetrics) -> PressTarget {
    if let Some(layer) = scene.selected_layer() {
        if metrics.hits_rotation_handle(&layer.placement, p) {
            return PressTarget::RotationHandle(layer.id);
        }
        if let Some(corner) = metrics.corner_at(&layer.placement, p) {
            return PressTarget::Corner(layer.id, corner);
        }
    }
    match scene.hit_test(p) {
        Some(id) => PressTarget::Layer(id),
        None => PressTarget::Empty,
    }
}
