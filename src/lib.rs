//! Stickerkit is a layer/scene editing engine for sticker and graphic composition.
//!
//! A single [`EditorSession`] owns the document: an ordered list of layers (images,
//! text, rect/circle/star shapes and committed freehand drawings), a background color
//! and optional cover-fit background image, and a freehand paint surface that is always
//! composited on top. Pointer input drives select/drag/resize/rotate/paint gestures,
//! every mutation is preceded by an undo snapshot, and the [`Compositor`] turns the
//! scene into premultiplied RGBA8 pixels for live preview or PNG/JPEG export.
//!
//! # Coordinates
//!
//! All layers are center-origin: `Placement { x, y }` is the layer center in canvas
//! pixels and `rotation` is in radians. Hit testing and rendering share the same
//! local frame (see [`Placement::to_local`]).
//!
//! # Async boundaries
//!
//! Image decoding goes through an [`AssetLoader`] and background removal through a
//! [`CutoutService`]. Both are submit-then-poll; [`EditorSession::pump`] applies
//! whatever has completed, discarding results whose target layer is gone.
//!
//! # Design constraints
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single owner**: no global state; everything hangs off one session value.
//! - **Premultiplied RGBA8** end-to-end: frames hold premultiplied pixels.
#![forbid(unsafe_code)]

mod assets;
mod foundation;
mod geometry;
mod history;
mod interaction;
mod render;
mod scene;
mod session;

pub use assets::cutout::{
    CutoutCompletion, CutoutReply, CutoutRequest, CutoutService, CutoutTicket,
};
pub use assets::decode::{DecodedImage, decode_image};
pub use assets::encode::{ExportFormat, encode_premul_rgba8};
pub use assets::loader::{
    AssetLoader, DecodeCompletion, DecodeJob, DecodeTicket, InlineLoader, SourceResolver,
    ThreadedLoader, normalize_rel_path,
};
pub use assets::source::ImageSource;
pub use foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, Size, Vec2};
pub use foundation::error::{EditorError, EditorResult};
pub use geometry::handles::{Corner, HandleMetrics};
pub use geometry::placement::Placement;
pub use history::snapshot::{PendingImage, Snapshot};
pub use history::stack::History;
pub use interaction::gesture::{
    GestureController, GestureState, PointerContext, TextEditRequest, Tool,
};
pub use interaction::hit::{PressTarget, resolve_press};
pub use render::pipeline::Compositor;
pub use render::surface::Frame;
pub use scene::layer::{ImageContent, Layer, LayerContent, LayerId, ShapeKind, TextContent};
pub use scene::model::{ReorderDirection, Scene};
pub use scene::paint::{Brush, BrushMode, EraseMode, PaintSurface, PixelBounds};
pub use session::config::{
    BrushConfig, ENV_DEVICE_PIXEL_RATIO, ENV_HISTORY_CAPACITY, EditorConfig, HandleConfig,
    ShapeDefaults, TextDefaults,
};
pub use session::editor::{EditorSession, ExportArtifact, Severity, Status};
