use std::sync::Arc;

use crate::{
    assets::decode::DecodedImage,
    assets::source::ImageSource,
    foundation::core::Rgba8,
    geometry::placement::Placement,
};

/// Session-unique layer identity; never reused within a session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An image source plus its decoded pixels, once the asset loader delivered them.
///
/// Equality and serialization only consider the source; pixels are a cache.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageContent {
    pub source: ImageSource,
    #[serde(skip)]
    pub pixels: Option<Arc<DecodedImage>>,
}

impl ImageContent {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            pixels: None,
        }
    }

    pub fn decoded(source: ImageSource, pixels: Arc<DecodedImage>) -> Self {
        Self {
            source,
            pixels: Some(pixels),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.pixels.is_some()
    }

    pub(crate) fn without_pixels(&self) -> Self {
        Self::new(self.source.clone())
    }
}

impl PartialEq for ImageContent {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextContent {
    pub text: String,
    pub font_size: f64,
    /// CSS-style family list, e.g. `"Poppins, Arial, sans-serif"`.
    pub font_family: String,
    pub fill: Rgba8,
}

/// Kind-specific payload of a layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    Image(ImageContent),
    Text(TextContent),
    Rect { fill: Rgba8 },
    Circle { fill: Rgba8 },
    Star { fill: Rgba8 },
    /// Rasterized freehand strokes committed from the paint surface.
    Drawing(ImageContent),
}

impl LayerContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerContent::Image(_) => "image",
            LayerContent::Text(_) => "text",
            LayerContent::Rect { .. } => "rect",
            LayerContent::Circle { .. } => "circle",
            LayerContent::Star { .. } => "star",
            LayerContent::Drawing(_) => "drawing",
        }
    }

    /// Image payload of `image` and `drawing` layers.
    pub fn image(&self) -> Option<&ImageContent> {
        match self {
            LayerContent::Image(img) | LayerContent::Drawing(img) => Some(img),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageContent> {
        match self {
            LayerContent::Image(img) | LayerContent::Drawing(img) => Some(img),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextContent> {
        match self {
            LayerContent::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextContent> {
        match self {
            LayerContent::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Fill color of text and vector shapes.
    pub fn fill_mut(&mut self) -> Option<&mut Rgba8> {
        match self {
            LayerContent::Text(t) => Some(&mut t.fill),
            LayerContent::Rect { fill }
            | LayerContent::Circle { fill }
            | LayerContent::Star { fill } => Some(fill),
            LayerContent::Image(_) | LayerContent::Drawing(_) => None,
        }
    }
}

/// Vector shapes offered by the shape buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rect,
    Circle,
    Star,
}

impl ShapeKind {
    pub fn content(self, fill: Rgba8) -> LayerContent {
        match self {
            ShapeKind::Rect => LayerContent::Rect { fill },
            ShapeKind::Circle => LayerContent::Circle { fill },
            ShapeKind::Star => LayerContent::Star { fill },
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// One placed visual element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub placement: Placement,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub content: LayerContent,
}

impl Layer {
    pub fn kind_name(&self) -> &'static str {
        self.content.kind_name()
    }

    pub(crate) fn without_pixels(&self) -> Self {
        let mut out = self.clone();
        if let Some(img) = out.content.image_mut() {
            *img = img.without_pixels();
        }
        out
    }
}
