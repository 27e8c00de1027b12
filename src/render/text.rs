//! Font resolution and text layout for text layers.
//!
//! Families are resolved through a `fontdb` database (system fonts plus anything
//! registered at runtime), then shaped with Parley. Resolved faces are cached per
//! family list.

use std::{borrow::Cow, collections::HashMap, path::Path, sync::Arc};

use crate::{
    foundation::core::Rgba8,
    foundation::error::{EditorError, EditorResult},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// A face resolved for a family list, registered with Parley and ready for vello.
pub(crate) struct ResolvedFace {
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) family_name: String,
}

impl std::fmt::Debug for ResolvedFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFace")
            .field("family_name", &self.family_name)
            .finish_non_exhaustive()
    }
}

/// Shaped text, positioned in a box of `box_width` starting at the origin.
pub(crate) struct TextBlock {
    pub(crate) layout: parley::Layout<TextBrush>,
    pub(crate) face: Arc<ResolvedFace>,
    pub(crate) box_width: f32,
}

impl TextBlock {
    pub(crate) fn height(&self) -> f32 {
        self.layout.height()
    }
}

pub(crate) struct TextEngine {
    db: usvg::fontdb::Database,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    faces: HashMap<String, Option<Arc<ResolvedFace>>>,
}

impl TextEngine {
    pub(crate) fn new(load_system_fonts: bool) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if load_system_fonts {
            db.load_system_fonts();
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self {
            db,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    pub(crate) fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Add font bytes (TTF/OTF/TTC) to the database.
    pub(crate) fn register_font(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
        self.faces.clear();
    }

    /// Load every `.ttf`/`.otf`/`.ttc` file directly inside `dir`.
    pub(crate) fn load_fonts_from_dir(&mut self, dir: &Path) {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            if let Err(err) = self.db.load_font_file(&path) {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable font");
            }
        }
        self.faces.clear();
    }

    /// Resolve a CSS-style family list to a face; any face is better than none.
    pub(crate) fn resolve(&mut self, family_list: &str) -> Option<Arc<ResolvedFace>> {
        if let Some(hit) = self.faces.get(family_list) {
            return hit.clone();
        }
        let resolved = self.resolve_uncached(family_list).map(Arc::new);
        if resolved.is_none() {
            tracing::warn!(family_list, "no font face available, text will not render");
        }
        self.faces
            .insert(family_list.to_string(), resolved.clone());
        resolved
    }

    fn resolve_uncached(&mut self, family_list: &str) -> Option<ResolvedFace> {
        use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

        let names: Vec<String> = family_list
            .split(',')
            .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" => Family::SansSerif,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                "monospace" => Family::Monospace,
                _ => Family::Name(name),
            })
            .collect();
        families.push(Family::SansSerif);

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        let (bytes, index) = self.db.with_face_data(id, |data, index| (data.to_vec(), index))?;

        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = registered.first().map(|(id, _)| *id)?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)?
            .to_string();

        Some(ResolvedFace {
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), index),
            family_name,
        })
    }

    /// Shape `text` word-wrapped to `box_width`. `Ok(None)` when no face is available.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        family_list: &str,
        size_px: f32,
        color: Rgba8,
        box_width: f32,
    ) -> EditorResult<Option<TextBlock>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(EditorError::validation(
                "text font size must be finite and > 0",
            ));
        }
        let Some(face) = self.resolve(family_list) else {
            return Ok(None);
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush::from(color)));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        let box_width = box_width.max(1.0);
        layout.break_all_lines(Some(box_width));
        layout.align(
            Some(box_width),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        Ok(Some(TextBlock {
            layout,
            face,
            box_width,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
