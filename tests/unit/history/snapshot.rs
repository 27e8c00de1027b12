use std::sync::Arc;

use super::*;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::Point;
use crate::geometry::placement::Placement;
use crate::scene::layer::LayerContent;
use crate::scene::paint::{Brush, BrushMode, EraseMode};

fn scene() -> Scene {
    Scene::new(Canvas::new(64, 48).unwrap(), 20.0, EraseMode::Strokes)
}

fn fake_pixels() -> Arc<DecodedImage> {
    Arc::new(DecodedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![255, 255, 255, 255]),
        content_key: 1,
    })
}

#[test]
fn capture_strips_pixels_and_skips_blank_paint() {
    let mut s = scene();
    let source = ImageSource::embedded(vec![1, 2, 3]);
    s.add_layer(
        Placement::new(Point::new(20.0, 20.0), 30.0, 30.0),
        LayerContent::Image(ImageContent::decoded(source.clone(), fake_pixels())),
    );
    let snap = Snapshot::capture(&s).unwrap();
    assert!(!snap.has_paint());
    let img = snap.layers()[0].content.image().unwrap();
    assert_eq!(img.source, source);
    assert!(!img.is_ready());
    assert!(s.layers()[0].content.image().unwrap().is_ready());
}

#[test]
fn restore_replaces_state_and_reports_pending_decodes() {
    let mut s = scene();
    let bg = ImageSource::linked("bg.png");
    s.set_background_image(Some(ImageContent::new(bg.clone())));
    let id = s.add_layer(
        Placement::new(Point::new(20.0, 20.0), 30.0, 30.0),
        LayerContent::Image(ImageContent::decoded(
            ImageSource::embedded(vec![9]),
            fake_pixels(),
        )),
    );
    s.paint_mut().stamp_segment(
        Point::new(5.0, 5.0),
        Point::new(30.0, 30.0),
        &Brush {
            color: Rgba8::rgb(0, 0, 255),
            size: 4.0,
            mode: BrushMode::Paint,
        },
    );
    let snap = Snapshot::capture(&s).unwrap();
    assert!(snap.has_paint());
    let painted = s.paint().pixels().to_vec();

    s.clear();
    s.set_background_color(Rgba8::BLACK);
    let pending = snap.restore_into(&mut s).unwrap();

    assert_eq!(s.background_color(), Rgba8::WHITE);
    assert_eq!(s.layers().len(), 1);
    assert!(!s.layers()[0].content.image().unwrap().is_ready());
    assert_eq!(s.paint().pixels(), painted.as_slice());
    assert_eq!(
        pending,
        vec![
            PendingImage::Layer {
                id,
                source: ImageSource::embedded(vec![9]),
            },
            PendingImage::Background { source: bg },
        ]
    );
}

#[test]
fn restore_does_not_share_state_with_snapshot() {
    let mut s = scene();
    let id = s.add_layer(
        Placement::new(Point::new(20.0, 20.0), 30.0, 30.0),
        LayerContent::Star {
            fill: Rgba8::BLACK,
        },
    );
    let snap = Snapshot::capture(&s).unwrap();
    snap.restore_into(&mut s).unwrap();
    s.update_layer(id, |l| l.placement.x = 50.0);
    assert_eq!(snap.layers()[0].placement.x, 20.0);
}

#[test]
fn json_round_trip_and_validation() {
    let mut s = scene();
    s.add_layer(
        Placement::new(Point::new(20.0, 20.0), 30.0, 30.0),
        LayerContent::Text(crate::scene::layer::TextContent {
            text: "Hello".to_string(),
            font_size: 28.0,
            font_family: "sans-serif".to_string(),
            fill: Rgba8::rgb(17, 24, 39),
        }),
    );
    let snap = Snapshot::capture(&s).unwrap();
    let json = snap.to_json().unwrap();
    assert!(json.contains("\"kind\": \"text\""));
    assert_eq!(Snapshot::from_json(&json).unwrap(), snap);

    let bad = r##"{"canvas":{"width":0,"height":10},"background_color":"#ffffff"}"##;
    assert!(matches!(
        Snapshot::from_json(bad),
        Err(EditorError::Validation(_))
    ));
    assert!(matches!(
        Snapshot::from_json("{"),
        Err(EditorError::Serde(_))
    ));
}

#[test]
fn duplicate_layer_ids_are_rejected() {
    let doc = r##"{
        "canvas": {"width": 10, "height": 10},
        "background_color": "#ffffff",
        "layers": [
            {"id": 1, "placement": {"x": 1, "y": 1, "width": 20, "height": 20},
             "content": {"kind": "rect", "fill": "#000000"}},
            {"id": 1, "placement": {"x": 2, "y": 2, "width": 20, "height": 20},
             "content": {"kind": "circle", "fill": "#000000"}}
        ]
    }"##;
    let err = Snapshot::from_json(doc).unwrap_err();
    assert!(err.to_string().contains("duplicate layer id"));
}
