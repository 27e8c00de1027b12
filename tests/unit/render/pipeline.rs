use super::*;
use crate::{
    foundation::core::{Canvas, Point, Rgba8},
    geometry::placement::Placement,
    scene::layer::LayerContent,
    scene::paint::{Brush, BrushMode, EraseMode},
};

fn compositor() -> Compositor {
    Compositor::new(false, 8)
}

fn scene(erase_mode: EraseMode) -> Scene {
    Scene::new(Canvas::new(120, 80).unwrap(), 20.0, erase_mode)
}

fn metrics() -> HandleMetrics {
    HandleMetrics {
        corner_hit: 8.0,
        corner_size: 12.0,
        rotate_offset: 24.0,
        rotate_radius: 6.0,
        rotate_hit: 8.0,
        dash: 6.0,
        outline_width: 2.0,
    }
}

#[test]
fn empty_scene_flattens_to_background() {
    let mut s = scene(EraseMode::Strokes);
    s.set_background_color(Rgba8::rgb(10, 20, 30));
    let frame = compositor().flatten(&s).unwrap();
    assert_eq!((frame.width, frame.height), (120, 80));
    assert_eq!(frame.pixel(0, 0), [10, 20, 30, 255]);
    assert_eq!(frame.pixel(119, 79), [10, 20, 30, 255]);
}

#[test]
fn half_opaque_red_rect_blends_with_white() {
    let mut s = scene(EraseMode::Strokes);
    let id = s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 60.0, 40.0),
        LayerContent::Rect {
            fill: Rgba8::rgb(255, 0, 0),
        },
    );
    s.update_layer(id, |l| l.opacity = 0.5);
    let frame = compositor().flatten(&s).unwrap();
    let [r, g, b, a] = frame.pixel(60, 40);
    assert_eq!(r, 255);
    assert!((i32::from(g) - 127).abs() <= 2, "g={g}");
    assert!((i32::from(b) - 127).abs() <= 2, "b={b}");
    assert_eq!(a, 255);
    assert_eq!(frame.pixel(5, 5), [255, 255, 255, 255]);
}

#[test]
fn later_layers_draw_on_top() {
    let mut s = scene(EraseMode::Strokes);
    s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 60.0, 40.0),
        LayerContent::Rect {
            fill: Rgba8::rgb(255, 0, 0),
        },
    );
    s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 30.0, 30.0),
        LayerContent::Circle {
            fill: Rgba8::rgb(0, 0, 255),
        },
    );
    let frame = compositor().flatten(&s).unwrap();
    assert_eq!(frame.pixel(60, 40), [0, 0, 255, 255]);
    assert_eq!(frame.pixel(34, 24), [255, 0, 0, 255]);
}

#[test]
fn star_covers_center_but_not_box_corners() {
    let mut s = scene(EraseMode::Strokes);
    s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 60.0, 60.0),
        LayerContent::Star {
            fill: Rgba8::BLACK,
        },
    );
    let frame = compositor().flatten(&s).unwrap();
    assert_eq!(frame.pixel(60, 40), [0, 0, 0, 255]);
    assert_eq!(frame.pixel(32, 12), [255, 255, 255, 255]);
}

#[test]
fn undecoded_images_are_skipped() {
    let mut s = scene(EraseMode::Strokes);
    s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 60.0, 40.0),
        LayerContent::Image(crate::scene::layer::ImageContent::new(
            crate::assets::source::ImageSource::linked("missing.png"),
        )),
    );
    let frame = compositor().flatten(&s).unwrap();
    assert_eq!(frame.pixel(60, 40), [255, 255, 255, 255]);
}

#[test]
fn paint_strokes_sit_above_layers() {
    let mut s = scene(EraseMode::Strokes);
    s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 100.0, 60.0),
        LayerContent::Rect {
            fill: Rgba8::rgb(255, 0, 0),
        },
    );
    let brush = Brush {
        color: Rgba8::rgb(0, 255, 0),
        size: 8.0,
        mode: BrushMode::Paint,
    };
    assert!(
        s.paint_mut()
            .stamp_segment(Point::new(40.0, 40.0), Point::new(80.0, 40.0), &brush)
    );
    let frame = compositor().flatten(&s).unwrap();
    assert_eq!(frame.pixel(60, 40), [0, 255, 0, 255]);
}

#[test]
fn knockout_erase_cuts_through_to_transparency() {
    let mut s = scene(EraseMode::Knockout);
    s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 100.0, 60.0),
        LayerContent::Rect {
            fill: Rgba8::rgb(255, 0, 0),
        },
    );
    let eraser = Brush {
        color: Rgba8::BLACK,
        size: 10.0,
        mode: BrushMode::Erase,
    };
    s.paint_mut()
        .stamp_segment(Point::new(40.0, 40.0), Point::new(80.0, 40.0), &eraser);
    let frame = compositor().flatten(&s).unwrap();
    assert_eq!(frame.pixel(60, 40)[3], 0);
    assert_eq!(frame.pixel(60, 20), [255, 0, 0, 255]);
}

#[test]
fn render_scales_to_target_and_draws_handles_only_in_preview() {
    let mut s = scene(EraseMode::Strokes);
    s.add_layer(
        Placement::new(Point::new(60.0, 40.0), 40.0, 20.0),
        LayerContent::Rect {
            fill: Rgba8::BLACK,
        },
    );
    let mut c = compositor();

    let mut plain = Frame::new(240, 160);
    c.render(&s, &mut plain, None).unwrap();
    assert_eq!((plain.width, plain.height), (240, 160));
    assert!(plain.pixel(120, 80)[..3].iter().all(|&c| c <= 2));
    assert!(plain.pixel(4, 4)[..3].iter().all(|&c| c >= 253));

    let mut preview = Frame::new(120, 80);
    c.render(&s, &mut preview, Some(&metrics())).unwrap();
    // Top-left corner square of the selection sits at (40, 30).
    let [r, g, b, _] = preview.pixel(40, 30);
    assert_eq!((r, g, b), (0x25, 0x63, 0xeb));
    // Rotation knob center 24px above the top edge.
    let [r, g, b, _] = preview.pixel(60, 6);
    assert_eq!((r, g, b), (0x25, 0x63, 0xeb));

    let export = c.flatten(&s).unwrap();
    assert_eq!(export.pixel(40, 30), [0, 0, 0, 255]);
    assert_eq!(export.pixel(60, 6), [255, 255, 255, 255]);
}

#[test]
fn export_encodes_png() {
    let s = scene(EraseMode::Strokes);
    let png = compositor()
        .export_flattened(&s, ExportFormat::Png)
        .unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}
