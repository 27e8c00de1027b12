use super::*;

fn brush(mode: BrushMode, size: f64) -> Brush {
    Brush {
        color: Rgba8::rgb(255, 0, 0),
        size,
        mode,
    }
}

#[test]
fn paint_segment_covers_its_path_only() {
    let mut s = PaintSurface::new(40, 20, EraseMode::Strokes);
    assert!(s.is_blank());
    assert!(s.stamp_segment(
        Point::new(5.0, 10.0),
        Point::new(35.0, 10.0),
        &brush(BrushMode::Paint, 6.0)
    ));
    assert_eq!(s.pixel(20, 10), [255, 0, 0, 255]);
    assert_eq!(s.pixel(20, 1), [0, 0, 0, 0]);
    assert!(!s.is_blank());
}

#[test]
fn erase_clears_to_transparent_not_white() {
    let mut s = PaintSurface::new(20, 20, EraseMode::Strokes);
    s.stamp_segment(
        Point::new(2.0, 10.0),
        Point::new(18.0, 10.0),
        &brush(BrushMode::Paint, 8.0),
    );
    s.stamp_segment(
        Point::new(10.0, 2.0),
        Point::new(10.0, 18.0),
        &brush(BrushMode::Erase, 6.0),
    );
    assert_eq!(s.pixel(10, 10), [0, 0, 0, 0]);
    assert_eq!(s.pixel(3, 10)[3], 255);
    assert!(!s.has_knockout());
}

#[test]
fn knockout_mode_records_erase_coverage() {
    let mut s = PaintSurface::new(20, 20, EraseMode::Knockout);
    s.stamp_segment(
        Point::new(10.0, 10.0),
        Point::new(10.0, 10.0),
        &brush(BrushMode::Erase, 6.0),
    );
    assert!(s.has_knockout());
    assert_eq!(s.knockout()[10 * 20 + 10], 255);
    assert_eq!(s.knockout()[0], 0);
}

#[test]
fn segment_outside_surface_is_ignored() {
    let mut s = PaintSurface::new(10, 10, EraseMode::Strokes);
    assert!(!s.stamp_segment(
        Point::new(-50.0, -50.0),
        Point::new(-40.0, -40.0),
        &brush(BrushMode::Paint, 4.0)
    ));
    assert!(s.is_blank());
}

#[test]
fn png_round_trip_restores_pixels() {
    let mut s = PaintSurface::new(16, 16, EraseMode::Strokes);
    s.stamp_segment(
        Point::new(2.0, 2.0),
        Point::new(14.0, 13.0),
        &brush(BrushMode::Paint, 3.0),
    );
    let png = s.encode_png().unwrap();

    let mut t = PaintSurface::new(16, 16, EraseMode::Strokes);
    t.load_png(&png, None).unwrap();
    assert_eq!(t.pixels(), s.pixels());
}

#[test]
fn resize_keeps_overlap() {
    let mut s = PaintSurface::new(10, 10, EraseMode::Strokes);
    s.stamp_segment(
        Point::new(2.0, 2.0),
        Point::new(2.0, 2.0),
        &brush(BrushMode::Paint, 2.0),
    );
    let before = s.pixel(2, 2);
    s.resize(5, 20);
    assert_eq!((s.width(), s.height()), (5, 20));
    assert_eq!(s.pixel(2, 2), before);
    assert_eq!(s.pixels().len(), 5 * 20 * 4);
}

#[test]
fn inked_bounds_and_region_png() {
    let mut s = PaintSurface::new(30, 30, EraseMode::Strokes);
    assert_eq!(s.inked_bounds(), None);
    s.stamp_segment(
        Point::new(10.0, 12.0),
        Point::new(20.0, 12.0),
        &brush(BrushMode::Paint, 2.0),
    );
    let b = s.inked_bounds().unwrap();
    assert!(b.x0 <= 10 && b.x1 >= 20);
    assert!(b.y0 >= 9 && b.y1 <= 15);
    let png = s.encode_region_png(b).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (b.width(), b.height()));
}
