use super::*;

fn scene() -> Scene {
    Scene::new(Canvas::new(400, 300).unwrap(), 20.0, EraseMode::Strokes)
}

fn rect_at(x: f64, y: f64) -> (Placement, LayerContent) {
    (
        Placement::new(Point::new(x, y), 100.0, 60.0),
        LayerContent::Rect {
            fill: Rgba8::rgb(255, 0, 0),
        },
    )
}

#[test]
fn add_appends_selects_and_never_reuses_ids() {
    let mut s = scene();
    let (p, c) = rect_at(100.0, 100.0);
    let a = s.add_layer(p, c.clone());
    assert_eq!(s.selected(), Some(a));
    let b = s.add_layer(p, c.clone());
    assert_eq!(s.selected(), Some(b));
    assert_eq!(s.layers().last().map(|l| l.id), Some(b));

    s.remove_layer(b);
    let c_id = s.add_layer(p, c);
    assert_ne!(c_id, b);
    assert_ne!(c_id, a);
}

#[test]
fn add_enforces_minimum_size() {
    let mut s = scene();
    let id = s.add_layer(
        Placement::new(Point::new(10.0, 10.0), 3.0, -5.0),
        LayerContent::Circle {
            fill: Rgba8::BLACK,
        },
    );
    let l = s.layer(id).unwrap();
    assert_eq!(l.placement.width, 20.0);
    assert_eq!(l.placement.height, 20.0);
}

#[test]
fn remove_and_update_are_noops_for_unknown_ids() {
    let mut s = scene();
    let (p, c) = rect_at(50.0, 50.0);
    let id = s.add_layer(p, c);
    assert!(s.remove_layer(LayerId(999)).is_none());
    assert!(!s.update_layer(LayerId(999), |l| l.opacity = 0.1));
    assert_eq!(s.layers().len(), 1);

    s.remove_layer(id);
    assert_eq!(s.selected(), None);
}

#[test]
fn update_keeps_identity_and_clamps() {
    let mut s = scene();
    let (p, c) = rect_at(50.0, 50.0);
    let id = s.add_layer(p, c);
    assert!(s.update_layer(id, |l| {
        l.id = LayerId(42);
        l.opacity = 3.0;
        l.placement.width = 1.0;
    }));
    let l = s.layer(id).unwrap();
    assert_eq!(l.opacity, 1.0);
    assert_eq!(l.placement.width, 20.0);
}

#[test]
fn reorder_swaps_adjacent_and_stops_at_ends() {
    let mut s = scene();
    let ids: Vec<_> = (0..3)
        .map(|i| {
            let (p, c) = rect_at(50.0 + f64::from(i), 50.0);
            s.add_layer(p, c)
        })
        .collect();
    assert!(!s.reorder(ids[2], ReorderDirection::Forward));
    assert!(!s.reorder(ids[0], ReorderDirection::Backward));
    assert!(s.reorder(ids[0], ReorderDirection::Forward));
    let order: Vec<_> = s.layers().iter().map(|l| l.id).collect();
    assert_eq!(order, vec![ids[1], ids[0], ids[2]]);
}

#[test]
fn hit_test_prefers_topmost() {
    let mut s = scene();
    let (p, c) = rect_at(100.0, 100.0);
    let bottom = s.add_layer(p, c.clone());
    let (p2, _) = rect_at(130.0, 110.0);
    let top = s.add_layer(p2, c);
    assert_eq!(s.hit_test(Point::new(120.0, 105.0)), Some(top));
    assert_eq!(s.hit_test(Point::new(60.0, 80.0)), Some(bottom));
    assert_eq!(s.hit_test(Point::new(390.0, 290.0)), None);

    s.reorder(top, ReorderDirection::Backward);
    assert_eq!(s.hit_test(Point::new(120.0, 105.0)), Some(bottom));
}

#[test]
fn selection_rejects_unknown_ids() {
    let mut s = scene();
    let (p, c) = rect_at(100.0, 100.0);
    let id = s.add_layer(p, c);
    assert!(!s.set_selection(Some(LayerId(77))));
    assert_eq!(s.selected(), Some(id));
    assert!(s.set_selection(None));
    assert_eq!(s.selected_layer(), None);
}

#[test]
fn clear_keeps_background_color() {
    let mut s = scene();
    s.set_background_color(Rgba8::rgb(1, 2, 3));
    let (p, c) = rect_at(100.0, 100.0);
    s.add_layer(p, c);
    s.clear();
    assert!(s.layers().is_empty());
    assert_eq!(s.selected(), None);
    assert_eq!(s.background_color(), Rgba8::rgb(1, 2, 3));
    assert!(s.paint().is_blank());
}

#[test]
fn resize_canvas_preserves_coordinates() {
    let mut s = scene();
    let (p, c) = rect_at(100.0, 100.0);
    let id = s.add_layer(p, c);
    s.resize_canvas(Canvas::new(800, 600).unwrap());
    assert_eq!(s.layer(id).unwrap().placement.center(), Point::new(100.0, 100.0));
    assert_eq!(s.paint().width(), 800);
}

#[test]
fn replace_document_advances_id_counter() {
    let mut s = scene();
    let (p, c) = rect_at(100.0, 100.0);
    let layers = vec![Layer {
        id: LayerId(50),
        placement: p,
        opacity: 1.0,
        content: c.clone(),
    }];
    s.replace_document(s.canvas(), Rgba8::WHITE, None, layers);
    let next = s.add_layer(p, c);
    assert!(next.0 > 50);
}
