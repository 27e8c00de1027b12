use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = EditorConfig::default();
    cfg.validate().unwrap();
    assert_eq!((cfg.canvas_width, cfg.canvas_height), (1000, 700));
    assert_eq!(cfg.history_capacity, 100);
    assert_eq!(cfg.text.font_size, 28.0);
    assert_eq!(cfg.erase_mode, EraseMode::Strokes);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = EditorConfig::from_json_str(
        r##"{ "canvas_width": 640, "brush": { "color": "#ff0000" }, "erase_mode": "knockout" }"##,
    )
    .unwrap();
    assert_eq!(cfg.canvas_width, 640);
    assert_eq!(cfg.canvas_height, 700);
    assert_eq!(cfg.brush.color, Rgba8::rgb(255, 0, 0));
    assert_eq!(cfg.brush.size, 6.0);
    assert_eq!(cfg.erase_mode, EraseMode::Knockout);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = EditorConfig::from_json_str("{ nope").unwrap_err();
    assert!(matches!(err, EditorError::Serde(_)));
}

#[test]
fn env_overrides_ignore_bad_values() {
    let cfg = EditorConfig::default().with_overrides_from(|k| match k {
        ENV_HISTORY_CAPACITY => Some("7".to_string()),
        ENV_DEVICE_PIXEL_RATIO => Some("-2".to_string()),
        _ => None,
    });
    assert_eq!(cfg.history_capacity, 7);
    assert_eq!(cfg.device_pixel_ratio, 1.0);

    let cfg = EditorConfig::default().with_overrides_from(|k| match k {
        ENV_HISTORY_CAPACITY => Some("0".to_string()),
        ENV_DEVICE_PIXEL_RATIO => Some("2".to_string()),
        _ => None,
    });
    assert_eq!(cfg.history_capacity, 100);
    assert_eq!(cfg.device_pixel_ratio, 2.0);
}

#[test]
fn validate_rejects_bad_values() {
    let mut cfg = EditorConfig::default();
    cfg.canvas_width = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = EditorConfig::default();
    cfg.canvas_width = 70_000;
    assert!(cfg.validate().is_err());

    let mut cfg = EditorConfig::default();
    cfg.jpeg_quality = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = EditorConfig::default();
    cfg.device_pixel_ratio = f64::NAN;
    assert!(cfg.validate().is_err());

    let mut cfg = EditorConfig::default();
    cfg.history_capacity = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn handle_metrics_scale_with_device_pixel_ratio() {
    let cfg = EditorConfig {
        device_pixel_ratio: 2.0,
        ..EditorConfig::default()
    };
    let m = cfg.handle_metrics();
    assert_eq!(m.corner_hit, 16.0);
    assert_eq!(m.rotate_offset, 48.0);
    assert_eq!(cfg.min_size_px(), 40.0);
}
