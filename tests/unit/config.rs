use super::*;

#[test]
fn empty_json_yields_defaults() {
    let cfg: RenderConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, RenderConfig::default());
    assert_eq!(cfg.canvas, Canvas::PORTRAIT_1080);
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.video_bitrate, 5_000_000);
    assert_eq!(cfg.sticker_base_px, 64.0);
    assert_eq!(cfg.voiceover_gain, 0.8);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_overrides_single_fields() {
    let cfg: RenderConfig = serde_json::from_str(
        r#"{"canvas":{"width":108,"height":192},"source_fit":"cover","text_card":{"margin_px":10}}"#,
    )
    .unwrap();
    assert_eq!(cfg.canvas.width, 108);
    assert_eq!(cfg.source_fit, SourceFit::Cover);
    assert_eq!(cfg.text_card.margin_px, 10.0);
    assert_eq!(cfg.text_card.font_size_px, 64.0);
    cfg.validate().unwrap();
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<RenderConfig>(r#"{"fpz":30}"#).is_err());
}

#[test]
fn validate_rejects_bad_ranges() {
    let cfg = RenderConfig {
        fps: 0,
        ..RenderConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = RenderConfig {
        canvas: Canvas {
            width: 0,
            height: 0,
        },
        ..RenderConfig::default()
    };
    assert!(matches!(
        cfg.validate().unwrap_err(),
        ReelError::CanvasUnavailable(_)
    ));

    let mut cfg = RenderConfig::default();
    cfg.text_card.margin_px = 2000.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_json_file_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{"fps":24}"#).unwrap();
    let cfg = RenderConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.output_fps().unwrap().num, 24);

    std::fs::write(&path, r#"{"fps":"fast"}"#).unwrap();
    assert!(matches!(
        RenderConfig::from_json_file(&path).unwrap_err(),
        ReelError::Serde(_)
    ));
}
