use super::*;

#[test]
fn flatten_transparent_returns_background() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0, 0, 0, 0], [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let src = [1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_half_alpha_mixes() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[128, 0, 0, 128], [0, 0, 255, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 127, 255]);
}

#[test]
fn odd_sizes_and_early_frames_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("o.webm"), 1_000_000));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: Fps::new(30, 1).unwrap(),
            audio: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ReelError::Validation(_) | ReelError::EncodingUnsupported(_)
    ));
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/out.webm");
    ensure_parent_dir(&path).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("out.webm")).unwrap();
}
