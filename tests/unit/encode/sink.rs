use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 1,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
    }
}

fn frame(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![0; (w * h * 4) as usize],
        premultiplied: true,
    }
}

#[test]
fn frames_are_kept_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 1)).unwrap();
    let media = sink.end().unwrap();
    assert_eq!(media.mime, RAW_FRAMES_MIME);
    assert_eq!(sink.frames().len(), 2);
    assert!(sink.is_finished());
}

#[test]
fn out_of_order_and_duplicate_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &frame(2, 1)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(2, 1)).is_err());
    assert!(sink.push_frame(FrameIndex(1), &frame(2, 1)).is_err());
    assert_eq!(sink.frames().len(), 1);
}

#[test]
fn push_before_begin_and_size_mismatch_fail() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 1)).is_err());
    assert!(sink.end().is_err());
    sink.begin(cfg()).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &frame(4, 4)).is_err());
}
