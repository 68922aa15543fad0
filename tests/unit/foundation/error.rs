use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::media_decode("x")
            .to_string()
            .contains("media decode error:")
    );
    assert!(
        ReelError::encoding_unsupported("x")
            .to_string()
            .contains("encoding unsupported:")
    );
    assert!(
        ReelError::canvas_unavailable("x")
            .to_string()
            .contains("canvas unavailable:")
    );
    assert!(
        ReelError::audio_mix_degraded("x")
            .to_string()
            .contains("audio mix degraded:")
    );
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(ReelError::Cancelled.to_string(), "render cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_transient_failures_are_retryable() {
    assert!(ReelError::Cancelled.is_retryable());
    assert!(ReelError::timeout("decode").is_retryable());
    assert!(!ReelError::media_decode("bad file").is_retryable());
    assert!(!ReelError::canvas_unavailable("0x0").is_retryable());
}
