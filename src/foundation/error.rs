/// Convenience result type used across reelkit.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by the render pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided editor state, configuration, or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A source media item or audio asset could not be decoded.
    #[error("media decode error: {0}")]
    MediaDecode(String),

    /// No output encoder or codec is available.
    #[error("encoding unsupported: {0}")]
    EncodingUnsupported(String),

    /// The output drawing surface could not be acquired.
    #[error("canvas unavailable: {0}")]
    CanvasUnavailable(String),

    /// Audio mixing failed and the unmixed video was kept.
    ///
    /// Never returned from [`crate::AudioMixer::mix`]; carried in its degraded outcome.
    #[error("audio mix degraded: {0}")]
    AudioMixDegraded(String),

    /// The encoder accepted the stream but failed while writing or finalizing it.
    #[error("encode error: {0}")]
    Encode(String),

    /// A render was cancelled through its [`crate::CancelToken`].
    #[error("render cancelled")]
    Cancelled,

    /// An external decode or mux step exceeded its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::MediaDecode`] value.
    pub fn media_decode(msg: impl Into<String>) -> Self {
        Self::MediaDecode(msg.into())
    }

    /// Build a [`ReelError::EncodingUnsupported`] value.
    pub fn encoding_unsupported(msg: impl Into<String>) -> Self {
        Self::EncodingUnsupported(msg.into())
    }

    /// Build a [`ReelError::CanvasUnavailable`] value.
    pub fn canvas_unavailable(msg: impl Into<String>) -> Self {
        Self::CanvasUnavailable(msg.into())
    }

    /// Build a [`ReelError::AudioMixDegraded`] value.
    pub fn audio_mix_degraded(msg: impl Into<String>) -> Self {
        Self::AudioMixDegraded(msg.into())
    }

    /// Build a [`ReelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Timeout`] value.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures the caller may retry with the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout(_) | Self::Encode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
