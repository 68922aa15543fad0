use std::time::{SystemTime, UNIX_EPOCH};

use crate::editor::state::CreationMode;

/// Mime type of rendered videos.
pub const WEBM_MIME: &str = "video/webm";
/// Mime type of rendered stills.
pub const PNG_MIME: &str = "image/png";

/// Encoded bytes plus their container mime type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedMedia {
    /// Container bytes.
    pub bytes: Vec<u8>,
    /// Container mime type.
    pub mime: String,
}

impl EncodedMedia {
    /// Wrap `bytes` of type `mime`.
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Wrap WebM bytes.
    pub fn webm(bytes: Vec<u8>) -> Self {
        Self::new(bytes, WEBM_MIME)
    }

    /// File extension matching the mime type, including the dot.
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime)
    }
}

/// Final artifact of a render, handed to the publish step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
    /// File name: `{edited|photo|text}-{unix ms}{ext}`.
    pub name: String,
    /// Container mime type.
    pub mime: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl OutputFile {
    /// Name `media` after the creation mode and the current wall-clock time.
    pub fn for_mode(mode: CreationMode, media: EncodedMedia) -> Self {
        Self::named(mode, media, unix_millis())
    }

    /// Name `media` after `mode` and an explicit timestamp.
    pub fn named(mode: CreationMode, media: EncodedMedia, unix_ms: u128) -> Self {
        let stem = match mode {
            CreationMode::Video => "edited",
            CreationMode::Photo => "photo",
            CreationMode::Text => "text",
        };
        let name = format!("{stem}-{unix_ms}{}", media.extension());
        Self {
            name,
            mime: media.mime,
            bytes: media.bytes,
        }
    }
}

pub(crate) fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => ".png",
        "video/mp4" => ".mp4",
        "image/jpeg" => ".jpg",
        _ => ".webm",
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/output.rs"]
mod tests;
