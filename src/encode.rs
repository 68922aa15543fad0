pub(crate) mod ffmpeg;
pub(crate) mod output;
pub(crate) mod sink;
pub(crate) mod still;
