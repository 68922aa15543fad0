pub(crate) mod analysis;
pub(crate) mod biquad;
pub(crate) mod buffer;
pub(crate) mod codec;
pub(crate) mod graph;
pub(crate) mod mixer;
pub(crate) mod voice;
