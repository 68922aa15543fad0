pub(crate) mod compositor;
pub(crate) mod overlay;
pub(crate) mod source;
pub(crate) mod surface;
pub(crate) mod text;
pub(crate) mod timeline;
