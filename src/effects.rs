pub(crate) mod blur;
pub(crate) mod chroma_key;
pub(crate) mod composite;
pub(crate) mod filters;
pub(crate) mod fx;
