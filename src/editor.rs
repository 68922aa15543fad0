pub(crate) mod autocut;
pub(crate) mod state;
