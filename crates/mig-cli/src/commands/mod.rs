//! CLI command implementations

pub(crate) mod common;
pub mod create;
pub(crate) mod migrate;
pub(crate) mod scaffold;
pub(crate) mod status;
