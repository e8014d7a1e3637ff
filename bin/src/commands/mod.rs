//! CLI command implementations.

pub(crate) mod fetch;
pub(crate) mod info;
pub(crate) mod list;
pub(crate) mod status;
