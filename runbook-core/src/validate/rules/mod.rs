pub(crate) mod automation;
pub(crate) mod branch;
pub(crate) mod command;
pub(crate) mod common;
pub(crate) mod step;
