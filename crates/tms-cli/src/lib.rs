//! Library side of the `tms` command line tool.

pub mod logging;
pub mod pipeline;
pub mod profile;
pub mod store;
