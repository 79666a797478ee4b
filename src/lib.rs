//! Installation media preparation for the SAH node.
//!
//! Produces one of a formatted USB key, an ext3 image for iDRAC virtual media,
//! or a RHEL installer ISO with the kickstart embedded.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod iso;
pub mod kickstart;
pub mod utils;

pub use error::PrepError;
