//! Handlers for the two run modes.

mod download;
mod informations;

pub use download::run_download;
pub use informations::run_informations;
