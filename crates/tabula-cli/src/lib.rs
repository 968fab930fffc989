//! Library side of the `tabula` command-line tool.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;
pub mod settings;
