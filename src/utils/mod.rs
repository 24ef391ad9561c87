//! Utility modules for target and port input handling

pub mod file_input;
pub mod target_parser;
