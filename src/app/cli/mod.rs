//! CLI module: arguments, configuration file and output formatting

pub mod args;
pub mod config;
pub mod display;
pub mod validation;

#[cfg(test)]
mod tests;
