//! CLI integration test modules

pub mod toml_config;
