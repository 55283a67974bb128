//! Core services and infrastructure

pub mod error_handling;
pub mod logging;
pub mod polling;
pub mod shutdown;
pub mod styles;
pub mod validation;
pub mod version;
