//! Scan integration test modules

pub mod orchestration;
