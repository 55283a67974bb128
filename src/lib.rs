pub mod app;
pub mod classifier;
pub mod client;
pub mod core;
pub mod report;
pub mod scan;
