pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod store;
pub mod telemetry;
