pub mod config;
pub mod error;
pub mod roommates;
pub mod telemetry;
