//! # Session Shared
//! 
//! Shared constants, configuration, telemetry and utilities for the session workspace.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::AppError;
