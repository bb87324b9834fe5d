//! # Beacon Common Library
//!
//! Shared code for the Beacon scoring engine:
//! - Common error type
//! - Configuration loading and credential resolution
//! - URL normalization helpers

pub mod config;
pub mod error;
pub mod urls;

pub use error::{Error, Result};
