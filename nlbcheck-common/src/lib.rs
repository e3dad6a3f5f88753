//! # NLBCHECK Common Library
//!
//! Shared code for the nlbcheck tools including:
//! - Error types
//! - Configuration loading (TOML + environment)
//! - Data model for book rows, availability items and report records

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
