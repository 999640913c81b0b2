//! # Cellar Common Library
//!
//! Shared code for the wine-cellar backend:
//! - Error types
//! - Configuration loading
//! - Event types (CellarEvent enum) and EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
