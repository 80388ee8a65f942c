//! # NTK Common Library
//!
//! Shared code for the NTK navigation toolkit crates:
//! - Error type
//! - Bootstrap configuration loading and resource path resolution
//! - Navigation settings model
//! - Event types (NtkEvent enum) and EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod settings;

pub use error::{Error, Result};
pub use settings::NavigationSettings;
