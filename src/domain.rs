//! Domain models for site generation.
//!
//! This module contains the filesystem agnostic parts: the record types and
//! the relational model built from them, reference resolution, templates and
//! page assembly.

mod config;
pub use config::{Config, ConfigError};

/// Page assembly.
pub mod document;
/// The typed model collections.
pub mod model;
pub use model::Model;
/// The record types.
pub mod record;
/// Foreign-key resolution.
pub mod resolver;
mod slug;
pub use slug::slug;
/// Templates and template variables.
pub mod template;
pub mod text;
