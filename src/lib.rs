//! Maturity Model Site Generation
//!
//! The model is a directory tree of YAML records (business functions,
//! practices, streams, activities, ...). It is rendered into cross-linked
//! markdown pages for publishing.

pub mod domain;
pub use domain::{Config, Model, slug};

/// Filesystem loading and writing.
pub mod storage;
pub use storage::{Report, Site};
