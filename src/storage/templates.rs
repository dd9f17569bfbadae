//! Loading the template set from disk.
//!
//! A template directory only needs to contain the templates being overridden;
//! the rest come from the copies embedded in the binary.

use std::{io, path::{Path, PathBuf}};

use crate::domain::template::{Template, TemplateError, Templates};

/// Load the template set.
///
/// For each template, `<dir>/<template>.md` is used if `dir` is given and the
/// file exists. Otherwise the built-in template is used.
///
/// # Errors
///
/// Fails if an override file exists but cannot be read, or if any template
/// does not parse.
pub fn load_templates(dir: Option<&Path>) -> Result<Templates, TemplateLoadError> {
    Templates::try_from_fn(|kind| {
        let Some(dir) = dir else {
            return Template::parse(kind, kind.default_source()).map_err(TemplateLoadError::from);
        };

        let path = dir.join(kind.file_name());
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!("Loaded template from {}", path.display());
                Template::parse(kind, &source)
                    .map_err(|source| TemplateLoadError::Parse { path, source })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No template at {}, using the built-in {kind} template",
                    path.display()
                );
                Ok(Template::parse(kind, kind.default_source())?)
            }
            Err(source) => Err(TemplateLoadError::Io { path, source }),
        }
    })
}

/// Errors that can occur when loading templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateLoadError {
    /// An override file could not be read.
    #[error("failed to read template {}", path.display())]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// An override file is not a valid template.
    #[error("invalid template {}", path.display())]
    Parse {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: TemplateError,
    },
    /// A built-in template is not valid.
    #[error(transparent)]
    Builtin(#[from] TemplateError),
}
