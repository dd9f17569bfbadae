//! A filesystem backed site build
//!
//! The [`Site`] loads the model from an input directory and writes the
//! rendered pages to an output directory. Rendering itself is done by the
//! filesystem agnostic [`Assembler`].

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;

use crate::{
    domain::{
        document::{Assembler, Document, DocumentKind, Issue},
        model::{Model, ModelError},
        template::{RenderError, Templates},
    },
    storage::forest::{self, LoadError},
};

/// A site whose model has been loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    model: Model,
}

/// A site that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A site build from an input directory of YAML records.
#[derive(Debug)]
pub struct Site<S> {
    /// The root of the input directory.
    input: PathBuf,
    state: S,
}

impl Site<Unloaded> {
    /// A site reading from the given directory.
    #[must_use]
    pub const fn new(input: PathBuf) -> Self {
        Self {
            input,
            state: Unloaded,
        }
    }

    /// Load and interpret every record in the input directory.
    ///
    /// # Errors
    ///
    /// Fails if any file cannot be read or parsed, if a record does not have
    /// the shape of its collection, or if ids are duplicated within a
    /// collection. Nothing is generated from a partial model.
    #[instrument(skip(self), fields(input = %self.input.display()))]
    pub fn load(self) -> Result<Site<Loaded>, SiteLoadError> {
        let forest = forest::load(&self.input)?;
        let model = Model::from_forest(&forest)?;

        Ok(Site {
            input: self.input,
            state: Loaded { model },
        })
    }
}

impl Site<Loaded> {
    /// Render every page without writing anything.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn render(&self, templates: &Templates) -> Result<Vec<Document>, RenderError> {
        Assembler::new(&self.state.model, templates).assemble()
    }

    /// Render every page and write it below `output`.
    ///
    /// Output directories are created as needed. Unresolved references and
    /// pages sharing a path are reported in the returned [`Report`]; if
    /// `strict` is set they fail the build before anything is written. Of the
    /// pages sharing a path, only the first is written.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - a template references a variable that is never set
    /// - `strict` is set and any problem was found
    /// - any page cannot be written. This does *not* fail fast: every page is
    ///   attempted before the error is returned.
    #[instrument(skip(self, output, templates), fields(output = %output.display()))]
    pub fn publish(
        &self,
        output: &Path,
        templates: &Templates,
        strict: bool,
    ) -> Result<Report, PublishError> {
        let mut documents = self.render(templates)?;
        mark_collisions(&mut documents);

        let issues: Vec<_> = documents
            .iter()
            .flat_map(|document| {
                document
                    .issues
                    .iter()
                    .map(|issue| (document.path.clone(), issue.clone()))
            })
            .collect();
        for (path, issue) in &issues {
            tracing::warn!("{}: {issue}", path.display());
        }

        if strict {
            if let Some(issues) = NonEmpty::from_vec(issues.clone()) {
                return Err(PublishError::Strict(BuildIssues { issues }));
            }
        }

        let mut seen = HashSet::new();
        documents.retain(|document| seen.insert(document.path.clone()));

        for kind in DocumentKind::ALL {
            let dir = output.join(kind.directory());
            std::fs::create_dir_all(&dir).map_err(|e| WriteError {
                failures: NonEmpty::new((dir, e)),
            })?;
        }

        let failures: Vec<_> = documents
            .par_iter()
            .filter_map(|document| {
                let path = output.join(&document.path);
                write_document(&path, document).err().map(|e| (path, e))
            })
            .collect();
        if let Some(failures) = NonEmpty::from_vec(failures) {
            return Err(WriteError { failures }.into());
        }

        let mut written = BTreeMap::new();
        for document in &documents {
            *written.entry(document.kind).or_insert(0) += 1;
        }

        Ok(Report { written, issues })
    }
}

/// Record a [`Issue::PathCollision`] on every document whose path is shared
/// with another.
fn mark_collisions(documents: &mut [Document]) {
    let mut pages: HashMap<PathBuf, usize> = HashMap::new();
    for document in &*documents {
        *pages.entry(document.path.clone()).or_default() += 1;
    }
    for document in &mut *documents {
        if let Some(&pages) = pages.get(&document.path).filter(|&&n| n > 1) {
            document.issues.push(Issue::PathCollision { pages });
        }
    }
}

fn write_document(path: &Path, document: &Document) -> io::Result<()> {
    tracing::info!("Writing file: {}", path.display());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &document.content)
}

/// The outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Number of pages written, per kind.
    pub written: BTreeMap<DocumentKind, usize>,
    /// Every problem found, with the page it affects.
    pub issues: Vec<(PathBuf, Issue)>,
}

impl Report {
    /// Total number of pages written.
    #[must_use]
    pub fn total(&self) -> usize {
        self.written.values().sum()
    }

    /// Whether any placeholder was substituted, any value left blank or any
    /// page dropped.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Errors that can occur when loading a site.
#[derive(Debug, thiserror::Error)]
pub enum SiteLoadError {
    /// The input tree could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The records do not form a valid model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors that can occur when publishing a site.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A page could not be rendered.
    #[error("failed to render pages: {0}")]
    Render(#[from] RenderError),
    /// Strict mode found problems.
    #[error(transparent)]
    Strict(BuildIssues),
    /// Some pages could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}

const MAX_DISPLAY: usize = 5;

fn write_truncated<I>(f: &mut fmt::Formatter<'_>, total: usize, items: I) -> fmt::Result
where
    I: Iterator<Item = String>,
{
    let msg = items.take(MAX_DISPLAY).collect::<Vec<_>>().join(", ");

    if total <= MAX_DISPLAY {
        write!(f, "{msg}")
    } else {
        write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
    }
}

/// Problems found in strict mode.
#[derive(Debug, thiserror::Error)]
pub struct BuildIssues {
    issues: NonEmpty<(PathBuf, Issue)>,
}

impl BuildIssues {
    /// The issues, with the page each affects.
    pub fn iter(&self) -> impl Iterator<Item = &(PathBuf, Issue)> {
        self.issues.iter()
    }
}

impl fmt::Display for BuildIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problems found: ", self.issues.len())?;
        write_truncated(
            f,
            self.issues.len(),
            self.issues
                .iter()
                .map(|(path, issue)| format!("{} ({issue})", path.display())),
        )
    }
}

/// Pages that could not be written.
#[derive(Debug, thiserror::Error)]
pub struct WriteError {
    failures: NonEmpty<(PathBuf, io::Error)>,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to write pages: ")?;
        write_truncated(
            f,
            self.failures.len(),
            self.failures
                .iter()
                .map(|(path, e)| format!("{} ({e})", path.display())),
        )
    }
}
