//! Loading a directory tree of YAML files.
//!
//! The [`Forest`] mirrors the directory structure: every sub-directory becomes
//! a nested [`Node::Directory`] keyed by its name, and every YAML file becomes
//! a [`Node::Record`] keyed by its name without the extension. Other files are
//! ignored.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use walkdir::WalkDir;

/// A loaded directory, keyed by entry name.
pub type Forest = BTreeMap<String, Node>;

/// One entry in a [`Forest`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A sub-directory.
    Directory(Forest),
    /// The parsed contents of a YAML file.
    Record(serde_yaml::Value),
}

/// Strip a `.yaml` or `.yml` extension.
///
/// Returns `None` for any other file name. Matching is case-sensitive.
#[must_use]
pub fn strip_yaml_extension(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(".yaml")
        .or_else(|| file_name.strip_suffix(".yml"))
}

/// Recursively load every YAML file under `root`.
///
/// Directory entries are visited in file-name order, so collection order is
/// the same on every platform. Files are parsed in parallel.
///
/// # Errors
///
/// Fails if a directory cannot be read, or if any YAML file cannot be read or
/// parsed. An empty YAML file is a parse error.
#[tracing::instrument(level = "debug")]
pub fn load(root: &Path) -> Result<Forest, LoadError> {
    let mut directories = Vec::new();
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| LoadError::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let Some(segments) = segments(relative) else {
            tracing::debug!("Skipping non UTF-8 path {}", entry.path().display());
            continue;
        };

        if entry.file_type().is_dir() {
            directories.push(segments);
        } else if let Some((name, parents)) = segments.split_last() {
            match strip_yaml_extension(name) {
                Some(stem) => {
                    let mut key = parents.to_vec();
                    key.push(stem.to_string());
                    files.push((key, entry.into_path()));
                }
                None => tracing::debug!("Ignoring {}", entry.path().display()),
            }
        }
    }

    let records = files
        .into_par_iter()
        .map(|(key, path)| read_record(&path).map(|value| (key, value)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut forest = Forest::new();
    for segments in directories {
        insert(&mut forest, &segments, None);
    }
    for (key, value) in records {
        insert(&mut forest, &key, Some(value));
    }

    tracing::debug!("Loaded {} top-level entries from {}", forest.len(), root.display());
    Ok(forest)
}

fn segments(relative: &Path) -> Option<Vec<String>> {
    relative
        .components()
        .map(|c| c.as_os_str().to_str().map(ToString::to_string))
        .collect()
}

fn read_record(path: &Path) -> Result<serde_yaml::Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if value.is_null() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(value)
}

/// Insert a directory (`value` is `None`) or a record at the given key path,
/// creating intermediate directories.
fn insert(forest: &mut Forest, key: &[String], value: Option<serde_yaml::Value>) {
    let Some((last, parents)) = key.split_last() else {
        return;
    };

    let mut current = forest;
    for segment in parents {
        let node = current
            .entry(segment.clone())
            .or_insert_with(|| Node::Directory(Forest::new()));
        // a file and a directory share a name; the directory wins
        if matches!(node, Node::Record(_)) {
            *node = Node::Directory(Forest::new());
        }
        current = match node {
            Node::Directory(children) => children,
            Node::Record(_) => return,
        };
    }

    match value {
        Some(value) => {
            if current.insert(last.clone(), Node::Record(value)).is_some() {
                tracing::warn!("'{}' is defined more than once", key.join("/"));
            }
        }
        None => {
            current
                .entry(last.clone())
                .or_insert_with(|| Node::Directory(Forest::new()));
        }
    }
}

/// Errors that can occur when loading the input tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A directory could not be traversed.
    #[error("failed to read directory {}", path.display())]
    Walk {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: walkdir::Error,
    },
    /// A file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A file is not valid YAML.
    #[error("failed to parse {}", path.display())]
    Parse {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: serde_yaml::Error,
    },
    /// A file contains no YAML document.
    #[error("{} is empty", .0.display())]
    Empty(PathBuf),
}
