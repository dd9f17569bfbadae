//! The in-memory relational model.
//!
//! The [`Model`] knows nothing about the filesystem. It is assembled once from
//! a loaded [`Forest`] and is read-only afterwards.

use std::collections::HashMap;

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::{
    domain::record::{
        Activity, AnswerSet, BusinessFunction, Id, MaturityLevel, PracticeLevel, Question, Record,
        SecurityPractice, Stream,
    },
    storage::forest::{Forest, Node},
};

/// The records of one type, in collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    /// `(key, record)` pairs, where the key is the file name without extension.
    records: Vec<(String, T)>,

    /// An index from record id to position in `records`.
    index: HashMap<Id, usize>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Build a collection from `(key, record)` pairs.
    ///
    /// # Errors
    ///
    /// Fails if two records share an id.
    pub fn from_records(records: Vec<(String, T)>) -> Result<Self, ModelError> {
        let mut index: HashMap<Id, usize> = HashMap::with_capacity(records.len());
        for (position, (key, record)) in records.iter().enumerate() {
            let Some(id) = record.id() else {
                continue;
            };
            if let Some(&first) = index.get(id) {
                return Err(ModelError::DuplicateId {
                    collection: T::COLLECTION,
                    id: id.clone(),
                    first: records
                        .get(first)
                        .map(|(first_key, _)| first_key.clone())
                        .unwrap_or_default(),
                    second: key.clone(),
                });
            }
            index.insert(id.clone(), position);
        }
        Ok(Self { records, index })
    }

    fn from_forest(forest: &Forest) -> Result<Self, ModelError> {
        let Some(node) = forest.get(T::COLLECTION) else {
            tracing::warn!("No '{}' collection found, treating it as empty", T::COLLECTION);
            return Ok(Self::default());
        };
        let Node::Directory(entries) = node else {
            return Err(ModelError::NotADirectory(T::COLLECTION));
        };

        let mut records = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            match entry {
                Node::Record(value) => {
                    let record = serde_yaml::from_value(value.clone()).map_err(|source| {
                        ModelError::Record {
                            collection: T::COLLECTION,
                            key: key.clone(),
                            source,
                        }
                    })?;
                    records.push((key.clone(), record));
                }
                Node::Directory(_) => {
                    tracing::debug!("Ignoring nested directory '{}/{key}'", T::COLLECTION);
                }
            }
        }

        Self::from_records(records)
    }
}

impl<T> Collection<T> {
    /// Iterate over the records in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter().map(|(_, record)| record)
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by its own id.
    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&T> {
        self.index
            .get(id)
            .and_then(|&position| self.records.get(position))
            .map(|(_, record)| record)
    }
}

impl<T: Sync> Collection<T> {
    /// Iterate over the records in parallel, preserving collection order
    /// when collected.
    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = &T> {
        self.records.par_iter().map(|(_, record)| record)
    }
}

/// The eight collections of the maturity model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Maturity levels 1 to 3.
    pub maturity_levels: Collection<MaturityLevel>,
    /// Per-practice objectives for each maturity level.
    pub practice_levels: Collection<PracticeLevel>,
    /// Business functions.
    pub business_functions: Collection<BusinessFunction>,
    /// Security practices.
    pub security_practices: Collection<SecurityPractice>,
    /// Streams.
    pub streams: Collection<Stream>,
    /// Activities.
    pub activities: Collection<Activity>,
    /// Assessment questions.
    pub questions: Collection<Question>,
    /// Answer sets.
    pub answer_sets: Collection<AnswerSet>,
}

impl Model {
    /// Interpret a loaded forest as the eight model collections.
    ///
    /// Collections are looked up by top-level directory name. A missing
    /// collection is treated as empty.
    ///
    /// # Errors
    ///
    /// Fails if a record does not have the shape of its collection, or if two
    /// records in a collection share an id.
    pub fn from_forest(forest: &Forest) -> Result<Self, ModelError> {
        let model = Self {
            maturity_levels: Collection::from_forest(forest)?,
            practice_levels: Collection::from_forest(forest)?,
            business_functions: Collection::from_forest(forest)?,
            security_practices: Collection::from_forest(forest)?,
            streams: Collection::from_forest(forest)?,
            activities: Collection::from_forest(forest)?,
            questions: Collection::from_forest(forest)?,
            answer_sets: Collection::from_forest(forest)?,
        };

        tracing::debug!(
            business_functions = model.business_functions.len(),
            security_practices = model.security_practices.len(),
            streams = model.streams.len(),
            activities = model.activities.len(),
            questions = model.questions.len(),
            "Assembled model"
        );

        Ok(model)
    }
}

/// Errors raised while interpreting the forest as a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A record could not be deserialised into its collection's type.
    #[error("invalid record '{collection}/{key}'")]
    Record {
        /// The collection name.
        collection: &'static str,
        /// The record's key.
        key: String,
        /// The underlying error.
        source: serde_yaml::Error,
    },
    /// Two records in one collection share an id.
    #[error("duplicate id '{id}' in '{collection}' (records '{first}' and '{second}')")]
    DuplicateId {
        /// The collection name.
        collection: &'static str,
        /// The repeated id.
        id: Id,
        /// The key of the first record with this id.
        first: String,
        /// The key of the second record with this id.
        second: String,
    },
    /// A collection name refers to a file rather than a directory.
    #[error("'{0}' must be a directory of records")]
    NotADirectory(&'static str),
}
