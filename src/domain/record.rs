//! The record types of the maturity model.
//!
//! Each record is deserialised from one YAML file. Records reference each
//! other only through [`Id`] values held in foreign-key fields; nothing here
//! checks that a referenced record exists.

use std::fmt;

use serde::Deserialize;

/// The identifier of a record.
///
/// Source files use either integers or strings. The two are never equal to
/// each other, so `1` and `"1"` identify different records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// A numeric identifier.
    Int(i64),
    /// A string identifier (typically a hex UUID in the published model).
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A record type stored in one of the model's collections.
pub trait Record: serde::de::DeserializeOwned + Send + Sync {
    /// The name of the top-level directory holding this collection.
    const COLLECTION: &'static str;

    /// The record's own identifier, if it has one.
    fn id(&self) -> Option<&Id>;
}

/// One of the three maturity levels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaturityLevel {
    /// Identifier.
    pub id: Id,
    /// The level number (1 to 3).
    pub number: u8,
}

/// The objective of a security practice at one maturity level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PracticeLevel {
    /// Identifier.
    pub id: Id,
    /// The [`MaturityLevel`] this objective belongs to.
    pub maturitylevel: Id,
    /// The owning [`SecurityPractice`].
    pub practice: Id,
    /// What the practice aims for at this level.
    pub objective: String,
}

/// A top-level business function (Governance, Design, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BusinessFunction {
    /// Identifier.
    pub id: Id,
    /// Display name.
    pub name: String,
    /// Markdown description.
    pub description: String,
}

/// A security practice within a business function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPractice {
    /// Identifier.
    pub id: Id,
    /// The owning [`BusinessFunction`].
    pub function: Id,
    /// Display name.
    pub name: String,
    /// Abbreviation used in file names (e.g. `SM`).
    pub short_name: String,
    /// Markdown description.
    pub long_description: String,
}

/// A stream of activities within a practice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Stream {
    /// Identifier.
    pub id: Id,
    /// The owning [`SecurityPractice`].
    pub practice: Id,
    /// Display name.
    pub name: String,
    /// Stream letter (`A`, `B`).
    pub letter: String,
}

/// An activity in a stream at one maturity level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Identifier.
    pub id: Id,
    /// The owning [`Stream`].
    pub stream: Id,
    /// The [`PracticeLevel`] of this activity.
    pub level: Id,
    /// What the organisation gains.
    pub benefit: String,
    /// One-line summary.
    pub short_description: String,
    /// Markdown description, possibly spanning several lines.
    pub long_description: String,
}

/// The assessment question for an activity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    /// Identifier, when the source provides one.
    #[serde(default)]
    pub id: Option<Id>,
    /// The [`Activity`] being assessed.
    pub activity: Id,
    /// The question itself.
    pub text: String,
    /// The [`AnswerSet`] offered for this question.
    pub answerset: Id,
    /// Quality criteria, in order.
    #[serde(default)]
    pub quality: Vec<String>,
}

/// The set of answers offered for a question.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerSet {
    /// Identifier.
    pub id: Id,
    /// The answers, in order.
    pub values: Vec<Answer>,
}

/// A single answer in an [`AnswerSet`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    /// The displayed answer.
    pub text: AnswerText,
}

/// The displayed text of an answer.
///
/// YAML allows `true`/`false` or a number where a label was intended, so the
/// raw scalar is kept and converted for display with
/// [`bool_label`](crate::domain::text::bool_label).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnswerText {
    /// A YAML boolean.
    Bool(bool),
    /// A YAML number.
    Number(serde_yaml::Number),
    /// Any string.
    Text(String),
}

macro_rules! record {
    ($ty:ty, $collection:literal) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> Option<&Id> {
                Some(&self.id)
            }
        }
    };
}

record!(MaturityLevel, "maturity_levels");
record!(PracticeLevel, "practice_levels");
record!(BusinessFunction, "business_functions");
record!(SecurityPractice, "security_practices");
record!(Stream, "streams");
record!(Activity, "activities");
record!(AnswerSet, "answer_sets");

impl Record for Question {
    const COLLECTION: &'static str = "questions";

    fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }
}
