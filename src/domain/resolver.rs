//! Foreign-key lookups across the model's collections.
//!
//! Lookups never fail. A reference that does not resolve comes back as
//! [`Resolved::Unresolved`] so callers can substitute a placeholder and record
//! the problem, instead of comparing against placeholder strings later.

use crate::domain::{
    model::{Collection, Model},
    record::{
        Activity, AnswerSet, BusinessFunction, Id, PracticeLevel, Question, Record,
        SecurityPractice, Stream,
    },
    slug,
};

/// The outcome of a many-to-one lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved<'a, T> {
    /// The referenced record.
    Found(&'a T),
    /// No record has the referenced id.
    Unresolved(&'a Id),
}

impl<T> Clone for Resolved<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Resolved<'_, T> {}

impl<'a, T> Resolved<'a, T> {
    /// The record, if one was found.
    #[must_use]
    pub const fn found(self) -> Option<&'a T> {
        match self {
            Self::Found(record) => Some(record),
            Self::Unresolved(_) => None,
        }
    }
}

impl<T: Record> Collection<T> {
    /// All records whose `foreign_key` equals `parent`, in collection order.
    ///
    /// Returns an empty list if nothing matches.
    #[must_use]
    pub fn children_of<'a>(&'a self, parent: &Id, foreign_key: fn(&T) -> &Id) -> Vec<&'a T> {
        self.iter()
            .filter(|record| foreign_key(record) == parent)
            .collect()
    }

    /// The record whose id is `id`.
    #[must_use]
    pub fn parent_of<'a>(&'a self, id: &'a Id) -> Resolved<'a, T> {
        self.get(id).map_or(Resolved::Unresolved(id), Resolved::Found)
    }
}

/// Display name and slug of a resolved or placeholder parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
}

impl Link {
    /// Placeholder for a business function that could not be resolved.
    pub const FUNCTION_NOT_FOUND: (&'static str, &'static str) =
        ("Function Not Found", "function_not_found");

    /// Placeholder for a security practice that could not be resolved.
    pub const PRACTICE_NOT_FOUND: (&'static str, &'static str) =
        ("Practice Not Found", "practice_not_found");

    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug(name),
        }
    }

    fn placeholder((name, slug): (&str, &str)) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    /// The placeholder for a missing business function.
    #[must_use]
    pub fn function_not_found() -> Self {
        Self::placeholder(Self::FUNCTION_NOT_FOUND)
    }

    /// The placeholder for a missing security practice.
    #[must_use]
    pub fn practice_not_found() -> Self {
        Self::placeholder(Self::PRACTICE_NOT_FOUND)
    }

    /// The link for a business function, or its placeholder.
    #[must_use]
    pub fn function(function: Resolved<'_, BusinessFunction>) -> Self {
        function
            .found()
            .map_or_else(Self::function_not_found, |f| Self::named(&f.name))
    }

    /// The link for a security practice, or its placeholder.
    #[must_use]
    pub fn practice(practice: Resolved<'_, SecurityPractice>) -> Self {
        practice
            .found()
            .map_or_else(Self::practice_not_found, |p| Self::named(&p.name))
    }
}

/// Relationship queries over a [`Model`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    model: &'a Model,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over `model`.
    #[must_use]
    pub const fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// The model being queried.
    #[must_use]
    pub const fn model(self) -> &'a Model {
        self.model
    }

    /// Security practices belonging to a business function.
    #[must_use]
    pub fn practices_of(self, function: &BusinessFunction) -> Vec<&'a SecurityPractice> {
        self.model
            .security_practices
            .children_of(&function.id, |p| &p.function)
    }

    /// The business function a practice belongs to.
    #[must_use]
    pub fn function_of(self, practice: &'a SecurityPractice) -> Resolved<'a, BusinessFunction> {
        self.model.business_functions.parent_of(&practice.function)
    }

    /// Maturity-level objectives of a practice.
    #[must_use]
    pub fn levels_of(self, practice: &SecurityPractice) -> Vec<&'a PracticeLevel> {
        self.model
            .practice_levels
            .children_of(&practice.id, |l| &l.practice)
    }

    /// Streams belonging to a practice.
    #[must_use]
    pub fn streams_of(self, practice: &SecurityPractice) -> Vec<&'a Stream> {
        self.model.streams.children_of(&practice.id, |s| &s.practice)
    }

    /// The practice a stream belongs to.
    #[must_use]
    pub fn practice_of(self, stream: &'a Stream) -> Resolved<'a, SecurityPractice> {
        self.model.security_practices.parent_of(&stream.practice)
    }

    /// Activities belonging to a stream.
    #[must_use]
    pub fn activities_of(self, stream: &Stream) -> Vec<&'a Activity> {
        self.model.activities.children_of(&stream.id, |a| &a.stream)
    }

    /// The question assessing an activity.
    ///
    /// If several questions reference the same activity, the first in
    /// collection order wins.
    #[must_use]
    pub fn question_for(self, activity: &Activity) -> Option<&'a Question> {
        self.model
            .questions
            .iter()
            .find(|q| q.activity == activity.id)
    }

    /// The answer set offered for a question.
    #[must_use]
    pub fn answer_set_of(self, question: &'a Question) -> Resolved<'a, AnswerSet> {
        self.model.answer_sets.parent_of(&question.answerset)
    }

    /// The maturity level number (1 to 3) of a practice level.
    ///
    /// Returns `None` if either the practice level or its maturity level is
    /// missing.
    #[must_use]
    pub fn level_number(self, practice_level: &Id) -> Option<u8> {
        let level = self.model.practice_levels.get(practice_level)?;
        let maturity = self.model.maturity_levels.get(&level.maturitylevel)?;
        Some(maturity.number)
    }
}
