//! Assembly of the generated pages.
//!
//! There are three passes, one per page kind. Each is a pure function of the
//! [`Model`] and the [`Templates`]: it resolves the related records, formats
//! them into template variables and renders one [`Document`] per driving
//! record. Pages never depend on each other, so records are rendered in
//! parallel.
//!
//! References that do not resolve are replaced by placeholders and recorded
//! as [`Issue`]s on the affected document rather than aborting the run.

use std::{fmt, path::PathBuf};

use rayon::iter::ParallelIterator;

use crate::domain::{
    model::Model,
    record::{
        Activity, BusinessFunction, Id, Question, Record, SecurityPractice, Stream,
    },
    resolver::{Link, Resolved, Resolver},
    slug,
    template::{RenderError, TemplateKind, Templates, Vars},
    text::bool_label,
};

/// Nesting depth of multi-line values within a stream level section.
const LEVEL_DETAIL_DEPTH: usize = 3;

/// The kind of a generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    /// `<function>.md`
    BusinessFunction,
    /// `practice/<function>-<practice>.md`
    SecurityPractice,
    /// `practice/stream/<function>-<practice>-<letter>.md`
    Stream,
}

impl DocumentKind {
    /// Every document kind, in generation order.
    pub const ALL: [Self; 3] = [Self::BusinessFunction, Self::SecurityPractice, Self::Stream];

    /// The directory (relative to the output root) holding pages of this kind.
    #[must_use]
    pub fn directory(self) -> PathBuf {
        match self {
            Self::BusinessFunction => PathBuf::new(),
            Self::SecurityPractice => PathBuf::from("practice"),
            Self::Stream => ["practice", "stream"].iter().collect(),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BusinessFunction => "business functions",
            Self::SecurityPractice => "security practices",
            Self::Stream => "streams",
        })
    }
}

/// A rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// What the page describes.
    pub kind: DocumentKind,
    /// The path of the page relative to the output root.
    pub path: PathBuf,
    /// The rendered markdown.
    pub content: String,
    /// Problems found while resolving the page's references.
    pub issues: Vec<Issue>,
}

/// A problem found while assembling a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A foreign key names a record that does not exist.
    UnresolvedReference {
        /// The collection of the record holding the foreign key.
        collection: &'static str,
        /// The foreign-key field.
        field: &'static str,
        /// The id that could not be found.
        id: Id,
    },
    /// The maturity level number of an activity could not be determined.
    MissingLevel {
        /// The activity.
        activity: Id,
        /// The activity's practice level.
        level: Id,
    },
    /// No question assesses an activity.
    MissingQuestion {
        /// The activity.
        activity: Id,
    },
    /// Several pages were rendered to the same path.
    ///
    /// Only the first in generation order is written.
    PathCollision {
        /// How many pages share the path.
        pages: usize,
    },
}

impl Issue {
    fn unresolved<T: Record>(field: &'static str, id: &Id) -> Self {
        Self::UnresolvedReference {
            collection: T::COLLECTION,
            field,
            id: id.clone(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedReference {
                collection,
                field,
                id,
            } => write!(f, "{collection}.{field} references unknown id '{id}'"),
            Self::MissingLevel { activity, level } => write!(
                f,
                "activity '{activity}' has no maturity level (practice level '{level}')"
            ),
            Self::MissingQuestion { activity } => {
                write!(f, "activity '{activity}' has no question")
            }
            Self::PathCollision { pages } => {
                write!(f, "{pages} pages share this path, only the first is written")
            }
        }
    }
}

/// Renders the pages of a model.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    resolver: Resolver<'a>,
    templates: &'a Templates,
}

impl<'a> Assembler<'a> {
    /// Create an assembler for `model` using `templates`.
    #[must_use]
    pub const fn new(model: &'a Model, templates: &'a Templates) -> Self {
        Self {
            resolver: Resolver::new(model),
            templates,
        }
    }

    const fn model(&self) -> &'a Model {
        self.resolver.model()
    }

    /// Render every page: business functions, then security practices, then
    /// streams. The three passes run concurrently.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn assemble(&self) -> Result<Vec<Document>, RenderError> {
        let (functions, (practices, streams)) = rayon::join(
            || self.business_functions(),
            || rayon::join(|| self.security_practices(), || self.streams()),
        );

        let mut documents = functions?;
        documents.extend(practices?);
        documents.extend(streams?);
        Ok(documents)
    }

    /// Render one page per business function.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn business_functions(&self) -> Result<Vec<Document>, RenderError> {
        self.model()
            .business_functions
            .par_iter()
            .map(|function| self.business_function(function))
            .collect()
    }

    /// Render the page of a business function.
    ///
    /// The page lists the function's practices, numbered from 1, as
    /// `practice_<n>` / `practice_<n>_url` front-matter entries.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn business_function(&self, function: &BusinessFunction) -> Result<Document, RenderError> {
        tracing::info!("Business function: {}", function.name);

        let practices: String = self
            .resolver
            .practices_of(function)
            .into_iter()
            .zip(1..)
            .map(|(practice, n)| {
                format!(
                    "practice_{n}: {}\npractice_{n}_url: {}\n",
                    practice.name,
                    slug(&practice.name)
                )
            })
            .collect();

        let function_slug = slug(&function.name);
        let vars = Vars::new()
            .inline("name", &function.name)
            .inline("slug", &function_slug)
            .inline("description", &function.description)
            .inline("practices", practices);

        Ok(Document {
            kind: DocumentKind::BusinessFunction,
            path: PathBuf::from(format!("{function_slug}.md")),
            content: self.templates.render(TemplateKind::BusinessFunction, &vars)?,
            issues: Vec::new(),
        })
    }

    /// Render one page per security practice.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn security_practices(&self) -> Result<Vec<Document>, RenderError> {
        self.model()
            .security_practices
            .par_iter()
            .map(|practice| self.security_practice(practice))
            .collect()
    }

    /// Render the page of a security practice.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn security_practice(
        &self,
        practice: &'a SecurityPractice,
    ) -> Result<Document, RenderError> {
        let mut issues = Vec::new();

        let function = self.resolver.function_of(practice);
        if let Resolved::Unresolved(id) = function {
            issues.push(Issue::unresolved::<SecurityPractice>("function", id));
        }
        let function = Link::function(function);

        let practice_levels: String = self
            .resolver
            .levels_of(practice)
            .into_iter()
            .zip(1..)
            .map(|(level, n)| format!("practice_maturity_{n}_description: {}\n", level.objective))
            .collect();

        let mut streams = String::new();
        for stream in self.resolver.streams_of(practice) {
            let mut activities = String::new();
            for activity in self.resolver.activities_of(stream) {
                let vars = Vars::new()
                    .inline("stream", &stream.letter)
                    .inline("maturity", self.level_number(activity, &mut issues))
                    .inline("description", &activity.short_description);
                activities.push_str(
                    &self
                        .templates
                        .render(TemplateKind::SecurityPracticeStreamActivity, &vars)?,
                );
                activities.push('\n');
            }

            let vars = Vars::new()
                .inline("name", &stream.name)
                .inline("letter", &stream.letter)
                .inline("activities", activities);
            streams.push_str(
                &self
                    .templates
                    .render(TemplateKind::SecurityPracticeStream, &vars)?,
            );
            streams.push('\n');
        }

        let vars = Vars::new()
            .inline("name", &practice.name)
            .inline("slug", slug(&practice.name))
            .inline("long_description", &practice.long_description)
            .inline("function_slug", &function.slug)
            .inline("function_name", &function.name)
            .inline("practice_levels", practice_levels)
            .inline("streams", streams);

        let file_name = format!("{}-{}.md", function.slug, slug(&practice.short_name));

        Ok(Document {
            kind: DocumentKind::SecurityPractice,
            path: DocumentKind::SecurityPractice.directory().join(file_name),
            content: self.templates.render(TemplateKind::SecurityPractice, &vars)?,
            issues,
        })
    }

    /// Render one page per stream.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn streams(&self) -> Result<Vec<Document>, RenderError> {
        self.model()
            .streams
            .par_iter()
            .map(|stream| self.stream(stream))
            .collect()
    }

    /// Render the page of a stream.
    ///
    /// The page has one section per activity in the stream, carrying the
    /// activity's assessment question, quality criteria and answers.
    ///
    /// # Errors
    ///
    /// Fails if a template references a variable that is never set.
    pub fn stream(&self, stream: &'a Stream) -> Result<Document, RenderError> {
        let mut issues = Vec::new();

        let (function, practice, short_name) = match self.resolver.practice_of(stream) {
            Resolved::Found(practice) => {
                let function = self.resolver.function_of(practice);
                if let Resolved::Unresolved(id) = function {
                    issues.push(Issue::unresolved::<SecurityPractice>("function", id));
                }
                (
                    Link::function(function),
                    Link::practice(Resolved::Found(practice)),
                    practice.short_name.clone(),
                )
            }
            Resolved::Unresolved(id) => {
                issues.push(Issue::unresolved::<Stream>("practice", id));
                let practice = Link::practice_not_found();
                let short_name = practice.slug.clone();
                (Link::function_not_found(), practice, short_name)
            }
        };

        let mut levels = String::new();
        for activity in self.resolver.activities_of(stream) {
            let vars = self.stream_level_vars(activity, &mut issues);
            levels.push_str(&self.templates.render(TemplateKind::StreamLevel, &vars)?);
            levels.push('\n');
        }

        let vars = Vars::new()
            .inline("name", &stream.name)
            .inline("function_slug", &function.slug)
            .inline("practice_slug", &practice.slug)
            .inline("letter", &stream.letter)
            .inline("function_name", &function.name)
            .inline("practice_name", &practice.name)
            .inline("levels", levels);

        let file_name = format!("{}-{short_name}-{}.md", function.slug, stream.letter);

        Ok(Document {
            kind: DocumentKind::Stream,
            path: DocumentKind::Stream.directory().join(file_name),
            content: self.templates.render(TemplateKind::Stream, &vars)?,
            issues,
        })
    }

    fn stream_level_vars(&self, activity: &Activity, issues: &mut Vec<Issue>) -> Vars {
        let (question, criteria, answers) = match self.resolver.question_for(activity) {
            Some(question) => (
                question.text.as_str(),
                criteria(question),
                self.answers(question, issues),
            ),
            None => {
                issues.push(Issue::MissingQuestion {
                    activity: activity.id.clone(),
                });
                ("", String::new(), String::new())
            }
        };

        Vars::new()
            .inline("benefit", &activity.benefit)
            .inline("number", self.level_number(activity, issues))
            .block(
                "long_description",
                &activity.long_description,
                LEVEL_DETAIL_DEPTH,
            )
            .inline("question", question)
            .block("criteria", criteria, LEVEL_DETAIL_DEPTH)
            .block("answers", answers, LEVEL_DETAIL_DEPTH)
    }

    fn answers(&self, question: &'a Question, issues: &mut Vec<Issue>) -> String {
        match self.resolver.answer_set_of(question) {
            Resolved::Found(answers) => answers
                .values
                .iter()
                .map(|answer| format!("- {}\n", bool_label(&answer.text)))
                .collect(),
            Resolved::Unresolved(id) => {
                issues.push(Issue::unresolved::<Question>("answerset", id));
                String::new()
            }
        }
    }

    /// The activity's maturity level number, or an empty string (recording
    /// an issue) if it cannot be determined.
    fn level_number(&self, activity: &Activity, issues: &mut Vec<Issue>) -> String {
        self.resolver
            .level_number(&activity.level)
            .map_or_else(
                || {
                    issues.push(Issue::MissingLevel {
                        activity: activity.id.clone(),
                        level: activity.level.clone(),
                    });
                    String::new()
                },
                |number| number.to_string(),
            )
    }
}

fn criteria(question: &Question) -> String {
    question
        .quality
        .iter()
        .map(|criterion| format!("- {criterion}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        model::Collection,
        record::{Answer, AnswerSet, AnswerText, MaturityLevel, PracticeLevel},
        template::{Template, TemplateKind},
    };

    fn collection<T: Record>(records: Vec<T>) -> Collection<T> {
        Collection::from_records(
            records
                .into_iter()
                .enumerate()
                .map(|(i, r)| (format!("r{i}"), r))
                .collect(),
        )
        .unwrap()
    }

    /// Minimal templates that expose every variable, so tests can assert on
    /// exact output.
    fn templates() -> Templates {
        Templates::try_from_fn(|kind| {
            let source = match kind {
                TemplateKind::BusinessFunction => "{name}|{slug}|{description}\n{practices}",
                TemplateKind::SecurityPractice => {
                    "{name}|{slug}|{function_name}|{function_slug}\n{practice_levels}{streams}"
                }
                TemplateKind::SecurityPracticeStream => "[{letter} {name}]\n{activities}",
                TemplateKind::SecurityPracticeStreamActivity => "{stream}{maturity} {description}",
                TemplateKind::Stream => {
                    "{name}|{letter}|{function_name}|{function_slug}|{practice_name}|{practice_slug}\n{levels}"
                }
                TemplateKind::StreamLevel => {
                    "L{number} {benefit}\n  {long_description}\n  Q {question}\n  {criteria}\n  {answers}"
                }
            };
            Template::parse(kind, source)
        })
        .unwrap()
    }

    fn model() -> Model {
        Model {
            maturity_levels: collection(vec![MaturityLevel {
                id: "m1".into(),
                number: 1,
            }]),
            practice_levels: collection(vec![PracticeLevel {
                id: "pl1".into(),
                maturitylevel: "m1".into(),
                practice: "sp1".into(),
                objective: "Know your risks".to_string(),
            }]),
            business_functions: collection(vec![BusinessFunction {
                id: "bf1".into(),
                name: "Governance".to_string(),
                description: "Processes & activities".to_string(),
            }]),
            security_practices: collection(vec![SecurityPractice {
                id: "sp1".into(),
                function: "bf1".into(),
                name: "Strategy & Metrics".to_string(),
                short_name: "SM".to_string(),
                long_description: "Long".to_string(),
            }]),
            streams: collection(vec![Stream {
                id: "st1".into(),
                practice: "sp1".into(),
                name: "Create and Promote".to_string(),
                letter: "A".to_string(),
            }]),
            activities: collection(vec![Activity {
                id: "a1".into(),
                stream: "st1".into(),
                level: "pl1".into(),
                benefit: "Shared view".to_string(),
                short_description: "Identify drivers".to_string(),
                long_description: "First line\nSecond line".to_string(),
            }]),
            questions: collection(vec![Question {
                id: None,
                activity: "a1".into(),
                text: "Do you?".to_string(),
                answerset: "as1".into(),
                quality: vec!["Reviewed".to_string(), "Agreed".to_string()],
            }]),
            answer_sets: collection(vec![AnswerSet {
                id: "as1".into(),
                values: vec![
                    Answer {
                        text: AnswerText::Bool(false),
                    },
                    Answer {
                        text: AnswerText::Text("Partially".to_string()),
                    },
                    Answer {
                        text: AnswerText::Bool(true),
                    },
                ],
            }]),
        }
    }

    #[test]
    fn business_function_lists_its_practices() {
        let model = model();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.business_functions().unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].path, PathBuf::from("governance.md"));
        assert_eq!(
            documents[0].content,
            "Governance|governance|Processes & activities\n\
             practice_1: Strategy & Metrics\npractice_1_url: strategy-and-metrics\n"
        );
        assert!(documents[0].issues.is_empty());
    }

    #[test]
    fn business_function_without_practices_still_renders() {
        let mut model = model();
        model.security_practices = Collection::default();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.business_functions().unwrap();

        assert_eq!(
            documents[0].content,
            "Governance|governance|Processes & activities\n"
        );
    }

    #[test]
    fn security_practice_nests_streams_and_activities() {
        let model = model();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.security_practices().unwrap();

        assert_eq!(documents[0].path, PathBuf::from("practice/governance-sm.md"));
        assert_eq!(
            documents[0].content,
            "Strategy & Metrics|strategy-and-metrics|Governance|governance\n\
             practice_maturity_1_description: Know your risks\n\
             [A Create and Promote]\nA1 Identify drivers\n\n"
        );
    }

    #[test]
    fn stream_renders_question_criteria_and_answers() {
        let model = model();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.streams().unwrap();

        assert_eq!(
            documents[0].path,
            PathBuf::from("practice/stream/governance-SM-A.md")
        );
        let indent = " ".repeat(12);
        assert_eq!(
            documents[0].content,
            format!(
                "Create and Promote|A|Governance|governance|Strategy & Metrics|strategy-and-metrics\n\
                 L1 Shared view\n  First line\n{indent}Second line\n  Q Do you?\n  \
                 - Reviewed\n{indent}- Agreed\n{indent}\n  - No\n{indent}- Partially\n{indent}- Yes\n{indent}\n"
            )
        );
        assert!(documents[0].issues.is_empty());
    }

    #[test]
    fn unresolved_function_uses_placeholder() {
        let mut model = model();
        model.business_functions = Collection::default();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.security_practices().unwrap();

        assert_eq!(
            documents[0].path,
            PathBuf::from("practice/function_not_found-sm.md")
        );
        assert!(
            documents[0]
                .content
                .starts_with("Strategy & Metrics|strategy-and-metrics|Function Not Found|function_not_found\n")
        );
        assert_eq!(
            documents[0].issues,
            vec![Issue::UnresolvedReference {
                collection: "security_practices",
                field: "function",
                id: "bf1".into(),
            }]
        );
    }

    #[test]
    fn unresolved_practice_uses_placeholders_at_both_levels() {
        let mut model = model();
        model.security_practices = Collection::default();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.streams().unwrap();

        assert_eq!(
            documents[0].path,
            PathBuf::from("practice/stream/function_not_found-practice_not_found-A.md")
        );
        assert!(documents[0].content.starts_with(
            "Create and Promote|A|Function Not Found|function_not_found|Practice Not Found|practice_not_found\n"
        ));
        assert_eq!(
            documents[0].issues,
            vec![Issue::UnresolvedReference {
                collection: "streams",
                field: "practice",
                id: "sp1".into(),
            }]
        );
    }

    #[test]
    fn missing_level_is_recorded_and_left_blank() {
        let mut model = model();
        model.maturity_levels = Collection::default();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.security_practices().unwrap();

        assert!(documents[0].content.ends_with("A Identify drivers\n\n"));
        assert_eq!(
            documents[0].issues,
            vec![Issue::MissingLevel {
                activity: "a1".into(),
                level: "pl1".into(),
            }]
        );
    }

    #[test]
    fn missing_question_is_recorded() {
        let mut model = model();
        model.questions = Collection::default();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.streams().unwrap();

        assert_eq!(
            documents[0].issues,
            vec![Issue::MissingQuestion {
                activity: "a1".into()
            }]
        );
    }

    #[test]
    fn first_question_for_an_activity_wins() {
        let mut model = model();
        let mut second = model.questions.iter().next().unwrap().clone();
        second.text = "Second?".to_string();
        let first = model.questions.iter().next().unwrap().clone();
        model.questions = collection(vec![first, second]);
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let documents = assembler.streams().unwrap();

        assert!(documents[0].content.contains("Q Do you?"));
        assert!(!documents[0].content.contains("Second?"));
    }

    #[test]
    fn assemble_produces_one_document_per_record() {
        let model = model();
        let templates = templates();
        let assembler = Assembler::new(&model, &templates);

        let kinds: Vec<_> = assembler
            .assemble()
            .unwrap()
            .into_iter()
            .map(|d| d.kind)
            .collect();

        assert_eq!(kinds, DocumentKind::ALL);
    }
}
