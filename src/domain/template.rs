//! Named markdown templates with `{placeholder}` substitution.
//!
//! Each [`TemplateKind`] accepts a fixed set of variables. Templates are
//! checked against that set when they are parsed, so a typo in a template
//! file is reported before any page is generated.
//!
//! Values are supplied as [`Fragment`]s. A [`Fragment::Block`] is multi-line
//! text placed at a nesting depth; it is re-indented on substitution so nested
//! markdown lists stay well-formed whatever line breaks the source text has.

use std::{collections::BTreeMap, fmt};

use crate::domain::text::reindent;

/// The six page and fragment templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKind {
    /// A business function page.
    BusinessFunction,
    /// A security practice page.
    SecurityPractice,
    /// One stream section within a practice page.
    SecurityPracticeStream,
    /// One activity line within a practice page's stream section.
    SecurityPracticeStreamActivity,
    /// A stream page.
    Stream,
    /// One maturity level section within a stream page.
    StreamLevel,
}

impl TemplateKind {
    /// Every template kind.
    pub const ALL: [Self; 6] = [
        Self::BusinessFunction,
        Self::SecurityPractice,
        Self::SecurityPracticeStream,
        Self::SecurityPracticeStreamActivity,
        Self::Stream,
        Self::StreamLevel,
    ];

    /// The template's name, which is also its file stem.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BusinessFunction => "business_function",
            Self::SecurityPractice => "security_practice",
            Self::SecurityPracticeStream => "security_practice_stream",
            Self::SecurityPracticeStreamActivity => "security_practice_stream_activity",
            Self::Stream => "stream",
            Self::StreamLevel => "stream_level",
        }
    }

    /// The template's file name.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.md", self.name())
    }

    /// The variables this template may reference.
    #[must_use]
    pub const fn variables(self) -> &'static [&'static str] {
        match self {
            Self::BusinessFunction => &["name", "slug", "description", "practices"],
            Self::SecurityPractice => &[
                "name",
                "slug",
                "long_description",
                "function_slug",
                "function_name",
                "practice_levels",
                "streams",
            ],
            Self::SecurityPracticeStream => &["name", "letter", "activities"],
            Self::SecurityPracticeStreamActivity => &["stream", "maturity", "description"],
            Self::Stream => &[
                "name",
                "function_slug",
                "practice_slug",
                "letter",
                "function_name",
                "practice_name",
                "levels",
            ],
            Self::StreamLevel => &[
                "benefit",
                "number",
                "long_description",
                "question",
                "criteria",
                "answers",
            ],
        }
    }

    /// The template shipped with this crate.
    #[must_use]
    pub const fn default_source(self) -> &'static str {
        match self {
            Self::BusinessFunction => include_str!("../../templates/business_function.md"),
            Self::SecurityPractice => include_str!("../../templates/security_practice.md"),
            Self::SecurityPracticeStream => {
                include_str!("../../templates/security_practice_stream.md")
            }
            Self::SecurityPracticeStreamActivity => {
                include_str!("../../templates/security_practice_stream_activity.md")
            }
            Self::Stream => include_str!("../../templates/stream.md"),
            Self::StreamLevel => include_str!("../../templates/stream_level.md"),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(&'static str),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    kind: TemplateKind,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template.
    ///
    /// `{name}` is replaced by the variable `name`; `{{` and `}}` are literal
    /// braces.
    ///
    /// # Errors
    ///
    /// Fails on an unmatched brace, an empty or malformed placeholder, or a
    /// variable that `kind` does not accept.
    pub fn parse(kind: TemplateKind, source: &str) -> Result<Self, TemplateError> {
        let syntax = |offset: usize, message: &'static str| TemplateError::Syntax {
            template: kind,
            offset,
            message,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, c)| c == '{').is_some() => literal.push('{'),
                '}' if chars.next_if(|&(_, c)| c == '}').is_some() => literal.push('}'),
                '}' => return Err(syntax(offset, "unmatched '}'")),
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, c)) if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
                            Some((at, _)) => {
                                return Err(syntax(at, "invalid character in placeholder"));
                            }
                            None => return Err(syntax(offset, "unclosed '{'")),
                        }
                    }
                    if name.is_empty() {
                        return Err(syntax(offset, "empty placeholder"));
                    }
                    let variable = kind
                        .variables()
                        .iter()
                        .find(|&&v| v == name)
                        .copied()
                        .ok_or_else(|| TemplateError::UnknownVariable {
                            template: kind,
                            variable: name.clone(),
                        })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(variable));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { kind, segments })
    }

    /// The kind of this template.
    #[must_use]
    pub const fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Substitute `vars` into the template.
    ///
    /// # Errors
    ///
    /// Fails if the template references a variable that `vars` does not set.
    pub fn render(&self, vars: &Vars) -> Result<String, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let fragment = vars.get(name).ok_or(RenderError::MissingVariable {
                        template: self.kind,
                        variable: *name,
                    })?;
                    fragment.write_to(&mut out);
                }
            }
        }
        Ok(out)
    }
}

/// A value substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Text placed as-is.
    Inline(String),
    /// Multi-line text nested `depth` levels deep.
    Block {
        /// The text.
        text: String,
        /// Nesting depth; every line after the first is indented to match.
        depth: usize,
    },
}

impl Fragment {
    fn write_to(&self, out: &mut String) {
        match self {
            Self::Inline(text) => out.push_str(text),
            Self::Block { text, depth } => out.push_str(&reindent(text, *depth)),
        }
    }
}

/// The variables for one template rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars(BTreeMap<&'static str, Fragment>);

impl Vars {
    /// An empty set of variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an inline variable.
    #[must_use]
    pub fn inline(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.0.insert(name, Fragment::Inline(value.to_string()));
        self
    }

    /// Set a nested block variable.
    #[must_use]
    pub fn block(mut self, name: &'static str, text: impl Into<String>, depth: usize) -> Self {
        self.0.insert(
            name,
            Fragment::Block {
                text: text.into(),
                depth,
            },
        );
        self
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Fragment> {
        self.0.get(name)
    }
}

/// The full set of templates used for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    business_function: Template,
    security_practice: Template,
    security_practice_stream: Template,
    security_practice_stream_activity: Template,
    stream: Template,
    stream_level: Template,
}

impl Templates {
    /// Build a template set, obtaining each template from `source`.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `source`.
    pub fn try_from_fn<E>(
        mut source: impl FnMut(TemplateKind) -> Result<Template, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            business_function: source(TemplateKind::BusinessFunction)?,
            security_practice: source(TemplateKind::SecurityPractice)?,
            security_practice_stream: source(TemplateKind::SecurityPracticeStream)?,
            security_practice_stream_activity: source(
                TemplateKind::SecurityPracticeStreamActivity,
            )?,
            stream: source(TemplateKind::Stream)?,
            stream_level: source(TemplateKind::StreamLevel)?,
        })
    }

    /// The templates shipped with this crate.
    ///
    /// # Errors
    ///
    /// Fails only if a shipped template is malformed.
    pub fn embedded() -> Result<Self, TemplateError> {
        Self::try_from_fn(|kind| Template::parse(kind, kind.default_source()))
    }

    /// The template of the given kind.
    #[must_use]
    pub const fn get(&self, kind: TemplateKind) -> &Template {
        match kind {
            TemplateKind::BusinessFunction => &self.business_function,
            TemplateKind::SecurityPractice => &self.security_practice,
            TemplateKind::SecurityPracticeStream => &self.security_practice_stream,
            TemplateKind::SecurityPracticeStreamActivity => {
                &self.security_practice_stream_activity
            }
            TemplateKind::Stream => &self.stream,
            TemplateKind::StreamLevel => &self.stream_level,
        }
    }

    /// Render the template of the given kind.
    ///
    /// # Errors
    ///
    /// Fails if the template references a variable that `vars` does not set.
    pub fn render(&self, kind: TemplateKind, vars: &Vars) -> Result<String, RenderError> {
        self.get(kind).render(vars)
    }
}

/// A template could not be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Malformed placeholder syntax.
    #[error("template '{template}' at byte {offset}: {message}")]
    Syntax {
        /// The template being parsed.
        template: TemplateKind,
        /// Byte offset of the problem.
        offset: usize,
        /// What went wrong.
        message: &'static str,
    },
    /// A placeholder names a variable the template does not accept.
    #[error("template '{template}' uses unknown variable '{variable}'")]
    UnknownVariable {
        /// The template being parsed.
        template: TemplateKind,
        /// The unknown name.
        variable: String,
    },
}

/// A template could not be rendered.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    /// A referenced variable was not supplied.
    #[error("template '{template}' requires variable '{variable}'")]
    MissingVariable {
        /// The template being rendered.
        template: TemplateKind,
        /// The missing name.
        variable: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_variables() {
        let template = Template::parse(
            TemplateKind::SecurityPracticeStreamActivity,
            "{stream}{maturity}: {description}",
        )
        .unwrap();
        let vars = Vars::new()
            .inline("stream", "A")
            .inline("maturity", 2)
            .inline("description", "Do it");

        assert_eq!(template.render(&vars).unwrap(), "A2: Do it");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let template =
            Template::parse(TemplateKind::SecurityPracticeStream, "{{{name}}} {{letter}}").unwrap();
        let vars = Vars::new().inline("name", "Create");

        assert_eq!(template.render(&vars).unwrap(), "{Create} {letter}");
    }

    #[test]
    fn blocks_are_reindented() {
        let template = Template::parse(TemplateKind::StreamLevel, "- a\n    - {criteria}").unwrap();
        let vars = Vars::new().block("criteria", "x\ny", 1);

        assert_eq!(template.render(&vars).unwrap(), "- a\n    - x\n    y");
    }

    #[test]
    fn unknown_variables_are_rejected() {
        let error = Template::parse(TemplateKind::Stream, "{title}").unwrap_err();
        assert_eq!(
            error,
            TemplateError::UnknownVariable {
                template: TemplateKind::Stream,
                variable: "title".to_string(),
            }
        );
    }

    #[test]
    fn malformed_placeholders_are_rejected() {
        for source in ["{name", "name}", "{}", "{name:>5}"] {
            let result = Template::parse(TemplateKind::BusinessFunction, source);
            assert!(
                matches!(result, Err(TemplateError::Syntax { .. })),
                "{source} should not parse"
            );
        }
    }

    #[test]
    fn missing_variables_fail_rendering() {
        let template = Template::parse(TemplateKind::BusinessFunction, "{name}").unwrap();
        let error = template.render(&Vars::new()).unwrap_err();
        assert_eq!(
            error,
            RenderError::MissingVariable {
                template: TemplateKind::BusinessFunction,
                variable: "name",
            }
        );
    }

    #[test]
    fn embedded_templates_parse() {
        let templates = Templates::embedded().unwrap();
        for kind in TemplateKind::ALL {
            assert_eq!(templates.get(kind).kind(), kind);
        }
    }
}
