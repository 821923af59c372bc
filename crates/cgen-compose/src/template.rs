//! Parameterized fragment templates.
//!
//! A template is plain text with `{{name}}` placeholders. A placeholder may
//! carry one filter, `{{name|upper}}` or `{{name|lower}}`. Everything else,
//! including build-system syntax such as `${QT_LIBRARIES}`, is copied
//! verbatim.
//!
//! Templates are validated once, when constructed, against the parameter
//! names they declare. Rendering then only fails if a declared value was not
//! supplied.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ComposeError, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\|\s*([A-Za-z_]+)\s*)?\}\}")
        .expect("placeholder pattern is valid")
});

/// Transformation applied to a value when it is substituted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Upper,
    Lower,
}

impl Filter {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "upper" => Some(Self::Upper),
            "lower" => Some(Self::Lower),
            _ => None,
        }
    }

    fn apply(self, value: &str) -> String {
        match self {
            Self::Upper => value.to_uppercase(),
            Self::Lower => value.to_lowercase(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value { name: String, filter: Option<Filter> },
}

/// A validated fragment template.
#[derive(Clone, PartialEq, Eq)]
pub struct FragmentTemplate {
    source: String,
    parameters: Vec<String>,
    segments: Vec<Segment>,
}

impl FragmentTemplate {
    /// Parse `source`, accepting only placeholders naming one of
    /// `parameters`.
    pub fn new(source: impl Into<String>, parameters: &[&str]) -> Result<Self> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(&source) {
            let Some(whole) = caps.get(0) else { continue };
            push_literal(&mut segments, &source[last..whole.start()])?;
            last = whole.end();

            let name = &caps[1];
            if !parameters.contains(&name) {
                return Err(ComposeError::Config(format!(
                    "template references unknown parameter `{name}` (declared: {})",
                    parameters.join(", ")
                )));
            }
            let filter = match caps.get(2) {
                Some(f) => Some(Filter::parse(f.as_str()).ok_or_else(|| {
                    ComposeError::Config(format!("unknown template filter `{}`", f.as_str()))
                })?),
                None => None,
            };
            segments.push(Segment::Value {
                name: name.to_string(),
                filter,
            });
        }
        push_literal(&mut segments, &source[last..])?;

        Ok(Self {
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            source,
            segments,
        })
    }

    /// The unparsed template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared parameter names.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Names actually referenced by placeholders, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Value { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder from `values`.
    pub fn render(&self, values: &TemplateValues) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value { name, filter } => {
                    let value = values.get(name).ok_or_else(|| {
                        ComposeError::Config(format!("no value supplied for template parameter `{name}`"))
                    })?;
                    match filter {
                        Some(f) => out.push_str(&f.apply(value)),
                        None => out.push_str(value),
                    }
                }
            }
        }
        Ok(out)
    }
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) -> Result<()> {
    if let Some(at) = text.find("{{") {
        let near = text[at..].lines().next().unwrap_or_default();
        return Err(ComposeError::Config(format!(
            "malformed template placeholder near {near:?}"
        )));
    }
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
    Ok(())
}

impl fmt::Debug for FragmentTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentTemplate")
            .field("parameters", &self.parameters)
            .field("len", &self.source.len())
            .finish()
    }
}

/// Values substituted into templates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateValues(BTreeMap<String, String>);

impl TemplateValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}
