//! Raw descriptor records and the descriptor file format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

static VARIABLE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_.]+)\}").expect("variable reference pattern is valid")
});

/// One descriptor: a named bundle of string fields.
///
/// Field values are stored verbatim. An empty value is reported as missing by
/// [`RawRecord::field`], matching how descriptor writers leave out optional
/// fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Record name (the descriptor file stem).
    pub name: String,
    /// Where the record was read from. Used in diagnostics only.
    pub path: PathBuf,
    pub fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if `key` is present, even with an empty value.
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// The value of `key`, or `None` if it is absent or empty.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The comma-separated list stored under `key`. Blank items are dropped;
    /// a missing field yields an empty list.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.field(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parse a descriptor file.
///
/// The format is the pkg-config one:
///
/// ```text
/// # comment
/// prefix=/opt/rock
/// project_name=camera
/// deffile=${prefix}/share/orogen/camera.orogen
///
/// Name: camera
/// Version: 0.1
/// ```
///
/// `key=value` lines define variables, `Key: value` lines define fields.
/// `${var}` references are expanded from variables defined earlier in the
/// file and `$$` stands for a literal `$`. Both variables and fields become
/// record fields.
pub fn parse_descriptor(name: &str, path: &Path, text: &str) -> StoreResult<RawRecord> {
    let mut record = RawRecord::new(name, path);
    let mut variables: BTreeMap<String, String> = BTreeMap::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let parse_error = |reason: String| StoreError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        };

        let split_at = line
            .find(['=', ':'])
            .ok_or_else(|| parse_error(format!("expected `key=value` or `Key: value`, got {line:?}")))?;
        let key = line[..split_at].trim();
        let is_variable = line.as_bytes()[split_at] == b'=';
        let value = line[split_at + 1..].trim();

        if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.') {
            return Err(parse_error(format!("invalid key {key:?}")));
        }

        let expanded = expand_variables(value, &variables).map_err(parse_error)?;
        if is_variable {
            variables.insert(key.to_string(), expanded.clone());
        }
        record.fields.insert(key.to_string(), expanded);
    }

    Ok(record)
}

fn expand_variables(value: &str, variables: &BTreeMap<String, String>) -> Result<String, String> {
    let escaped = value.replace("$$", "\u{0}");
    let mut undefined = None;
    let expanded = VARIABLE_REF.replace_all(&escaped, |caps: &regex::Captures<'_>| {
        match variables.get(&caps[1]) {
            Some(v) => v.clone(),
            None => {
                undefined.get_or_insert_with(|| caps[1].to_string());
                String::new()
            }
        }
    });
    if let Some(var) = undefined {
        return Err(format!("undefined variable `{var}`"));
    }
    Ok(expanded.replace('\u{0}', "$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> StoreResult<RawRecord> {
        parse_descriptor("orogen-project-camera", Path::new("camera.pc"), text)
    }

    #[test]
    fn variables_and_fields() {
        let record = parse(
            "prefix=/opt/rock\n\
             project_name=camera\n\
             deffile=${prefix}/share/camera.orogen\n\
             \n\
             Name: camera\n\
             Version: 1.0\n",
        )
        .unwrap();

        assert_eq!(record.field("project_name"), Some("camera"));
        assert_eq!(record.field("deffile"), Some("/opt/rock/share/camera.orogen"));
        assert_eq!(record.field("Name"), Some("camera"));
        assert_eq!(record.field("Version"), Some("1.0"));
    }

    #[test]
    fn comments_and_dollar_escape() {
        let record = parse("# header\ncost=$$5 # trailing\n").unwrap();
        assert_eq!(record.field("cost"), Some("$5"));
    }

    #[test]
    fn undefined_variable_is_a_parse_error() {
        let err = parse("deffile=${prefix}/x\n").unwrap_err();
        match err {
            StoreError::Parse { line, reason, .. } => {
                assert_eq!(line, 1);
                assert!(reason.contains("prefix"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn line_without_separator_is_rejected() {
        assert!(matches!(
            parse("project_name=camera\ngarbage\n"),
            Err(StoreError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn value_may_contain_separators() {
        let record = parse("Libs: -L/opt/lib -Wl,-rpath=/opt/lib\n").unwrap();
        assert_eq!(record.field("Libs"), Some("-L/opt/lib -Wl,-rpath=/opt/lib"));
    }

    #[test]
    fn empty_field_reads_as_missing() {
        let record = RawRecord::new("r", "r.pc").with_field("deffile", "  ");
        assert_eq!(record.field("deffile"), None);
        assert_eq!(record.field("absent"), None);
    }

    #[test]
    fn list_fields() {
        let record = RawRecord::new("r", "r.pc").with_field("task_models", "a::Task, b::Task,,");
        assert_eq!(record.list("task_models"), vec!["a::Task", "b::Task"]);
        assert!(record.list("deployed_tasks").is_empty());
    }
}
