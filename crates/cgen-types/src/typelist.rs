//! Type-list artifacts.
//!
//! A type list names every type a typekit defines, one per line, optionally
//! followed by an export flag:
//!
//! ```text
//! /base/Time 1
//! /base/internal/Buffer 0
//! /std/string
//! ```
//!
//! Flag `1` marks an exported (interface) type, `0` a private one. A line
//! without a flag is exported. Type names may contain spaces, so only a
//! trailing `0` or `1` token is read as a flag.

use serde::{Deserialize, Serialize};

/// Parsed type-list artifact.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeList {
    /// Every type, in file order.
    pub all: Vec<String>,
    /// The exported subset, in file order.
    pub exported: Vec<String>,
}

impl TypeList {
    /// Parse type-list text. Blank lines are ignored; parsing never fails.
    pub fn parse(text: &str) -> Self {
        let mut list = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (name, exported) = match line.rsplit_once(char::is_whitespace) {
                Some((name, "1")) => (name.trim_end(), true),
                Some((name, "0")) => (name.trim_end(), false),
                _ => (line, true),
            };

            list.all.push(name.to_string());
            if exported {
                list.exported.push(name.to_string());
            }
        }
        list
    }

    /// Types that are defined but not exported, in file order.
    pub fn non_exported(&self) -> impl Iterator<Item = &str> {
        self.all
            .iter()
            .filter(|name| !self.exported.contains(name))
            .map(String::as_str)
    }

    /// Returns `true` if `name` is exported by this list.
    pub fn is_exported(&self, name: &str) -> bool {
        self.exported.iter().any(|t| t == name)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flags_select_exported_types() {
        let list = TypeList::parse("/base/Time 1\n/base/Buffer 0\n\n/std/string\n");
        assert_eq!(list.all, vec!["/base/Time", "/base/Buffer", "/std/string"]);
        assert_eq!(list.exported, vec!["/base/Time", "/std/string"]);
        assert_eq!(list.non_exported().collect::<Vec<_>>(), vec!["/base/Buffer"]);
    }

    #[test]
    fn names_with_spaces_keep_their_spaces() {
        let list = TypeList::parse("/unsigned int 0\n/long long\n");
        assert_eq!(list.all, vec!["/unsigned int", "/long long"]);
        assert!(!list.is_exported("/unsigned int"));
        assert!(list.is_exported("/long long"));
    }

    #[test]
    fn empty_text() {
        let list = TypeList::parse("  \n\n");
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    proptest! {
        #[test]
        fn exported_is_subset_of_all(lines in proptest::collection::vec(("/[a-z]{1,8}", 0u8..3), 0..20)) {
            let text: String = lines
                .iter()
                .map(|(name, flag)| match flag {
                    0 => format!("{name} 0\n"),
                    1 => format!("{name} 1\n"),
                    _ => format!("{name}\n"),
                })
                .collect();
            let list = TypeList::parse(&text);
            prop_assert_eq!(list.len(), lines.len());
            for name in &list.exported {
                prop_assert!(list.all.contains(name));
            }
        }
    }
}
