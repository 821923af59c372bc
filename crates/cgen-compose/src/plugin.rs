//! Marshaller plugins and the ordered registry that runs them.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use cgen_types::TypeList;

use crate::error::{ComposeError, Result};

// ---------------------------------------------------------------------------
// Plugin input
// ---------------------------------------------------------------------------

/// One type of the typekit being generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    /// Registry name, e.g. `/base/Time`.
    pub name: String,
    pub exported: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, exported: bool) -> Self {
        Self {
            name: name.into(),
            exported,
        }
    }

    /// C++ spelling of the type: `/base/Time` becomes `base::Time`,
    /// `/std/vector</double>` becomes `std::vector<double>`.
    pub fn cxx_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 8);
        let mut prev: Option<char> = None;
        for c in self.name.chars() {
            if c == '/' {
                if !matches!(prev, None | Some('<' | ',' | ' ')) {
                    out.push_str("::");
                }
            } else {
                out.push(c);
            }
            prev = Some(c);
        }
        out
    }

    /// Identifier usable in generated function names: `/base/Time` becomes
    /// `base_Time`. Empty if the name has no identifier characters.
    pub fn method_name(&self) -> String {
        let mangled: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let mut out = String::with_capacity(mangled.len());
        for part in mangled.split('_').filter(|p| !p.is_empty()) {
            if !out.is_empty() {
                out.push('_');
            }
            out.push_str(part);
        }
        out
    }
}

/// Everything a plugin may see about the typekit it is invoked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypekitInput {
    pub name: String,
    pub project: String,
    /// All types in type-list order.
    pub types: Vec<TypeInfo>,
}

impl TypekitInput {
    pub fn new(name: impl Into<String>, project: impl Into<String>, types: Vec<TypeInfo>) -> Self {
        Self {
            name: name.into(),
            project: project.into(),
            types,
        }
    }

    /// Build the input from a parsed type list.
    pub fn from_type_list(
        name: impl Into<String>,
        project: impl Into<String>,
        list: &TypeList,
    ) -> Self {
        let types = list
            .all
            .iter()
            .map(|t| TypeInfo::new(t.clone(), list.is_exported(t)))
            .collect();
        Self::new(name, project, types)
    }

    /// Exported types in type-list order.
    pub fn exported(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter().filter(|t| t.exported)
    }
}

// ---------------------------------------------------------------------------
// Contributions
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    /// A generated source file.
    Source,
    /// A fragment appended to the typekit's build description.
    Build,
}

/// One piece of generated text attached to a typekit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Contribution {
    /// Name of the contributing plugin; filled in by the registry.
    pub plugin: String,
    pub kind: ContributionKind,
    /// Path relative to the typekit's output directory. Empty for build
    /// fragments.
    pub path: PathBuf,
    pub text: String,
}

impl Contribution {
    pub fn source(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            plugin: String::new(),
            kind: ContributionKind::Source,
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn build(text: impl Into<String>) -> Self {
        Self {
            plugin: String::new(),
            kind: ContributionKind::Build,
            path: PathBuf::new(),
            text: text.into(),
        }
    }
}

/// All contributions made to one typekit, in plugin registration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypekitContributions {
    pub typekit: String,
    pub contributions: Vec<Contribution>,
}

impl TypekitContributions {
    pub fn sources(&self) -> impl Iterator<Item = &Contribution> {
        self.contributions
            .iter()
            .filter(|c| c.kind == ContributionKind::Source)
    }

    /// Build fragments of every plugin, joined in order.
    pub fn build_fragment(&self) -> String {
        let mut out = String::new();
        for c in self
            .contributions
            .iter()
            .filter(|c| c.kind == ContributionKind::Build)
        {
            out.push_str(&c.text);
            if !c.text.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// MarshallerPlugin trait
// ---------------------------------------------------------------------------

/// A provider of per-typekit generated code, typically one transport.
///
/// Plugins are invoked once per typekit, in registration order, and see only
/// that typekit. The trait is object-safe so plugins can be stored in a
/// `Vec<Box<dyn MarshallerPlugin>>`.
pub trait MarshallerPlugin: Send + Sync {
    /// Unique plugin name (e.g. "corba", "typelib").
    fn name(&self) -> &str;

    /// Produce this plugin's contributions for `typekit`.
    fn contribute(&self, typekit: &TypekitInput) -> Result<Vec<Contribution>>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Collects plugins before the registry is frozen.
#[derive(Default)]
pub struct PluginRegistryBuilder {
    plugins: Vec<Box<dyn MarshallerPlugin>>,
}

impl PluginRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin. Names must be unique.
    pub fn register(&mut self, plugin: Box<dyn MarshallerPlugin>) -> Result<&mut Self> {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            return Err(ComposeError::Config(format!(
                "a marshaller plugin called {} is already registered",
                plugin.name()
            )));
        }
        self.plugins.push(plugin);
        Ok(self)
    }

    pub fn build(self) -> PluginRegistry {
        PluginRegistry {
            plugins: self.plugins,
        }
    }
}

/// Frozen, ordered set of marshaller plugins.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn MarshallerPlugin>>,
}

impl PluginRegistry {
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::new()
    }

    /// Plugin names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every plugin on `typekit`, in registration order.
    ///
    /// The first failing plugin aborts the run. Source paths must be
    /// relative and stay inside the typekit directory.
    pub fn contributions_for(&self, typekit: &TypekitInput) -> Result<TypekitContributions> {
        let mut contributions = Vec::new();
        for plugin in &self.plugins {
            let made = plugin.contribute(typekit)?;
            debug!(
                plugin = plugin.name(),
                typekit = %typekit.name,
                count = made.len(),
                "plugin contributed"
            );
            for mut c in made {
                if c.kind == ContributionKind::Source {
                    check_source_path(plugin.name(), &c.path)?;
                }
                c.plugin = plugin.name().to_string();
                contributions.push(c);
            }
        }
        Ok(TypekitContributions {
            typekit: typekit.name.clone(),
            contributions,
        })
    }
}

fn check_source_path(plugin: &str, path: &Path) -> Result<()> {
    let inside = !path.as_os_str().is_empty()
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if inside {
        Ok(())
    } else {
        Err(ComposeError::plugin(
            plugin,
            format!("invalid output path {}", path.display()),
        ))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        output: Vec<Contribution>,
    }

    impl MarshallerPlugin for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn contribute(&self, _typekit: &TypekitInput) -> Result<Vec<Contribution>> {
            Ok(self.output.clone())
        }
    }

    struct Failing;

    impl MarshallerPlugin for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn contribute(&self, typekit: &TypekitInput) -> Result<Vec<Contribution>> {
            Err(ComposeError::plugin("failing", format!("cannot handle {}", typekit.name)))
        }
    }

    fn input() -> TypekitInput {
        TypekitInput::from_type_list("base", "base", &TypeList::parse("/base/Time 1\n/base/Hidden 0\n"))
    }

    // -----------------------------------------------------------------------
    // Type naming
    // -----------------------------------------------------------------------

    #[test]
    fn cxx_and_method_names() {
        let t = TypeInfo::new("/base/Time", true);
        assert_eq!(t.cxx_name(), "base::Time");
        assert_eq!(t.method_name(), "base_Time");

        let v = TypeInfo::new("/std/vector</double>", true);
        assert_eq!(v.cxx_name(), "std::vector<double>");
        assert_eq!(v.method_name(), "std_vector_double");

        assert_eq!(TypeInfo::new("/<>", true).method_name(), "");
    }

    #[test]
    fn input_from_type_list() {
        let i = input();
        assert_eq!(i.types.len(), 2);
        let exported: Vec<&str> = i.exported().map(|t| t.name.as_str()).collect();
        assert_eq!(exported, vec!["/base/Time"]);
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_plugin_name_is_rejected() {
        let mut b = PluginRegistry::builder();
        b.register(Box::new(Failing)).unwrap();
        let err = b.register(Box::new(Failing)).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn contributions_follow_registration_order() {
        let mut b = PluginRegistry::builder();
        b.register(Box::new(Fixed {
            name: "second",
            output: vec![Contribution::source("b.cpp", "b"), Contribution::build("B")],
        }))
        .unwrap()
        .register(Box::new(Fixed {
            name: "first",
            output: vec![Contribution::build("A\n"), Contribution::source("a/a.cpp", "a")],
        }))
        .unwrap();
        let reg = b.build();
        assert_eq!(reg.names(), vec!["second", "first"]);

        let out = reg.contributions_for(&input()).unwrap();
        let plugins: Vec<&str> = out.contributions.iter().map(|c| c.plugin.as_str()).collect();
        assert_eq!(plugins, vec!["second", "second", "first", "first"]);
        assert_eq!(out.build_fragment(), "B\nA\n");
        let paths: Vec<&Path> = out.sources().map(|c| c.path.as_path()).collect();
        assert_eq!(paths, vec![Path::new("b.cpp"), Path::new("a/a.cpp")]);
    }

    #[test]
    fn failing_plugin_aborts() {
        let mut b = PluginRegistry::builder();
        b.register(Box::new(Failing)).unwrap();
        let err = b.build().contributions_for(&input()).unwrap_err();
        assert_eq!(err, ComposeError::plugin("failing", "cannot handle base"));
    }

    #[test]
    fn escaping_source_paths_are_rejected() {
        for bad in ["../x.cpp", "/abs.cpp", ""] {
            let mut b = PluginRegistry::builder();
            b.register(Box::new(Fixed {
                name: "bad",
                output: vec![Contribution::source(bad, "x")],
            }))
            .unwrap();
            assert!(matches!(
                b.build().contributions_for(&input()),
                Err(ComposeError::Plugin { .. })
            ));
        }
    }
}
