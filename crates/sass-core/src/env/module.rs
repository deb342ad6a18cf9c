//! Modules and their member visibility (spec §4.3): the unit `@use` and
//! `@forward` operate on.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

use sass_ast::{FunctionDecl, MixinDecl};

use crate::value::Value;

/// Which members a `@forward ... show/hide ...` clause exposes.
#[derive(Debug, Clone, Default)]
pub enum Visibility {
    /// Forward everything (no `show`/`hide` clause).
    #[default]
    All,
    /// Forward only the named members (`@forward "x" show a, b`).
    Show(HashSet<String>),
    /// Forward everything except the named members (`@forward "x" hide a, b`).
    Hide(HashSet<String>),
}

impl Visibility {
    /// Whether a given member name passes this visibility filter.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Show(names) => names.contains(name),
            Self::Hide(names) => !names.contains(name),
        }
    }
}

/// A single loaded module: its own top-level members plus whatever it
/// re-exports via `@forward` (already merged in by the module graph at
/// load time, spec §4.3's forwarding semantics).
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// The canonical URL this module was loaded from.
    pub url: String,
    /// Top-level (and forwarded) variables, in declaration order.
    pub variables: IndexMap<String, Value>,
    /// Top-level (and forwarded) functions.
    pub functions: IndexMap<String, Rc<FunctionDecl>>,
    /// Top-level (and forwarded) mixins.
    pub mixins: IndexMap<String, Rc<MixinDecl>>,
    /// Names of variables declared `!default` that a downstream `@use
    /// ... with (...)` configuration may still override before first
    /// load (spec §4.3 "configuring modules with `with`").
    pub configurable: HashSet<String>,
}

impl Module {
    /// A fresh, empty module for the given canonical URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }

    /// Apply a `with (...)` configuration, overriding `!default`
    /// variables before the module's own top-level code has observed
    /// them (the module loader calls this prior to evaluating the
    /// module body, per spec §4.3).
    pub fn configure(&mut self, config: IndexMap<String, Value>) -> Result<(), String> {
        for (name, value) in config {
            if !self.configurable.contains(&name) {
                return Err(format!("{name} is not a configurable variable in this module"));
            }
            self.variables.insert(name, value);
        }
        Ok(())
    }

    /// Merge another module's forwarded members into this one, applying
    /// a visibility filter and optional prefix (spec §4.3 `@forward
    /// "x" as prefix-* show/hide ...`).
    pub fn merge_forwarded(&mut self, other: &Self, visibility: &Visibility, prefix: &str) {
        for (name, value) in &other.variables {
            if visibility.allows(name) {
                self.variables.insert(format!("{prefix}{name}"), value.clone());
            }
        }
        for (name, decl) in &other.functions {
            if visibility.allows(name) {
                self.functions.insert(format!("{prefix}{name}"), decl.clone());
            }
        }
        for (name, decl) in &other.mixins {
            if visibility.allows(name) {
                self.mixins.insert(format!("{prefix}{name}"), decl.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hide_visibility_excludes_named_members() {
        let vis = Visibility::Hide(["secret".to_string()].into_iter().collect());
        assert!(!vis.allows("secret"));
        assert!(vis.allows("public"));
    }

    #[test]
    fn show_visibility_is_an_allowlist() {
        let vis = Visibility::Show(["a".to_string()].into_iter().collect());
        assert!(vis.allows("a"));
        assert!(!vis.allows("b"));
    }

    #[test]
    fn configure_rejects_non_configurable_names() {
        let mut module = Module::new("sass:example");
        let mut config = IndexMap::new();
        config.insert("unknown".to_string(), Value::Boolean(true));
        assert!(module.configure(config).is_err());
    }
}
