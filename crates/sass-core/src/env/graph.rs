//! Module loading and the `@use`/`@forward`/legacy `@import` graph
//! (spec §4.3).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sass_common::{SassError, SassResult};

use super::module::Module;

/// A loaded stylesheet's source text plus the canonical URL the
/// importer resolved it to, returned by [`Importer::load`].
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// The canonical URL, used as the cache key and in error messages.
    pub canonical_url: String,
    /// The raw stylesheet contents.
    pub contents: String,
    /// `true` for `.sass` (indented) syntax, `false` for `.scss`.
    pub is_indented_syntax: bool,
}

/// Resolves `@use`/`@forward`/`@import` URLs to stylesheet contents
/// (spec §4.3's `Importer` collaborator). Implementations provide
/// filesystem, in-memory, or package-resolution strategies; the
/// built-in CLI ships a filesystem importer (`sass-cli`).
pub trait Importer {
    /// Resolve `url`, as written in the importing stylesheet, relative
    /// to `from` (the canonical URL of the stylesheet containing the
    /// `@use`/`@forward`/`@import`, or `None` for the entrypoint),
    /// applying Sass's partial/index/extension resolution rules (spec
    /// §4.3's load-path algorithm: try the literal path, then
    /// `_<name>`, then `<name>/index`, trying `.scss` then `.sass` then
    /// `.css` at each step). Returns `None` if this importer can't
    /// resolve the URL at all (a later importer in the chain may).
    fn canonicalize(&self, url: &str, from: Option<&str>) -> Option<String>;

    /// Load the contents at an already-canonicalized URL.
    fn load(&self, canonical_url: &str) -> SassResult<LoadedSource>;
}

/// The module graph: canonical-URL-keyed cache of loaded, evaluated
/// modules, with cycle detection for `@use`/`@forward` (spec §4.3 edge
/// case "circular `@use` is an error") and `@import` (`ImportCycle`,
/// spec §4.6).
pub struct ModuleGraph {
    loaded: RefCell<HashMap<String, Rc<Module>>>,
    loading: RefCell<Vec<String>>,
}

impl ModuleGraph {
    /// A fresh, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self { loaded: RefCell::new(HashMap::new()), loading: RefCell::new(Vec::new()) }
    }

    /// Fetch an already-loaded module by canonical URL, if cached
    /// (spec §4.3: "each canonical URL is loaded and evaluated exactly
    /// once per compilation, even if `@use`d from multiple places").
    #[must_use]
    pub fn get(&self, canonical_url: &str) -> Option<Rc<Module>> {
        self.loaded.borrow().get(canonical_url).cloned()
    }

    /// Record a newly-evaluated module under its canonical URL.
    pub fn insert(&self, canonical_url: String, module: Rc<Module>) {
        self.loaded.borrow_mut().insert(canonical_url, module);
    }

    /// Begin loading `canonical_url`, failing if it's already in
    /// progress higher up the current load stack (a cycle). Callers
    /// must pair this with [`Self::finish_loading`] even on error paths
    /// (use a guard/`?` carefully, or call both explicitly).
    pub fn start_loading(&self, canonical_url: &str) -> SassResult<()> {
        if self.loading.borrow().iter().any(|u| u == canonical_url) {
            return Err(SassError::new(
                sass_common::ErrorKind::ImportCycle(canonical_url.to_string()),
                sass_common::Span::synthetic(),
            ));
        }
        self.loading.borrow_mut().push(canonical_url.to_string());
        Ok(())
    }

    /// Mark `canonical_url` as no longer being loaded.
    pub fn finish_loading(&self, canonical_url: &str) {
        self.loading.borrow_mut().retain(|u| u != canonical_url);
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_module_is_returned_on_second_lookup() {
        let graph = ModuleGraph::new();
        graph.insert("sass:math".to_string(), Rc::new(Module::new("sass:math")));
        assert!(graph.get("sass:math").is_some());
    }

    #[test]
    fn reentrant_load_of_same_url_is_a_cycle() {
        let graph = ModuleGraph::new();
        graph.start_loading("a.scss").unwrap();
        assert!(graph.start_loading("a.scss").is_err());
        graph.finish_loading("a.scss");
        assert!(graph.start_loading("a.scss").is_ok());
    }
}
