//! Lexical scoping (spec §4.3): variable/function/mixin lookup walks an
//! innermost-first chain of scopes, with `!global` writing through to
//! the module's top-level scope regardless of nesting depth.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sass_ast::{FunctionDecl, MixinDecl};

use super::module::Module;
use crate::value::Value;

/// One lexical scope's bindings. Shared via `Rc<RefCell<_>>` so that a
/// closure captured before a later mutation (e.g. a function declared
/// before a sibling `@if` branch sets a `!global` variable) still
/// observes that mutation, matching the reference implementation's
/// shared-scope closure semantics.
#[derive(Debug, Default)]
pub struct Scope {
    variables: RefCell<HashMap<String, Value>>,
    functions: RefCell<HashMap<String, Rc<FunctionDecl>>>,
    mixins: RefCell<HashMap<String, Rc<MixinDecl>>>,
}

impl Scope {
    /// A fresh, empty scope.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        self.variables.borrow().get(name).cloned()
    }

    fn set_variable(&self, name: impl Into<String>, value: Value) {
        self.variables.borrow_mut().insert(name.into(), value);
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.borrow().contains_key(name)
    }

    fn function(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.functions.borrow().get(name).cloned()
    }

    fn set_function(&self, name: impl Into<String>, decl: Rc<FunctionDecl>) {
        self.functions.borrow_mut().insert(name.into(), decl);
    }

    fn mixin(&self, name: &str) -> Option<Rc<MixinDecl>> {
        self.mixins.borrow().get(name).cloned()
    }

    fn set_mixin(&self, name: impl Into<String>, decl: Rc<MixinDecl>) {
        self.mixins.borrow_mut().insert(name.into(), decl);
    }
}

/// A chain of lexical scopes: one shared module-global scope plus a
/// stack of local scopes pushed for `@mixin`/`@function` bodies,
/// `@each`/`@for`/`@while` bodies, and style-rule blocks (spec §4.3).
///
/// Cloning an `Environment` is cheap (it clones `Rc`s, not the
/// underlying maps) and is how [`crate::value::FunctionRef`]/
/// [`crate::value::MixinRef`] capture "the environment at declaration
/// time" while still observing later mutations to scopes that were
/// already on the chain at capture time.
#[derive(Debug, Clone)]
pub struct Environment {
    global: Rc<Scope>,
    locals: Vec<Rc<Scope>>,
    /// Namespaced `@use`d modules, keyed by the namespace a call site
    /// writes (`ns.$var`/`ns.fn()`). Shared across every scope on the
    /// chain, since `@use` only ever happens at a module's top level
    /// but its bindings must be visible from any nested scope.
    modules: Rc<RefCell<HashMap<String, Rc<Module>>>>,
}

impl Environment {
    /// A fresh environment with only a global scope.
    #[must_use]
    pub fn new() -> Self {
        Self { global: Scope::new(), locals: Vec::new(), modules: Rc::new(RefCell::new(HashMap::new())) }
    }

    /// Push a new local scope, returning the environment to evaluate the
    /// nested block in. Callers pop by discarding this clone and
    /// continuing with the original.
    #[must_use]
    pub fn push_scope(&self) -> Self {
        let mut locals = self.locals.clone();
        locals.push(Scope::new());
        Self { global: self.global.clone(), locals, modules: self.modules.clone() }
    }

    /// Bind a loaded module under the namespace its `@use` (or `@forward`
    /// re-export) was written with (spec §4.3).
    pub fn bind_module(&self, namespace: impl Into<String>, module: Rc<Module>) {
        self.modules.borrow_mut().insert(namespace.into(), module);
    }

    /// Look up a `@use`d module by namespace (`ns.$var`/`ns.fn()`).
    #[must_use]
    pub fn module(&self, namespace: &str) -> Option<Rc<Module>> {
        self.modules.borrow().get(namespace).cloned()
    }

    /// Snapshot this environment's top-level scope as a loaded module's
    /// member tables, once its body has finished executing (`@use`/
    /// `@forward`'s "evaluate the loaded module, then expose what it
    /// declared" step, spec §4.3).
    #[must_use]
    pub fn snapshot_module(&self, url: impl Into<String>) -> Module {
        let mut module = Module::new(url);
        module.variables = self.global.variables.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        module.functions = self.global.functions.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        module.mixins = self.global.mixins.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        module
    }

    /// Look up a variable, innermost scope first, falling back to global.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<Value> {
        for scope in self.locals.iter().rev() {
            if let Some(v) = scope.variable(name) {
                return Some(v);
            }
        }
        self.global.variable(name)
    }

    /// Declare or overwrite a variable in the innermost scope (plain
    /// `$x: ...`, spec §4.3).
    pub fn set_local(&self, name: impl Into<String>, value: Value) {
        match self.locals.last() {
            Some(scope) => scope.set_variable(name, value),
            None => self.global.set_variable(name, value),
        }
    }

    /// `!global`: write to the module's top-level scope regardless of
    /// current nesting depth.
    pub fn set_global(&self, name: impl Into<String>, value: Value) {
        self.global.set_variable(name, value);
    }

    /// Look up a variable in the module's top-level scope only, ignoring
    /// any local shadowing (`meta.global-variable-exists`).
    #[must_use]
    pub fn global_variable(&self, name: &str) -> Option<Value> {
        self.global.variable(name)
    }

    /// `!default`: set only if the variable is not already bound
    /// anywhere visible on the chain. Returns whether the assignment
    /// happened.
    pub fn set_default(&self, name: &str, value: Value) -> bool {
        if self.variable(name).is_some() {
            return false;
        }
        self.set_local(name.to_string(), value);
        true
    }

    /// Assign to an already-declared variable, walking the scope chain
    /// to find where it's bound (plain `$x: ...` reassignment inside a
    /// nested block updates the *existing* binding's scope, not the
    /// innermost one, unless the variable isn't bound anywhere yet, in
    /// which case it behaves like [`Self::set_local`]).
    pub fn reassign(&self, name: &str, value: Value) {
        for scope in self.locals.iter().rev() {
            if scope.has_variable(name) {
                scope.set_variable(name.to_string(), value);
                return;
            }
        }
        self.global.set_variable(name.to_string(), value);
    }

    /// Look up a function declaration, innermost first.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        for scope in self.locals.iter().rev() {
            if let Some(f) = scope.function(name) {
                return Some(f);
            }
        }
        self.global.function(name)
    }

    /// Declare a function in the innermost scope.
    pub fn declare_function(&self, name: impl Into<String>, decl: Rc<FunctionDecl>) {
        match self.locals.last() {
            Some(scope) => scope.set_function(name, decl),
            None => self.global.set_function(name, decl),
        }
    }

    /// Look up a mixin declaration, innermost first.
    #[must_use]
    pub fn mixin(&self, name: &str) -> Option<Rc<MixinDecl>> {
        for scope in self.locals.iter().rev() {
            if let Some(m) = scope.mixin(name) {
                return Some(m);
            }
        }
        self.global.mixin(name)
    }

    /// Declare a mixin in the innermost scope.
    pub fn declare_mixin(&self, name: impl Into<String>, decl: Rc<MixinDecl>) {
        match self.locals.last() {
            Some(scope) => scope.set_mixin(name, decl),
            None => self.global.set_mixin(name, decl),
        }
    }

    /// Current nesting depth, used by the evaluator to cap runaway
    /// recursion (spec §4.4 edge case "mixin/function recursion depth").
    #[must_use]
    pub fn depth(&self) -> usize {
        self.locals.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn local_scope_shadows_global() {
        let env = Environment::new();
        env.set_global("x", Value::Number(Number::unitless(1.0)));
        let inner = env.push_scope();
        inner.set_local("x", Value::Number(Number::unitless(2.0)));
        assert_eq!(inner.variable("x"), Some(Value::Number(Number::unitless(2.0))));
        assert_eq!(env.variable("x"), Some(Value::Number(Number::unitless(1.0))));
    }

    #[test]
    fn default_does_not_override_existing_binding() {
        let env = Environment::new();
        env.set_local("x", Value::Number(Number::unitless(1.0)));
        let applied = env.set_default("x", Value::Number(Number::unitless(2.0)));
        assert!(!applied);
        assert_eq!(env.variable("x"), Some(Value::Number(Number::unitless(1.0))));
    }

    #[test]
    fn reassign_finds_existing_binding_up_the_chain() {
        let env = Environment::new();
        env.set_local("x", Value::Number(Number::unitless(1.0)));
        let inner = env.push_scope();
        inner.reassign("x", Value::Number(Number::unitless(5.0)));
        assert_eq!(env.variable("x"), Some(Value::Number(Number::unitless(5.0))));
    }

    #[test]
    fn closures_observe_later_global_mutation() {
        let env = Environment::new();
        let captured = env.clone();
        env.set_global("late", Value::Boolean(true));
        assert_eq!(captured.variable("late"), Some(Value::Boolean(true)));
    }
}
