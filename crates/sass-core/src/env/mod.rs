//! Environments, modules, and the module graph (spec §4.3).

pub mod graph;
pub mod module;
pub mod scope;

pub use graph::{Importer, LoadedSource, ModuleGraph};
pub use module::{Module, Visibility};
pub use scope::{Environment, Scope};
