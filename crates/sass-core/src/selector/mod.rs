//! Selector matching, unification, and the `@extend` engine (spec
//! §4.2). The selector *data model* lives in `sass_ast::selector`; this
//! module is purely the algorithms that operate on it.

pub mod extend;
pub mod matching;
pub mod parser;

pub use extend::{extend, has_any_target, is_redundant, ExtendMode, ExtensionEntry, Extensions};
pub use matching::{concat_complex, is_superselector_compound, is_superselector_complex, is_superselector_list, unify_compound};
pub use parser::parse;
