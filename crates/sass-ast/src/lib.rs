//! The two immutable/mutable trees at the core of the compiler (spec §3.3/§3.4),
//! plus the selector model (§3.5) and the interpolation type they share.
//!
//! # Scope
//!
//! This crate implements:
//! - **Interpolation** ([§3.3](../../../spec.md)) - the alternating
//!   plain-text/expression segment sequence, with the adjacency
//!   invariant enforced at build time.
//! - **Sass AST** ([§3.3](../../../spec.md)) - the immutable statement
//!   and expression trees the parser builds (parsing itself is out of
//!   scope, spec §1).
//! - **Selector model** ([§3.5](../../../spec.md)) - compound/complex
//!   selectors, combinators, and specificity.
//! - **Plain-CSS tree** ([§3.4](../../../spec.md)) - the mutable,
//!   arena-indexed tree the evaluator builds and the serializer walks,
//!   following the teacher's `koala-dom` arena design.
//!
//! # Not covered here
//!
//! - Matching/unifying/extending selectors against each other (the
//!   *algorithms*, as opposed to the *data shape*) live in
//!   `sass-core::selector`, since they need evaluator context.
//! - Parsing Sass source text into a [`sass_ast::Stylesheet`] is an
//!   external collaborator per spec §1; this crate only defines the
//!   shape such a parser would build.

/// `#{}` interpolation segments (see [`interpolation::Interpolation`]).
pub mod interpolation;
/// The selector data model (see [`selector::SelectorList`]).
pub mod selector;
/// The immutable Sass syntax tree (see [`sass_ast::Stylesheet`]).
pub mod sass_ast;
/// The mutable, arena-indexed plain-CSS tree (see [`css_ast::CssTree`]).
pub mod css_ast;

pub use css_ast::{CssImport, CssNode, CssNodeId, CssTree, CssTreeNode, MediaQuery};
pub use interpolation::{Interpolation, InterpolationBuilder, InterpolationSegment};
pub use sass_ast::{
    ArgumentInvocation, BinaryOp, CalcOperand, EachBinding, Expression, ForwardVisibility, IfClause,
    ListSeparatorLit, Parameter, ParameterList, Statement, Stylesheet, SupportsCondition, UnaryOp, UseAlias,
};
pub use selector::{
    Combinator, CompoundSelector, ComplexSelector, PseudoArgument, SelectorList, SimpleSelector, Specificity,
};
