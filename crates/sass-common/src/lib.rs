//! Shared infrastructure for the Sass-to-CSS compiler.
//!
//! This crate provides the pieces every other crate in the workspace
//! needs but that carry no Sass-specific knowledge themselves:
//! - **Spans** - source locations, used by both ASTs and every error.
//! - **Logger** - the `@warn`/`@debug` delivery interface.
//! - **Error model** - the evaluator-facing error taxonomy from spec §4.6/§7.

/// Source locations and spans (see [`span::Span`]).
pub mod span;
/// The `@warn`/`@debug` logger interface (see [`logger::Logger`]).
pub mod logger;
/// The evaluator-facing error model (see [`error::SassError`]).
pub mod error;

pub use error::{ErrorKind, SassError, SassResult, StackFrame};
pub use logger::{Logger, RecordingLogger, SilentLogger, StderrLogger};
pub use span::{Location, SecondarySpan, Span};
