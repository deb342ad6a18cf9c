//! The [`Logger`] interface from spec §6.1.
//!
//! `warn` carries an optional call stack (for `@warn`, which is raised
//! from inside mixins/functions); `debug` does not (`@debug` has no
//! stack in the reference behavior). Both are delivered in source order
//! per spec §5's ordering guarantees.

use crate::span::Span;
use std::collections::HashSet;
use std::sync::Mutex;

/// ANSI color codes for terminal output, matching the teacher's
/// `koala_common::warning` module.
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

/// Receives `@warn`/`@debug` output and compiler warnings.
///
/// Implementations must be safe to share across compilations only if the
/// caller shares a single instance across parallel compilations (spec §6.1);
/// the core never assumes a particular implementation is thread-safe.
pub trait Logger {
    /// A `@warn` call or an internal deprecation warning.
    fn warn(&self, message: &str, span: &Span, stack: &[String]);
    /// A `@debug` call.
    fn debug(&self, message: &str, span: &Span);
}

/// Default logger: prints to stderr, deduplicating identical
/// `(message, span)` pairs so a warning inside a loop doesn't spam the
/// terminal. Mirrors the teacher's `warn_once`.
#[derive(Default)]
pub struct StderrLogger {
    seen: Mutex<HashSet<String>>,
}

impl StderrLogger {
    /// Create a fresh logger with no warnings recorded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn should_print(&self, key: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string())
    }
}

impl Logger for StderrLogger {
    fn warn(&self, message: &str, span: &Span, stack: &[String]) {
        let key = format!("warn:{span}:{message}");
        if !self.should_print(&key) {
            return;
        }
        eprintln!("{YELLOW}Warning: {message}{RESET}\n  {span}");
        for frame in stack {
            eprintln!("  in {frame}");
        }
    }

    fn debug(&self, message: &str, span: &Span) {
        eprintln!("{BLUE}{span} Debug: {message}{RESET}");
    }
}

/// A logger that discards everything; useful for tests and for library
/// consumers that want to collect diagnostics a different way.
#[derive(Default)]
pub struct SilentLogger;

impl Logger for SilentLogger {
    fn warn(&self, _message: &str, _span: &Span, _stack: &[String]) {}
    fn debug(&self, _message: &str, _span: &Span) {}
}

/// A logger that records everything it receives, for test assertions.
#[derive(Default)]
pub struct RecordingLogger {
    /// Recorded `(message, span)` pairs passed to [`Logger::warn`].
    pub warnings: Mutex<Vec<(String, Span)>>,
    /// Recorded `(message, span)` pairs passed to [`Logger::debug`].
    pub debug_messages: Mutex<Vec<(String, Span)>>,
}

impl Logger for RecordingLogger {
    fn warn(&self, message: &str, span: &Span, _stack: &[String]) {
        self.warnings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((message.to_string(), span.clone()));
    }

    fn debug(&self, message: &str, span: &Span) {
        self.debug_messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((message.to_string(), span.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_logger_captures_warnings() {
        let logger = RecordingLogger::default();
        logger.warn("oops", &Span::synthetic(), &[]);
        assert_eq!(logger.warnings.lock().unwrap().len(), 1);
    }
}
