//! Source map v3 construction (spec §6.3).
//!
//! The serializer records one mapping per emitted CSS-tree node, at the
//! position in the generated text where that node's own text begins,
//! pointing back at the span the evaluator stamped the node with.
//! Redundant duplicate lines are collapsed (spec §4.5: "no two entries
//! on the same target line for the same source line").

use std::collections::HashSet;

use sass_common::Span;

const BASE64_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn encode_vlq(out: &mut String, value: i64) {
    let mut num = if value < 0 { (-value << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = (num & 0x1f) as u32;
        num >>= 5;
        if num > 0 {
            digit |= 0x20;
        }
        out.push(BASE64_ALPHABET[digit as usize] as char);
        if num == 0 {
            break;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    generated_line: u32,
    generated_column: u32,
    source_index: u32,
    source_line: u32,
    source_column: u32,
}

/// A standard source map v3 document. Serializable as-is; writing it to
/// a `.map` file and appending the `sourceMappingURL` comment to the
/// CSS output is the caller's job (spec's Non-goal excludes that outer
/// byte-layout wrapping).
#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceMap {
    /// Always `3`.
    pub version: u8,
    /// The file this map describes, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Canonical URLs of every source file referenced.
    pub sources: Vec<String>,
    /// Embedded source text, index-aligned with `sources`, if requested.
    #[serde(rename = "sourcesContent", skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    /// Always empty: this compiler never needs the `names` table.
    pub names: Vec<String>,
    /// VLQ-encoded mapping segments.
    pub mappings: String,
}

/// Accumulates mapping entries while the serializer walks the CSS tree.
pub(super) struct SourceMapBuilder {
    sources: Vec<String>,
    entries: Vec<Entry>,
}

impl SourceMapBuilder {
    pub(super) fn new() -> Self {
        Self { sources: Vec::new(), entries: Vec::new() }
    }

    fn source_index(&mut self, url: &str) -> u32 {
        if let Some(pos) = self.sources.iter().position(|s| s == url) {
            return u32::try_from(pos).unwrap_or(u32::MAX);
        }
        self.sources.push(url.to_string());
        u32::try_from(self.sources.len() - 1).unwrap_or(u32::MAX)
    }

    /// Record that the text about to be written at `(line, column)` in
    /// the generated output originated from `span`'s start. A no-op for
    /// synthetic spans, which have no source URL to point at.
    pub(super) fn record(&mut self, generated_line: u32, generated_column: u32, span: &Span) {
        let Some(url) = span.source_url.as_deref() else { return };
        let source_index = self.source_index(url);
        self.entries.push(Entry {
            generated_line,
            generated_column,
            source_index,
            source_line: span.start.line,
            source_column: span.start.column,
        });
    }

    /// Finish building, producing the serializable source map.
    pub(super) fn finish(mut self, file: Option<String>) -> SourceMap {
        self.entries.sort_by_key(|e| (e.generated_line, e.generated_column));
        let mut seen = HashSet::new();
        self.entries.retain(|e| seen.insert((e.generated_line, e.source_line)));

        let mut mappings = String::new();
        let mut generated_line = 0u32;
        let mut last_generated_column = 0i64;
        let mut last_source_index = 0i64;
        let mut last_source_line = 0i64;
        let mut last_source_column = 0i64;
        let mut first_on_line = true;
        for entry in &self.entries {
            while generated_line < entry.generated_line {
                mappings.push(';');
                generated_line += 1;
                last_generated_column = 0;
                first_on_line = true;
            }
            if !first_on_line {
                mappings.push(',');
            }
            first_on_line = false;
            encode_vlq(&mut mappings, i64::from(entry.generated_column) - last_generated_column);
            encode_vlq(&mut mappings, i64::from(entry.source_index) - last_source_index);
            encode_vlq(&mut mappings, i64::from(entry.source_line) - last_source_line);
            encode_vlq(&mut mappings, i64::from(entry.source_column) - last_source_column);
            last_generated_column = i64::from(entry.generated_column);
            last_source_index = i64::from(entry.source_index);
            last_source_line = i64::from(entry.source_line);
            last_source_column = i64::from(entry.source_column);
        }

        SourceMap { version: 3, file, sources: self.sources, sources_content: None, names: Vec::new(), mappings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_common::Location;
    use std::rc::Rc;

    fn span_at(line: u32, column: u32) -> Span {
        Span::new(Some(Rc::from("input.scss")), Location { offset: 0, line, column }, Location { offset: 0, line, column })
    }

    #[test]
    fn single_mapping_encodes_to_a_non_empty_segment() {
        let mut builder = SourceMapBuilder::new();
        builder.record(0, 0, &span_at(0, 0));
        let map = builder.finish(None);
        assert_eq!(map.sources, vec!["input.scss".to_string()]);
        assert!(!map.mappings.is_empty());
    }

    #[test]
    fn synthetic_spans_are_not_recorded() {
        let mut builder = SourceMapBuilder::new();
        builder.record(0, 0, &Span::synthetic());
        let map = builder.finish(None);
        assert!(map.sources.is_empty());
        assert!(map.mappings.is_empty());
    }

    #[test]
    fn duplicate_source_line_on_same_generated_line_collapses() {
        let mut builder = SourceMapBuilder::new();
        builder.record(0, 0, &span_at(3, 0));
        builder.record(0, 5, &span_at(3, 2));
        let map = builder.finish(None);
        // Both entries map generated line 0 back to source line 3; only
        // the first is kept.
        assert_eq!(map.mappings.matches(',').count(), 0);
    }
}
