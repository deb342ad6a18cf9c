//! `string.*` built-ins (spec §4.1: `length`/`to-upper-case`/
//! `to-lower-case`/`quote`/`unquote`/`index`/`insert`/`slice`).

use sass_common::SassResult;

use super::Args;
use crate::value::{Number, SassString, Value};

/// 1-indexed, negative-from-end string index -> 0-based code point
/// index, clamped into range (spec §4.1 string functions share list's
/// negative-index convention).
fn resolve_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    let zero_based = if index > 0 { index - 1 } else { len + index };
    zero_based.clamp(0, len) as usize
}

pub(super) fn dispatch(name: &str, args: &mut Args) -> SassResult<Option<Value>> {
    Ok(Some(match name {
        "length" => {
            let s = args.string_text(args.required(0, "string", name)?, "string")?;
            Value::Number(Number::unitless(s.chars().count() as f64))
        }
        "to-upper-case" => {
            let v = args.required(0, "string", name)?;
            let quoted = matches!(&v, Value::String(s) if s.is_quoted());
            let text = args.string_text(v, "string")?.to_uppercase();
            Value::String(if quoted { SassString::quoted(text) } else { SassString::unquoted(text) })
        }
        "to-lower-case" => {
            let v = args.required(0, "string", name)?;
            let quoted = matches!(&v, Value::String(s) if s.is_quoted());
            let text = args.string_text(v, "string")?.to_lowercase();
            Value::String(if quoted { SassString::quoted(text) } else { SassString::unquoted(text) })
        }
        "quote" => Value::String(SassString::quoted(args.string_text(args.required(0, "string", name)?, "string")?)),
        "unquote" => Value::String(SassString::unquoted(args.string_text(args.required(0, "string", name)?, "string")?)),
        "index" => {
            let s = args.string_text(args.required(0, "string", name)?, "string")?;
            let needle = args.string_text(args.required(1, "substring", name)?, "substring")?;
            let chars: Vec<char> = s.chars().collect();
            let needle_chars: Vec<char> = needle.chars().collect();
            match chars.windows(needle_chars.len().max(1)).position(|w| w == needle_chars.as_slice()) {
                Some(pos) if !needle_chars.is_empty() => Value::Number(Number::unitless((pos + 1) as f64)),
                _ => Value::Null,
            }
        }
        "insert" => {
            let v = args.required(0, "string", name)?;
            let quoted = matches!(&v, Value::String(s) if s.is_quoted());
            let s = args.string_text(v, "string")?;
            let insert = args.string_text(args.required(1, "insert", name)?, "insert")?;
            let index = args.number(args.required(2, "index", name)?, "index")?.value() as i64;
            let mut chars: Vec<char> = s.chars().collect();
            let at = resolve_index(index, chars.len());
            chars.splice(at..at, insert.chars());
            let text = chars.into_iter().collect::<String>();
            Value::String(if quoted { SassString::quoted(text) } else { SassString::unquoted(text) })
        }
        "slice" => {
            let v = args.required(0, "string", name)?;
            let quoted = matches!(&v, Value::String(s) if s.is_quoted());
            let s = args.string_text(v, "string")?;
            let chars: Vec<char> = s.chars().collect();
            let start = args.number(args.required(1, "start-at", name)?, "start-at")?.value() as i64;
            let end = match args.get(2, "end-at") {
                Some(v) => args.number(v, "end-at")?.value() as i64,
                None => -1,
            };
            let start_idx = resolve_index(start, chars.len());
            let end_idx = (resolve_index(end, chars.len()) + 1).min(chars.len());
            let text = if start_idx >= end_idx { String::new() } else { chars[start_idx..end_idx].iter().collect() };
            Value::String(if quoted { SassString::quoted(text) } else { SassString::unquoted(text) })
        }
        _ => return Ok(None),
    }))
}
