//! `list.*` built-ins (spec §4.1: `length`/`nth`/`set-nth`/`join`/
//! `append`/`zip`/`index`/`separator`/`is-bracketed`).

use sass_common::SassResult;

use super::Args;
use crate::value::{ListSeparator, Number, SassList, SassString, Value};

fn separator_from_name(text: &str, fn_name: &str, args: &Args) -> SassResult<ListSeparator> {
    match text {
        "comma" => Ok(ListSeparator::Comma),
        "space" => Ok(ListSeparator::Space),
        "slash" => Ok(ListSeparator::Slash),
        "auto" => Ok(ListSeparator::Undecided),
        other => Err(args.invalid_argument(format!("{other} is not a valid separator for {fn_name}() ($separator)"))),
    }
}

pub(super) fn dispatch(name: &str, args: &mut Args) -> SassResult<Option<Value>> {
    Ok(Some(match name {
        "length" => {
            let v = args.required(0, "list", name)?;
            Value::Number(Number::unitless(v.as_list_contents().len() as f64))
        }
        "nth" => {
            let v = args.required(0, "list", name)?;
            let index = args.number(args.required(1, "n", name)?, "n")?.value() as i64;
            let list = args.list(v);
            list.nth(index).cloned().ok_or_else(|| args.invalid_argument(format!("invalid index {index} for a list of length {}", list.len())))?
        }
        "set-nth" => {
            let v = args.required(0, "list", name)?;
            let index = args.number(args.required(1, "n", name)?, "n")?.value() as i64;
            let replacement = args.required(2, "value", name)?;
            let mut list = args.list(v);
            let len = list.len() as i64;
            let zero_based = if index > 0 { index - 1 } else { len + index };
            if zero_based < 0 || zero_based >= len {
                return Err(args.invalid_argument(format!("invalid index {index} for a list of length {len}")));
            }
            let sep = list.separator();
            let brackets = list.has_brackets();
            let mut contents = list.contents().to_vec();
            contents[zero_based as usize] = replacement;
            list = SassList::new(contents, sep, brackets);
            Value::List(Box::new(list))
        }
        "append" => {
            let v = args.required(0, "list", name)?;
            let item = args.required(1, "val", name)?;
            let explicit_sep = match args.get(2, "separator") {
                Some(Value::String(s)) => Some(separator_from_name(s.as_str(), name, args)?),
                _ => None,
            };
            let sep = explicit_sep.unwrap_or_else(|| v.list_separator());
            let mut contents = v.as_list_contents();
            contents.push(item);
            let brackets = matches!(&v, Value::List(l) if l.has_brackets());
            Value::List(Box::new(SassList::new(contents, sep, brackets)))
        }
        "join" => {
            let list1 = args.required(0, "list1", name)?;
            let list2 = args.required(1, "list2", name)?;
            let sep = match args.get(2, "separator") {
                Some(Value::String(s)) => separator_from_name(s.as_str(), name, args)?,
                _ => {
                    let l1 = list1.list_separator();
                    if l1 == ListSeparator::Undecided { list2.list_separator() } else { l1 }
                }
            };
            let bracketed = match args.get(3, "bracketed") {
                Some(v) => v.is_truthy(),
                None => matches!(&list1, Value::List(l) if l.has_brackets()),
            };
            let mut contents = list1.as_list_contents();
            contents.extend(list2.as_list_contents());
            Value::List(Box::new(SassList::new(contents, sep, bracketed)))
        }
        "zip" => {
            let lists: Vec<Vec<Value>> = args.positional.iter().map(Value::as_list_contents).collect();
            let min_len = lists.iter().map(Vec::len).min().unwrap_or(0);
            let mut rows = Vec::with_capacity(min_len);
            for i in 0..min_len {
                let row: Vec<Value> = lists.iter().map(|l| l[i].clone()).collect();
                rows.push(Value::List(Box::new(SassList::new(row, ListSeparator::Space, false))));
            }
            Value::List(Box::new(SassList::new(rows, ListSeparator::Comma, false)))
        }
        "index" => {
            let v = args.required(0, "list", name)?;
            let target = args.required(1, "value", name)?;
            let contents = v.as_list_contents();
            match contents.iter().position(|item| item.fuzzy_eq(&target)) {
                Some(pos) => Value::Number(Number::unitless((pos + 1) as f64)),
                None => Value::Null,
            }
        }
        "separator" => {
            let v = args.required(0, "list", name)?;
            Value::String(SassString::unquoted(match v.list_separator() {
                ListSeparator::Comma => "comma",
                ListSeparator::Space => "space",
                ListSeparator::Slash => "slash",
                ListSeparator::Undecided => "space",
            }))
        }
        "is-bracketed" => {
            let v = args.required(0, "list", name)?;
            Value::Boolean(matches!(&v, Value::List(l) if l.has_brackets()))
        }
        _ => return Ok(None),
    }))
}
