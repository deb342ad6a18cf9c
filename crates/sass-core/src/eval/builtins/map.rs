//! `map.*` built-ins (spec §4.1: `get`/`set`/`merge`/`remove`/`keys`/
//! `values`/`has-key`).

use sass_common::SassResult;

use crate::value::{ListSeparator, SassList, SassMap, Value};

use super::Args;

fn as_map(value: &Value, args: &Args, fn_name: &str) -> SassResult<SassMap> {
    match value {
        Value::Map(m) => Ok((**m).clone()),
        Value::List(l) if l.is_empty() => Ok(SassMap::new()),
        other => Err(args.type_error(format!("{} is not a map; {fn_name}() expects a map", other.to_css()))),
    }
}

pub(super) fn dispatch(name: &str, args: &mut Args) -> SassResult<Option<Value>> {
    Ok(Some(match name {
        "get" => {
            let map = as_map(&args.required(0, "map", name)?, args, name)?;
            let key = args.required(1, "key", name)?;
            map.get(&key).cloned().unwrap_or(Value::Null)
        }
        "has-key" => {
            let map = as_map(&args.required(0, "map", name)?, args, name)?;
            let key = args.required(1, "key", name)?;
            Value::Boolean(map.get(&key).is_some())
        }
        "set" => {
            let mut map = as_map(&args.required(0, "map", name)?, args, name)?;
            let key = args.required(1, "key", name)?;
            let value = args.required(2, "value", name)?;
            map.insert(key, value);
            Value::Map(Box::new(map))
        }
        "merge" => {
            let a = as_map(&args.required(0, "map1", name)?, args, name)?;
            let b = as_map(&args.required(1, "map2", name)?, args, name)?;
            Value::Map(Box::new(a.merged_with(&b)))
        }
        "remove" => {
            let mut map = as_map(&args.required(0, "map", name)?, args, name)?;
            let mut i = 1;
            while let Some(key) = args.get(i, &format!("key{i}")) {
                map.remove(&key);
                i += 1;
            }
            Value::Map(Box::new(map))
        }
        "keys" => {
            let map = as_map(&args.required(0, "map", name)?, args, name)?;
            Value::List(Box::new(SassList::new(map.keys().cloned().collect(), ListSeparator::Comma, false)))
        }
        "values" => {
            let map = as_map(&args.required(0, "map", name)?, args, name)?;
            Value::List(Box::new(SassList::new(map.values().cloned().collect(), ListSeparator::Comma, false)))
        }
        _ => return Ok(None),
    }))
}
