// JSON import (array of flat objects)

use std::collections::HashMap;

use docalign_align::{Scalar, Table};
use serde_json::Value;

use crate::error::LoadError;
use crate::loader::LoadOptions;

/// Load a top-level JSON array of objects. Columns are the union of object
/// keys in first-seen order; absent keys are `Null`. Nested arrays and objects
/// are kept as their JSON text.
pub fn import_bytes(bytes: &[u8], source_name: &str, options: &LoadOptions) -> Result<Table, LoadError> {
    let parse_err = |message: String| LoadError::Parse {
        source_name: source_name.to_string(),
        message,
    };

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Table::default());
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| parse_err(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(parse_err("expected a top-level array of objects".into()));
    };

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(map) = item else {
            return Err(parse_err(format!("element {i} is not an object")));
        };
        for key in map.keys() {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
        objects.push(map);
    }

    let rows = objects
        .into_iter()
        .map(|map| {
            let mut row = vec![Scalar::Null; columns.len()];
            for (key, value) in map {
                row[positions[&key]] = json_to_scalar(value, options.infer_types);
            }
            row
        })
        .collect();

    Table::new(columns, rows).map_err(|e| parse_err(e.to_string()))
}

fn json_to_scalar(value: Value, infer_types: bool) -> Scalar {
    let typed = match value {
        Value::Null => return Scalar::Null,
        Value::String(s) => return Scalar::Text(s),
        Value::Bool(b) => Scalar::Bool(b),
        Value::Number(n) => match n.as_f64() {
            Some(f) => Scalar::Number(f),
            None => return Scalar::Text(n.to_string()),
        },
        nested @ (Value::Array(_) | Value::Object(_)) => return Scalar::Text(nested.to_string()),
    };

    if infer_types {
        typed
    } else {
        Scalar::Text(typed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(json: &str) -> Result<Table, LoadError> {
        import_bytes(json.as_bytes(), "data.json", &LoadOptions::default())
    }

    #[test]
    fn test_union_of_keys_in_order() {
        let t = load(r#"[{"id": 1, "name": "a"}, {"extra": true, "id": "2"}]"#).unwrap();
        assert_eq!(t.columns(), ["id", "name", "extra"]);
        assert_eq!(t.rows()[0], vec![Scalar::Number(1.0), "a".into(), Scalar::Null]);
        assert_eq!(t.rows()[1], vec![Scalar::text("2"), Scalar::Null, Scalar::Bool(true)]);
    }

    #[test]
    fn test_nested_values_are_text() {
        let t = load(r#"[{"id": 1, "tags": ["x", "y"]}]"#).unwrap();
        assert_eq!(t.get(0, "tags"), Some(&Scalar::text(r#"["x","y"]"#)));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(load("").unwrap().is_empty());
        assert!(load("[]").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_array() {
        let err = load(r#"{"id": 1}"#).unwrap_err();
        assert!(err.to_string().contains("top-level array"));
        let err = load("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("element 0 is not an object"));
        assert!(matches!(load("[{"), Err(LoadError::Parse { .. })));
    }
}
