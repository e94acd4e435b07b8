//! Input documents
//!
//! A document is an arbitrary tree of mappings, sequences and scalars. JSON
//! input always has string keys; YAML input may not, so keys are checked while
//! converting and anything other than a scalar key is rejected.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::data::errors::CoreError;

/// A nested document awaiting projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Document {
    pub fn new(content: Value) -> Self {
        Self(content)
    }

    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| CoreError::MalformedDocument(format!("invalid JSON: {}", e)))?;
        Ok(Self(value))
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, CoreError> {
        let value: YamlValue = serde_yaml::from_str(input)
            .map_err(|e| CoreError::MalformedDocument(format!("invalid YAML: {}", e)))?;
        Ok(Self(yaml_to_json(value, "$")?))
    }

    pub fn content(&self) -> &Value {
        &self.0
    }

    /// The root mapping, or `MalformedDocument` when the root is anything else.
    pub fn root(&self) -> Result<&Map<String, Value>, CoreError> {
        self.0.as_object().ok_or_else(|| {
            CoreError::MalformedDocument(format!(
                "document root must be a mapping, found {}",
                json_kind(&self.0)
            ))
        })
    }

    pub fn into_content(self) -> Value {
        self.0
    }
}

impl From<Value> for Document {
    fn from(content: Value) -> Self {
        Self(content)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn yaml_to_json(value: YamlValue, path: &str) -> Result<Value, CoreError> {
    match value {
        YamlValue::Null => Ok(Value::Null),
        YamlValue::Bool(b) => Ok(Value::Bool(b)),
        YamlValue::Number(n) => yaml_number(&n, path).map(Value::Number),
        YamlValue::String(s) => Ok(Value::String(s)),
        YamlValue::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| yaml_to_json(item, &format!("{}[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = yaml_key(key, path)?;
                let child_path = format!("{}.{}", path, key);
                let item = yaml_to_json(item, &child_path)?;
                // `1` and `"1"` are distinct YAML keys but the same JSON key
                if object.insert(key, item).is_some() {
                    return Err(CoreError::MalformedDocument(format!(
                        "duplicate mapping key at {}",
                        child_path
                    )));
                }
            }
            Ok(Value::Object(object))
        },
        // Tags carry no meaning for projection
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value, path),
    }
}

fn yaml_key(key: YamlValue, path: &str) -> Result<String, CoreError> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value, path),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err(CoreError::MalformedDocument(format!(
                "mapping key at {} is not a string-representable scalar",
                path
            )))
        },
    }
}

fn yaml_number(n: &serde_yaml::Number, path: &str) -> Result<Number, CoreError> {
    if let Some(i) = n.as_i64() {
        return Ok(Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Number::from(u));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| CoreError::MalformedDocument(format!("non-finite number at {}", path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_key_order() {
        let doc = Document::from_json_str(r#"{"z": 1, "a": {"m": 2, "b": 3}}"#).unwrap();
        let keys: Vec<&String> = doc.root().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = Document::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument(_)));
    }

    #[test]
    fn test_root_must_be_mapping() {
        for content in [json!([1, 2]), json!("text"), json!(null), json!(3)] {
            let doc = Document::new(content);
            assert!(matches!(doc.root(), Err(CoreError::MalformedDocument(_))));
        }
    }

    #[test]
    fn test_yaml_scalar_keys_are_stringified() {
        let doc = Document::from_yaml_str("1: one\ntrue: yes\n~: nothing\nname: x\n").unwrap();
        assert_eq!(
            doc.content(),
            &json!({"1": "one", "true": "yes", "null": "nothing", "name": "x"})
        );
    }

    #[test]
    fn test_yaml_nested_document() {
        let yaml = r#"
Advanced Decision Engine:
  Price Discovery:
    Aggregation:
      - Best bid/offer
      - VWAP
    weight: 0.5
"#;
        let doc = Document::from_yaml_str(yaml).unwrap();
        assert_eq!(
            doc.content(),
            &json!({
                "Advanced Decision Engine": {
                    "Price Discovery": {
                        "Aggregation": ["Best bid/offer", "VWAP"],
                        "weight": 0.5
                    }
                }
            })
        );
    }

    #[test]
    fn test_yaml_sequence_key_is_malformed() {
        let err = Document::from_yaml_str("outer:\n  ? [a, b]\n  : value\n").unwrap_err();
        match err {
            CoreError::MalformedDocument(message) => {
                assert!(message.contains("$.outer"), "unexpected message: {}", message);
            },
            other => panic!("Expected MalformedDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_yaml_mapping_key_is_malformed() {
        let err = Document::from_yaml_str("? {a: 1}\n: value\n").unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument(_)));
    }

    #[test]
    fn test_yaml_tagged_scalar_key_is_accepted() {
        let doc = Document::from_yaml_str("!concept name: x\nother: !concept y\n").unwrap();
        assert_eq!(doc.content(), &json!({"name": "x", "other": "y"}));
    }

    #[test]
    fn test_yaml_tagged_sequence_key_is_malformed() {
        let err = Document::from_yaml_str("? !concept [a, b]\n: value\n").unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument(_)));
    }

    #[test]
    fn test_yaml_keys_colliding_after_stringify_are_malformed() {
        for yaml in ["1: int\n\"1\": str\n", "true: a\n\"true\": b\n", "~: a\n\"null\": b\n"] {
            match Document::from_yaml_str(yaml).unwrap_err() {
                CoreError::MalformedDocument(message) => {
                    assert!(message.contains("duplicate mapping key"), "unexpected message: {}", message);
                },
                other => panic!("Expected MalformedDocument, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_yaml_non_finite_number_is_malformed() {
        let err = Document::from_yaml_str("a: .nan\n").unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument(_)));
    }
}
