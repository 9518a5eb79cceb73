//! Conversions from the crate's records into [`gtmpl_value::Value`]s so they
//! can be referenced from templates.

use crate::article::ResolvedArticle;
use crate::contributor::Contributor;
use gtmpl_value::Value;
use std::collections::HashMap;

fn string_or_empty(s: &Option<String>) -> Value {
    Value::String(s.clone().unwrap_or_default())
}

impl From<&Contributor> for Value {
    /// Exposes `name`, `wittycism`, `url`, `headshot`, `twitter` and any extra
    /// registry keys. Missing optional fields render as empty strings, which
    /// templates treat as false in `{{if}}`.
    fn from(c: &Contributor) -> Value {
        let mut m: HashMap<String, Value> = c
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), from_yaml(v)))
            .collect();
        m.insert("name".to_owned(), Value::String(c.name.clone()));
        m.insert("wittycism".to_owned(), string_or_empty(&c.wittycism));
        m.insert("url".to_owned(), string_or_empty(&c.url));
        m.insert("headshot".to_owned(), string_or_empty(&c.headshot));
        m.insert("twitter".to_owned(), string_or_empty(&c.twitter));
        Value::Object(m)
    }
}

impl From<&ResolvedArticle> for Value {
    fn from(a: &ResolvedArticle) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(a.title.clone()));
        m.insert(
            "authors".to_owned(),
            Value::Array(a.authors.iter().cloned().map(Value::String).collect()),
        );
        // Pre-joined for the title-link convention the anchor rewriter
        // expects ("A, B, C").
        m.insert(
            "authors_joined".to_owned(),
            Value::String(a.authors.join(", ")),
        );
        m.insert("summary".to_owned(), Value::String(a.summary.clone()));
        m.insert("contributor".to_owned(), (&a.contributor).into());
        m.insert("url".to_owned(), Value::String(a.url.clone()));
        Value::Object(m)
    }
}

/// Converts an arbitrary YAML tree (e.g., the standard content) into a
/// template value.
pub fn from_yaml(v: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match v {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .filter_map(|(k, v)| key_string(k).map(|k| (k, from_yaml(v))))
                .collect(),
        ),
    }
}

fn key_string(k: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value as Yaml;
    match k {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
