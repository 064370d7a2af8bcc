// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Header normalization
//!
//! Headers arrive as a native `HeaderMap`, a list of pairs, a plain mapping
//! or loosely-typed JSON. All of them flatten into [`Headers`]: an ordered
//! list that keeps the caller's key spelling but compares names
//! case-insensitively.

use std::collections::{BTreeMap, HashMap};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// Flat, ordered header collection with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a header, replacing any entry with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Add a value to a header, joining repeats with `", "`
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Remove a header, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(idx).1)
    }

    /// Overlay another collection; its values win
    pub fn extend(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to a native header map, skipping names or values the wire
    /// format cannot carry
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping header that is not valid on the wire"),
            }
        }
        map
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Any of the header shapes accepted at the API boundary
#[derive(Debug, Clone, Default)]
pub enum HeaderInput {
    /// No headers
    #[default]
    None,
    /// Native header collection
    Native(HeaderMap),
    /// `(name, value)` pairs; `None` values are dropped
    Pairs(Vec<(String, Option<String>)>),
    /// Already normalized
    Headers(Headers),
    /// Loosely-typed input: an object or an array of `[name, value]` pairs
    Json(Value),
}

impl From<HeaderMap> for HeaderInput {
    fn from(map: HeaderMap) -> Self {
        HeaderInput::Native(map)
    }
}

impl From<Headers> for HeaderInput {
    fn from(headers: Headers) -> Self {
        HeaderInput::Headers(headers)
    }
}

impl From<Value> for HeaderInput {
    fn from(value: Value) -> Self {
        HeaderInput::Json(value)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for HeaderInput {
    fn from(pairs: Vec<(K, V)>) -> Self {
        HeaderInput::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for HeaderInput {
    fn from(pairs: [(K, V); N]) -> Self {
        HeaderInput::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for HeaderInput {
    fn from(map: HashMap<K, V>) -> Self {
        HeaderInput::Pairs(
            map.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for HeaderInput {
    fn from(map: BTreeMap<K, V>) -> Self {
        HeaderInput::Pairs(
            map.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

/// Flatten any accepted header shape into [`Headers`].
///
/// Missing values are dropped and malformed shapes yield an empty
/// collection. Key spelling is preserved.
pub fn normalize_headers(raw: impl Into<HeaderInput>) -> Headers {
    let mut headers = Headers::new();
    match raw.into() {
        HeaderInput::None => {}
        HeaderInput::Native(map) => {
            for (name, value) in map.iter() {
                headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
            }
        }
        HeaderInput::Pairs(pairs) => {
            for (name, value) in pairs {
                if let (false, Some(value)) = (name.is_empty(), value) {
                    headers.insert(name, value);
                }
            }
        }
        HeaderInput::Headers(h) => headers = h,
        HeaderInput::Json(Value::Object(map)) => {
            for (name, value) in map {
                if let Some(value) = json_header_value(&value) {
                    headers.insert(name, value);
                }
            }
        }
        HeaderInput::Json(Value::Array(items)) => {
            for item in items {
                let Value::Array(pair) = item else { continue };
                if let [Value::String(name), value] = pair.as_slice() {
                    if let (false, Some(value)) = (name.is_empty(), json_header_value(value)) {
                        headers.insert(name.clone(), value);
                    }
                }
            }
        }
        HeaderInput::Json(_) => {}
    }
    headers
}

fn json_header_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
