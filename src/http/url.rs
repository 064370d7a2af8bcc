// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL composition: base + path joining and query serialization

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use url::form_urlencoded;

lazy_static! {
    static ref ABSOLUTE_HTTP_URL: Regex =
        Regex::new(r"(?i)^https?://").expect("absolute URL pattern is valid");
}

/// Check if `url` is an absolute http(s) URL
pub fn is_absolute_url(url: &str) -> bool {
    ABSOLUTE_HTTP_URL.is_match(url)
}

/// Join a base URL and a path.
///
/// Absolute http(s) paths are returned unchanged. Otherwise trailing slashes
/// of the base and leading slashes of the path collapse into one `/`.
pub fn build_url(base_url: Option<&str>, path: &str) -> String {
    let base = match base_url {
        Some(base) if !base.is_empty() => base,
        _ => return path.to_string(),
    };
    if is_absolute_url(path) {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Skipped during serialization
    Null,
    /// Appended once
    Scalar(String),
    /// Appended once per element; `None` elements are skipped
    List(Vec<Option<String>>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(|v| Some(v.to_string())).collect())
    }
}

macro_rules! scalar_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::Scalar(value.to_string())
            }
        })*
    };
}

scalar_param!(i32, i64, u16, u32, u64, usize, f64, bool);

/// Query parameters attached to a request
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Key/value mapping, serialized by the default serializer
    Map(Vec<(String, ParamValue)>),
    /// Pre-built query pairs, encoded as-is
    Pairs(Vec<(String, String)>),
    /// Pre-encoded query string
    Query(String),
}

impl Params {
    /// Start an empty mapping
    pub fn new() -> Self {
        Params::Map(Vec::new())
    }

    /// Add a key to a mapping; other shapes are left untouched
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        if let Params::Map(entries) = &mut self {
            entries.push((key.into(), value.into()));
        }
        self
    }

    /// Build a mapping from a JSON object; other JSON shapes give an empty map
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Params::new();
        };
        Params::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), json_param(v)))
                .collect(),
        )
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::new()
    }
}

impl From<&str> for Params {
    fn from(query: &str) -> Self {
        Params::Query(query.to_string())
    }
}

impl From<String> for Params {
    fn from(query: String) -> Self {
        Params::Query(query)
    }
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_param(value: &Value) -> ParamValue {
    match value {
        Value::Null => ParamValue::Null,
        Value::Array(items) => ParamValue::List(items.iter().map(json_scalar).collect()),
        other => json_scalar(other).map_or(ParamValue::Null, ParamValue::Scalar),
    }
}

/// Custom query serializer
///
/// Implemented for any `Fn(&Params) -> String`, so both closures and
/// serializer objects plug in the same way.
pub trait ParamsSerializer: Send + Sync {
    fn serialize(&self, params: &Params) -> String;
}

impl<F> ParamsSerializer for F
where
    F: Fn(&Params) -> String + Send + Sync,
{
    fn serialize(&self, params: &Params) -> String {
        self(params)
    }
}

/// Default serialization (URLSearchParams semantics)
pub fn serialize_params(params: &Params) -> String {
    match params {
        Params::Query(query) => query.clone(),
        Params::Pairs(pairs) => {
            let mut out = form_urlencoded::Serializer::new(String::new());
            for (k, v) in pairs {
                out.append_pair(k, v);
            }
            out.finish()
        }
        Params::Map(entries) => {
            let mut out = form_urlencoded::Serializer::new(String::new());
            for (key, value) in entries {
                match value {
                    ParamValue::Null => {}
                    ParamValue::Scalar(v) => {
                        out.append_pair(key, v);
                    }
                    ParamValue::List(items) => {
                        for item in items.iter().flatten() {
                            out.append_pair(key, item);
                        }
                    }
                }
            }
            out.finish()
        }
    }
}

/// Append serialized `params` to `url`.
///
/// Uses `&` when the URL already has a query. An empty serialization leaves
/// the URL unchanged.
pub fn append_params(
    url: &str,
    params: Option<&Params>,
    serializer: Option<&dyn ParamsSerializer>,
) -> String {
    let Some(params) = params else {
        return url.to_string();
    };
    let serialized = match serializer {
        Some(serializer) => serializer.serialize(params),
        None => serialize_params(params),
    };
    if serialized.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, serialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url_joins_with_single_slash() {
        assert_eq!(
            build_url(Some("https://api.example.com///"), "//users/5"),
            "https://api.example.com/users/5"
        );
        assert_eq!(
            build_url(Some("https://api.example.com"), "users"),
            "https://api.example.com/users"
        );
    }

    #[test]
    fn test_build_url_keeps_absolute_path() {
        let absolute = "HTTPS://cdn.example.com/a.png";
        assert_eq!(build_url(Some("https://api.example.com"), absolute), absolute);

        let once = build_url(Some("https://api.example.com"), "/users");
        assert_eq!(build_url(Some("https://other.example.com"), &once), once);
    }

    #[test]
    fn test_build_url_without_base() {
        assert_eq!(build_url(None, "/users"), "/users");
        assert_eq!(build_url(Some(""), "/users"), "/users");
    }

    #[test]
    fn test_default_serializer_repeats_arrays_and_skips_nulls() {
        let params = Params::new()
            .set("page", 2u32)
            .set("tag", vec!["a", "b c"])
            .set("missing", None::<String>);

        assert_eq!(serialize_params(&params), "page=2&tag=a&tag=b+c");
    }

    #[test]
    fn test_params_from_json() {
        let params = Params::from_json(&json!({"ids": [1, null, 3], "q": null, "sort": "asc"}));
        assert_eq!(serialize_params(&params), "ids=1&ids=3&sort=asc");
    }

    #[test]
    fn test_append_params_separator() {
        let params = Params::new().set("a", "1");
        assert_eq!(append_params("/x", Some(&params), None), "/x?a=1");
        assert_eq!(append_params("/x?z=0", Some(&params), None), "/x?z=0&a=1");
    }

    #[test]
    fn test_append_params_empty_result_keeps_url() {
        let params = Params::new().set("a", None::<String>);
        assert_eq!(append_params("/x", Some(&params), None), "/x");
        assert_eq!(append_params("/x", None, None), "/x");
        assert_eq!(append_params("/x", Some(&Params::from("")), None), "/x");
    }

    #[test]
    fn test_query_string_passes_through() {
        let params = Params::from("raw=%20already");
        assert_eq!(append_params("/x", Some(&params), None), "/x?raw=%20already");
    }

    #[test]
    fn test_custom_serializer() {
        let serializer = |params: &Params| match params {
            Params::Map(entries) => entries
                .iter()
                .map(|(k, _)| k.clone())
                .collect::<Vec<_>>()
                .join(","),
            _ => String::new(),
        };
        let params = Params::new().set("a", 1i32).set("b", 2i32);
        assert_eq!(append_params("/x", Some(&params), Some(&serializer)), "/x?a,b");
    }
}
