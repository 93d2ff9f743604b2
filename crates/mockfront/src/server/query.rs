//! Query-string normalization.

use std::borrow::Cow;
use std::collections::HashMap;

/// Parse a raw query string into one value per key.
///
/// Pairs split on `&`, key and value on the first `=`. `+` decodes to a
/// space before percent-decoding. A key without `=` maps to the empty
/// string, empty segments are skipped, and a repeated key keeps its first
/// value.
pub fn parse_query_string(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some(query) = query else {
        return params;
    };

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.entry(decode(key)).or_insert_with(|| decode(value));
    }
    params
}

/// Percent-decode a request path so it compares against rule URIs as written.
///
/// `+` is literal in a path. Invalid UTF-8 after decoding keeps the path as sent.
pub fn decode_path(path: &str) -> Cow<'_, str> {
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        // Invalid UTF-8 after decoding: keep the text as sent
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_parsing() {
        let params = parse_query_string(Some("page=1&sort=desc&filter=active"));
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("page"), Some(&"1".to_string()));
        assert_eq!(params.get("sort"), Some(&"desc".to_string()));
        assert_eq!(params.get("filter"), Some(&"active".to_string()));
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query_string(None).is_empty());
        assert!(parse_query_string(Some("")).is_empty());
        assert!(parse_query_string(Some("&&")).is_empty());
    }

    #[test]
    fn test_decoding() {
        let params = parse_query_string(Some("name=hello%20world&q=a+b&k%26=v%3D"));
        assert_eq!(params.get("name"), Some(&"hello world".to_string()));
        assert_eq!(params.get("q"), Some(&"a b".to_string()));
        assert_eq!(params.get("k&"), Some(&"v=".to_string()));
    }

    #[test]
    fn test_key_without_value() {
        let params = parse_query_string(Some("flag&x="));
        assert_eq!(params.get("flag"), Some(&String::new()));
        assert_eq!(params.get("x"), Some(&String::new()));
    }

    #[test]
    fn test_repeated_key_keeps_first_value() {
        let params = parse_query_string(Some("id=1&id=2"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some(&"1".to_string()));
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/users"), "/users");
        assert_eq!(decode_path("/caf%C3%A9"), "/café");
        assert_eq!(decode_path("/a%20b"), "/a b");
        assert_eq!(decode_path("/a+b"), "/a+b");
        assert_eq!(decode_path("/bad%FF"), "/bad%FF");
    }

    #[test]
    fn test_value_containing_equals() {
        let params = parse_query_string(Some("expr=a=b"));
        assert_eq!(params.get("expr"), Some(&"a=b".to_string()));
    }
}
