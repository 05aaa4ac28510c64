use std::collections::HashMap;

/// Parse query parameters from a URI or a bare query string.
///
/// Handles URL decoding. Multiple values for the same key are not
/// supported (only the last is kept).
///
/// # Example
/// ```
/// use netfeed::core::query_params::parse_query_params;
///
/// let params = parse_query_params("/?following=true&page=2");
/// assert_eq!(params.get("following"), Some(&"true".to_string()));
/// assert_eq!(params.get("page"), Some(&"2".to_string()));
/// ```
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let query = match uri.split_once('?') {
        Some((_, query)) => query,
        None if uri.contains('=') => uri,
        None => return HashMap::new(),
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            (key.to_string(), value)
        })
        .collect()
}

/// True only for `key=true`; a bare `key` or any other value is false.
pub fn get_bool_flag(params: &HashMap<String, String>, key: &str) -> bool {
    params.get(key).is_some_and(|v| v == "true")
}
