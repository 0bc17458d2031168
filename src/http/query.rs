//! Query-string helpers

use url::form_urlencoded;

/// The value of `key` if it occurs exactly once in `query`.
///
/// A repeated key is ambiguous and treated the same as a missing one.
pub fn single_value(query: Option<&str>, key: &str) -> Option<String> {
    let mut values = form_urlencoded::parse(query?.as_bytes())
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned());
    let first = values.next()?;
    values.next().is_none().then_some(first)
}

/// Percent-encode `value` for use inside a query component.
///
/// `/` is legal there and stays literal so file paths remain readable.
pub fn encode_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
}

/// Editor URL for the file at `path`
pub fn editor_url(path: &str) -> String {
    format!("/?file={}", encode_value(path))
}
