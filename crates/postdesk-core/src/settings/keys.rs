//! Setting key conventions.

/// Keys whose values are encrypted on write.
pub const SENSITIVE_KEYS: &[&str] = &[
    "news_api_key",
    "openai_api_key",
    "x_api_key",
    "x_api_secret",
    "x_bearer_token",
];

/// Exact membership test against [`SENSITIVE_KEYS`].
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.contains(&key)
}

/// Map a camelCase field name to its snake_case setting key.
///
/// An underscore is inserted before every ASCII uppercase letter, then the
/// whole name is lowercased: `newsApiKey` becomes `news_api_key`.
pub fn camel_to_snake(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            key.push('_');
        }
        key.push(c.to_ascii_lowercase());
    }
    key
}
