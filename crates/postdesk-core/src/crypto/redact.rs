//! Redaction of secret-looking fields for logging.
//!
//! A field is sensitive when one of the words in its name is in
//! [`SENSITIVE_WORDS`]. Names are split on camelCase humps and on `_`, `-`,
//! `.` and spaces, and each word is ASCII-lowercased, so `newsApiKey`,
//! `x_bearer_token` and `Auth-Header` all match while `monkey` and `author`
//! do not.

use serde_json::{Map, Value};

/// Replacement written over sensitive values.
pub const REDACTED: &str = "[REDACTED]";

/// Words that mark a field as sensitive.
pub const SENSITIVE_WORDS: &[&str] = &[
    "password",
    "apikey",
    "token",
    "secret",
    "key",
    "auth",
    "credential",
    "credentials",
];

/// Whether a field name names a secret.
pub fn is_sensitive_field(name: &str) -> bool {
    name_words(name)
        .iter()
        .any(|word| SENSITIVE_WORDS.contains(&word.as_str()))
}

/// Copy of `value` with every sensitive field replaced by [`REDACTED`].
///
/// Recurses through nested objects and arrays. Only meant for log output;
/// never store the result.
pub fn redact_for_logging(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::with_capacity(map.len());
            for (name, field) in map {
                let field = if is_sensitive_field(name) {
                    Value::String(REDACTED.to_string())
                } else {
                    redact_for_logging(field)
                };
                redacted.insert(name.clone(), field);
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_for_logging).collect()),
        other => other.clone(),
    }
}

fn name_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_words() {
        assert_eq!(name_words("newsApiKey"), vec!["news", "api", "key"]);
        assert_eq!(name_words("x_bearer_token"), vec!["x", "bearer", "token"]);
        assert_eq!(name_words("APIKEY"), vec!["apikey"]);
        assert_eq!(name_words("Auth-Header"), vec!["auth", "header"]);
    }

    #[test]
    fn test_sensitive_fields() {
        for name in ["password", "newsApiKey", "x_api_secret", "xBearerToken", "apikey", "Credentials"] {
            assert!(is_sensitive_field(name), "{} should be sensitive", name);
        }
        for name in ["theme", "monkey", "author", "maxBackups", "keyboardLayout"] {
            assert!(!is_sensitive_field(name), "{} should not be sensitive", name);
        }
    }

    #[test]
    fn test_redacts_nested_values() {
        let input = json!({
            "theme": "dark",
            "openaiApiKey": "sk-live",
            "profile": {
                "name": "ana",
                "password": "pw",
                "sessions": [{"token": "t1", "device": "laptop"}]
            }
        });

        let output = redact_for_logging(&input);

        assert_eq!(output["theme"], "dark");
        assert_eq!(output["openaiApiKey"], REDACTED);
        assert_eq!(output["profile"]["name"], "ana");
        assert_eq!(output["profile"]["password"], REDACTED);
        assert_eq!(output["profile"]["sessions"][0]["token"], REDACTED);
        assert_eq!(output["profile"]["sessions"][0]["device"], "laptop");
    }

    #[test]
    fn test_sensitive_object_replaced_whole() {
        let output = redact_for_logging(&json!({"auth": {"user": "a", "pass": "b"}}));
        assert_eq!(output["auth"], REDACTED);
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(redact_for_logging(&json!(42)), json!(42));
        assert_eq!(redact_for_logging(&json!("sk-live")), json!("sk-live"));
        assert_eq!(redact_for_logging(&Value::Null), Value::Null);
    }
}
