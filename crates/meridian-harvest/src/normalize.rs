//! Response-body normalization.
//!
//! Peers are tolerated through two common non-conformances, both fixed
//! before parsing:
//!
//! - **Percent-escaped bodies**: some gateways deliver the JSON payload
//!   percent-encoded; a body that does not start with a JSON delimiter
//!   but decodes to one is decoded first.
//! - **Vendor-prefixed keys**: the namespace-prefix analogue in the JSON
//!   rendition. A key like `csw:searchResults` is exposed under its
//!   unprefixed name when that name is not already present.

use serde_json::Value;

/// Percent-decodes a body that arrived escaped; returns the input
/// untouched otherwise.
pub(crate) fn normalize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return body.to_string();
    }
    match percent_decode(trimmed) {
        Some(decoded)
            if decoded.trim_start().starts_with('{') || decoded.trim_start().starts_with('[') =>
        {
            tracing::debug!("percent-decoded an escaped response body");
            decoded
        }
        _ => body.to_string(),
    }
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3)?;
                let hex = std::str::from_utf8(hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

/// Recursively exposes vendor-prefixed object keys under their
/// unprefixed names.
pub(crate) fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut normalized = serde_json::Map::with_capacity(map.len());
            for (key, inner) in map {
                let inner = normalize_keys(inner);
                let stripped = key.split_once(':').map(|(_, rest)| rest.to_string());
                match stripped {
                    Some(unprefixed) if !normalized.contains_key(&unprefixed) => {
                        normalized.insert(unprefixed, inner);
                    }
                    _ => {
                        normalized.insert(key, inner);
                    }
                }
            }
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_bodies_pass_through() {
        let body = r#"{"results": {}}"#;
        assert_eq!(normalize_body(body), body);
    }

    #[test]
    fn escaped_bodies_are_decoded() {
        let body = "%7B%22results%22%3A%20%7B%7D%7D";
        assert_eq!(normalize_body(body), r#"{"results": {}}"#);
    }

    #[test]
    fn garbage_is_left_untouched() {
        let body = "not json at all";
        assert_eq!(normalize_body(body), body);
    }

    #[test]
    fn prefixed_keys_are_exposed_unprefixed() {
        let value = serde_json::json!({
            "csw:results": { "ogc:numberOfRecordsMatched": 2 },
        });
        let normalized = normalize_keys(value);
        assert_eq!(normalized["results"]["numberOfRecordsMatched"], 2);
    }

    #[test]
    fn existing_unprefixed_keys_win() {
        let value = serde_json::json!({
            "results": 1,
            "csw:results": 2,
        });
        let normalized = normalize_keys(value);
        assert_eq!(normalized["results"], 1);
    }
}
