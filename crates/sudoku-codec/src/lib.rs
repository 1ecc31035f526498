//! Deterministic canonical JSON serialization and content hashing.
//!
//! `canonicalize` turns a [`serde_json::Value`] into byte-stable output:
//! mapping keys sorted by their UTF-8 encoding, every string normalised to
//! Unicode NFC, numbers rendered with the shortest round-tripping
//! representation, and no insignificant whitespace. Two semantically equal
//! inputs that differ only in key order or Unicode composition canonicalize
//! to identical bytes.

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Errors raised while canonicalizing a value or computing a digest.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("non-finite number at {path}: JCS payloads forbid NaN and infinities")]
    NonFiniteNumber { path: String },
    #[error("unsupported JSON null at {path} inside a tuple/array position")]
    UnsupportedValue { path: String },
}

/// Recursively canonicalize `value` and return the UTF-8 byte encoding.
pub fn canonicalize(value: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
    let mut out = String::new();
    write_canonical(value, "$", &mut out)?;
    Ok(out.into_bytes())
}

/// Convenience wrapper returning the canonical bytes as a `String`.
pub fn canonicalize_to_string(value: &serde_json::Value) -> Result<String, CodecError> {
    canonicalize(value).map(|bytes| String::from_utf8(bytes).expect("canonical output is UTF-8"))
}

fn write_canonical(value: &serde_json::Value, path: &str, out: &mut String) -> Result<(), CodecError> {
    match value {
        serde_json::Value::Null => {
            out.push_str("null");
            Ok(())
        }
        serde_json::Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        serde_json::Value::Number(n) => {
            out.push_str(&canonical_number(n, path)?);
            Ok(())
        }
        serde_json::Value::String(s) => {
            write_canonical_string(s, out);
            Ok(())
        }
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, &format!("{path}[{i}]"), out)?;
            }
            out.push(']');
            Ok(())
        }
        serde_json::Value::Object(map) => {
            // serde_json's default Map is a BTreeMap, so iteration order is
            // already lexicographic by key; sort explicitly anyway so the
            // guarantee does not depend on the crate's internal feature set.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_string(key, out);
                out.push(':');
                write_canonical(&map[*key], &format!("{path}.{key}"), out)?;
            }
            out.push('}');
            Ok(())
        }
    }
}

fn write_canonical_string(s: &str, out: &mut String) {
    let normalized: String = s.nfc().collect();
    out.push('"');
    for c in normalized.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn canonical_number(n: &serde_json::Number, path: &str) -> Result<String, CodecError> {
    if let Some(i) = n.as_i64() {
        return Ok(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.to_string());
    }
    let f = n.as_f64().ok_or_else(|| CodecError::UnsupportedValue {
        path: path.to_string(),
    })?;
    if !f.is_finite() {
        return Err(CodecError::NonFiniteNumber {
            path: path.to_string(),
        });
    }
    // Rust's `f64` Display already emits the shortest decimal string that
    // round-trips back to the same value (Grisu3/Ryu under the hood).
    let rendered = format!("{f}");
    Ok(if rendered.ends_with(".0") {
        rendered[..rendered.len() - 2].to_string()
    } else {
        rendered
    })
}

/// Compute the lowercase-hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_lower(&hasher.finalize())
}

/// Compute a `"sha256-" + hex` digest of `bytes`, the format used for every
/// content-addressed identifier in this pipeline.
pub fn sha256_prefixed(bytes: &[u8]) -> String {
    format!("sha256-{}", sha256_hex(bytes))
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

/// Compute `"sha256-" + hex(sha256(canonicalize(value_without_artifact_id)))`.
///
/// The `artifact_id` key (if present) is removed before canonicalization so
/// that computing the id is idempotent: hashing an artifact that already
/// carries its own id yields the same id.
pub fn compute_artifact_id(value: &serde_json::Value) -> Result<String, CodecError> {
    let mut without_id = value.clone();
    if let serde_json::Value::Object(map) = &mut without_id {
        map.remove("artifact_id");
    }
    let bytes = canonicalize(&without_id)?;
    Ok(sha256_prefixed(&bytes))
}
