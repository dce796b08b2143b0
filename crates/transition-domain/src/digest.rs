//! Canonical JSON and SHA-256 digests.
//!
//! Canonical form: object keys sorted by UTF-16 code units, integer-valued
//! floats written as integers, NaN/Infinity rejected, compact separators.
//! Two values that are equal as data always produce the same digest.

use serde_json::{Number, Value};
use sha2::{Digest, Sha256};

use crate::error::{DomainError, Result};

fn canonical_number(n: &Number) -> Result<Number> {
    if n.is_i64() || n.is_u64() {
        return Ok(n.clone());
    }
    let Some(f) = n.as_f64() else {
        return Ok(n.clone());
    };
    if !f.is_finite() {
        return Err(DomainError::NonFiniteNumber);
    }
    let integral = f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f);
    Ok(if integral {
        Number::from(f as i64)
    } else {
        n.clone()
    })
}

fn write_separated<T>(
    out: &mut String,
    items: impl IntoIterator<Item = T>,
    mut write: impl FnMut(&mut String, T) -> Result<()>,
) -> Result<()> {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write(out, item)?;
    }
    Ok(())
}

// Entries are written in order rather than collected into a `Map`, which
// would re-sort keys by UTF-8 bytes.
fn write_canonical(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
            out.push('{');
            write_separated(out, entries, |out, (key, item)| {
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(out, item)
            })?;
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            write_separated(out, items, write_canonical)?;
            out.push(']');
        }
        Value::Number(n) => out.push_str(&serde_json::to_string(&canonical_number(n)?)?),
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

/// Canonical compact JSON for `value`.
pub fn canonical_json(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_canonical(&mut out, value)?;
    Ok(out)
}

/// SHA-256 hex digest of the canonical JSON of `value`.
pub fn compute_digest(value: &Value) -> Result<String> {
    let canonical = canonical_json(value)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// SHA-256 hex digest of raw bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Deterministic identifier for an (award, contract) pair.
///
/// Ids are joined with the ASCII unit separator, which cannot appear in
/// either id, so distinct pairs never collide on concatenation.
pub fn detection_id(award_id: &str, contract_id: &str) -> String {
    let key = format!("{award_id}\u{1f}{contract_id}");
    sha256_hex(key.as_bytes())[..32].to_string()
}
