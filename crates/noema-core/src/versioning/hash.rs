use serde::{Deserialize, Serialize};

use crate::errors::NoemaResult;

/// blake3 hex digest identifying a version by content and lineage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VersionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the canonical JSON serialization of `payload`.
///
/// Callers must serialize through ordered maps so identical content always
/// produces identical bytes.
pub fn content_id<T: Serialize + ?Sized>(payload: &T) -> NoemaResult<VersionId> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(VersionId(blake3::hash(&bytes).to_hex().to_string()))
}

/// Round to `precision` decimals, normalizing negative zero.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_payloads_hash_identically() {
        let a = content_id(&("x", 1.0)).unwrap();
        let b = content_id(&("x", 1.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn negative_zero_rounds_to_zero() {
        let r = round_to(-0.000_000_1, 6);
        assert_eq!(r.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn huge_values_pass_through() {
        assert_eq!(round_to(f64::MAX, 6), f64::MAX);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(0.123_456_7, 6), 0.123_457);
        assert_eq!(round_to(1.25, 1), 1.3);
    }
}
