use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::versioning::round_to;

/// Label → weight mapping. Ordered so that serialization is canonical.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable(BTreeMap<String, f64>);

impl WeightTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Every label starts at the same weight.
    pub fn uniform<I, S>(labels: I, weight: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(|l| (l.into(), weight)).collect())
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn insert(&mut self, label: impl Into<String>, weight: f64) -> Option<f64> {
        self.0.insert(label.into(), weight)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All weights are finite.
    pub fn is_finite(&self) -> bool {
        self.0.values().all(|w| w.is_finite())
    }

    /// A copy with every weight rounded to `precision` decimals.
    pub fn rounded(&self, precision: u32) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), round_to(*v, precision)))
                .collect(),
        )
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for WeightTable {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_collapses_float_noise() {
        let a: WeightTable = [("x", 0.1 + 0.2)].into_iter().collect();
        let b: WeightTable = [("x", 0.3)].into_iter().collect();
        assert_ne!(a, b);
        assert_eq!(a.rounded(6), b.rounded(6));
    }

    #[test]
    fn serializes_in_label_order() {
        let table: WeightTable = [("b", 1.0), ("a", 2.0)].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"a":2.0,"b":1.0}"#);
    }
}
