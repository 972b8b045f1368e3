use serde::{Deserialize, Serialize};

/// One observed interaction turn. Immutable once captured.
///
/// `reward`, `target`, and `actual` are optional so that malformed turns can be
/// carried through a batch and counted instead of failing it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceEntry {
    #[serde(default)]
    pub reward: Option<f64>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    #[serde(default)]
    pub top_pred: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub intent: Option<String>,
}

impl TraceEntry {
    /// A fully rated entry with no text.
    pub fn rated(reward: f64, target: &str, actual: &str, top_pred: &str) -> Self {
        Self {
            reward: Some(reward),
            target: Some(target.to_string()),
            actual: Some(actual.to_string()),
            top_pred: Some(top_pred.to_string()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Reward, target and actual are all present and the reward is finite.
    pub fn is_ratable(&self) -> bool {
        self.ratable_reward().is_some()
    }

    /// The reward, if this entry may contribute to statistics.
    pub fn ratable_reward(&self) -> Option<f64> {
        match (self.reward, &self.target, &self.actual) {
            (Some(r), Some(_), Some(_)) if r.is_finite() => Some(r),
            _ => None,
        }
    }
}

/// A contiguous slice of a batch that counts as one document for df.
#[derive(Debug, Clone)]
pub struct TraceWindow<'a> {
    /// Dedup key. Re-processing a window with the same key is a no-op for df/tf.
    pub key: String,
    pub entries: &'a [TraceEntry],
}

/// Split a batch into windows of `window_entries` entries (0 = one window).
///
/// Window keys are `batch_key`, or `batch_key#i` when there are several.
/// Content never feeds the key: identical traces in two batches are two
/// windows.
pub fn segment_windows<'a>(
    entries: &'a [TraceEntry],
    batch_key: &str,
    window_entries: usize,
) -> Vec<TraceWindow<'a>> {
    if entries.is_empty() {
        return Vec::new();
    }
    let size = if window_entries == 0 {
        entries.len()
    } else {
        window_entries
    };
    let chunks: Vec<&'a [TraceEntry]> = entries.chunks(size).collect();
    let multiple = chunks.len() > 1;

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| TraceWindow {
            key: if multiple {
                format!("{batch_key}#{i}")
            } else {
                batch_key.to_string()
            },
            entries: chunk,
        })
        .collect()
}
