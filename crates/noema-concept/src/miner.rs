//! Term Miner: tokens → n-gram and intent terms → windowed co-occurrence counts.
//!
//! Pure function of one trace window and [`MinerConfig`]; it never touches graph state.

use std::collections::{BTreeMap, BTreeSet};

use unicode_normalization::UnicodeNormalization;

use noema_core::config::MinerConfig;
use noema_core::constants::INTENT_PREFIX;
use noema_core::models::TraceWindow;

use crate::stopwords::is_stopword;

/// One normalized token plus the surface form it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub norm: String,
    pub surface: String,
}

/// Window-level counts for one candidate term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermCount {
    pub ngram: usize,
    /// Occurrences in the window.
    pub tf: u64,
    /// Entries containing the term.
    pub entry_count: u64,
    /// Raw surface forms as written.
    pub surfaces: BTreeSet<String>,
}

/// Window-level counts for one unordered term pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCount {
    /// Raw co-occurrences.
    pub count: u64,
    /// Entries where the pair co-occurs.
    pub entries: u64,
}

/// Per-entry view kept for reward correlation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryObservation {
    /// Ratable reward of the entry, if any.
    pub reward: Option<f64>,
    /// Co-occurrence count per pair within this entry.
    pub pairs: BTreeMap<(String, String), u64>,
}

/// Everything mined from one window.
#[derive(Debug, Clone, Default)]
pub struct MinedWindow {
    pub key: String,
    pub terms: BTreeMap<String, TermCount>,
    pub pairs: BTreeMap<(String, String), PairCount>,
    pub entries: Vec<EntryObservation>,
    /// Trace entries in the window, including ones with no terms.
    pub entry_total: u64,
}

impl MinedWindow {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[derive(Debug)]
struct Occurrence {
    key: String,
    start: usize,
}

/// NFC composition followed by lowercasing. Canonically equivalent spellings
/// fold to the same key.
pub fn fold_case(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Split on whitespace, compose to NFC, strip surrounding punctuation, fold
/// case, and keep word-like tokens that are not stop words.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|raw| {
            // Compose first so trailing combining marks stay with their letter.
            let composed: String = raw.nfc().collect();
            let surface = composed.trim_matches(|c: char| !c.is_alphanumeric());
            let norm = fold_case(surface);
            if !is_word_like(&norm) || is_stopword(&norm) {
                return None;
            }
            Some(Token {
                norm,
                surface: surface.to_string(),
            })
        })
        .collect()
}

/// Alphabetic in any script, allowing internal hyphens and apostrophes.
fn is_word_like(token: &str) -> bool {
    let mut letters = token
        .chars()
        .filter(|c| !matches!(c, '-' | '\'' | '\u{2019}'))
        .peekable();
    letters.peek().is_some() && letters.all(char::is_alphabetic)
}

/// Canonical term key for an intent label. The label keeps its case so it
/// still matches the policy label; only its composition is normalized.
pub fn intent_key(label: &str) -> String {
    format!("{INTENT_PREFIX}{}", label.trim().nfc().collect::<String>())
}

/// Mine one window.
pub fn mine_window(window: &TraceWindow<'_>, config: &MinerConfig) -> MinedWindow {
    let mut mined = MinedWindow {
        key: window.key.clone(),
        entry_total: window.entries.len() as u64,
        ..Default::default()
    };

    for entry in window.entries {
        let tokens = tokenize(&entry.text);
        let mut occurrences = Vec::new();
        let mut entry_terms: BTreeSet<String> = BTreeSet::new();

        for n in config.ngram_min..=config.ngram_max {
            if tokens.len() < n {
                break;
            }
            for (start, gram) in tokens.windows(n).enumerate() {
                let key = join(gram.iter().map(|t| t.norm.as_str()));
                let surface = join(gram.iter().map(|t| t.surface.as_str()));
                let term = mined.terms.entry(key.clone()).or_insert_with(|| TermCount {
                    ngram: n,
                    ..Default::default()
                });
                term.tf += 1;
                term.surfaces.insert(surface);
                entry_terms.insert(key.clone());
                occurrences.push(Occurrence { key, start });
            }
        }

        let intent = entry
            .intent
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .map(intent_key);
        if let Some(key) = &intent {
            let term = mined.terms.entry(key.clone()).or_insert_with(|| TermCount {
                ngram: 1,
                ..Default::default()
            });
            term.tf += 1;
            term.surfaces.insert(key.clone());
            entry_terms.insert(key.clone());
        }

        for key in &entry_terms {
            if let Some(term) = mined.terms.get_mut(key) {
                term.entry_count += 1;
            }
        }

        let entry_pairs = cooccurrences(&occurrences, intent.as_deref(), config.cooc_window);
        for (pair, count) in &entry_pairs {
            let slot = mined.pairs.entry(pair.clone()).or_default();
            slot.count += count;
            slot.entries += 1;
        }
        mined.entries.push(EntryObservation {
            reward: entry.ratable_reward(),
            pairs: entry_pairs,
        });
    }

    apply_limits(&mut mined, config);
    mined
}

/// Pair counts for one entry. Occurrences co-occur when their start positions
/// are at most `window` apart; the intent term co-occurs with every occurrence.
fn cooccurrences(
    occurrences: &[Occurrence],
    intent: Option<&str>,
    window: usize,
) -> BTreeMap<(String, String), u64> {
    let mut pairs = BTreeMap::new();
    for (i, a) in occurrences.iter().enumerate() {
        for b in &occurrences[i + 1..] {
            if a.start.abs_diff(b.start) > window || a.key == b.key {
                continue;
            }
            *pairs.entry(ordered(&a.key, &b.key)).or_insert(0) += 1;
        }
        if let Some(intent) = intent {
            *pairs.entry(ordered(&a.key, intent)).or_insert(0) += 1;
        }
    }
    pairs
}

/// Drop terms under `min_tf`, then keep the strongest `max_terms_per_window`.
/// Pairs touching a dropped term go with it.
fn apply_limits(mined: &mut MinedWindow, config: &MinerConfig) {
    let min_tf = u64::from(config.min_tf);
    mined.terms.retain(|_, t| t.tf >= min_tf);

    if mined.terms.len() > config.max_terms_per_window {
        let mut ranked: Vec<(&String, &TermCount)> = mined.terms.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.tf
                .cmp(&a.1.tf)
                .then(b.1.entry_count.cmp(&a.1.entry_count))
                .then(a.0.cmp(b.0))
        });
        let keep: BTreeSet<String> = ranked
            .into_iter()
            .take(config.max_terms_per_window)
            .map(|(k, _)| k.clone())
            .collect();
        mined.terms.retain(|k, _| keep.contains(k));
    }

    let terms = &mined.terms;
    let live = |(a, b): &(String, String)| terms.contains_key(a) && terms.contains_key(b);
    mined.pairs.retain(|pair, _| live(pair));
    for entry in &mut mined.entries {
        entry.pairs.retain(|pair, _| live(pair));
    }
}

fn ordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}
