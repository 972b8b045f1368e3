//! English and Persian stop words dropped by the miner.

const EN_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "with", "at", "by", "from",
    "is", "are", "was", "were", "be", "been", "being", "as", "that", "this", "it", "its", "if",
    "but", "into", "about", "over", "after", "before", "then", "so", "than", "not",
];

const FA_STOPWORDS: &[&str] = &[
    "و", "یا", "از", "به", "در", "برای", "با", "بی", "بدون", "این", "آن", "که", "را", "تا",
    "اما", "اگر", "بر", "پس", "نه", "هم", "چه", "چرا", "چطور", "چگونه",
];

/// Whether a lowercased token is a stop word in either language.
pub fn is_stopword(token: &str) -> bool {
    EN_STOPWORDS.contains(&token) || FA_STOPWORDS.contains(&token)
}
