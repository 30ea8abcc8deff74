//! Word-level k-shingling of extracted page text.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Punctuation removed before tokenization.
const STRIPPED: [char; 4] = ['!', '?', ',', '.'];

/// Splits `text` into overlapping shingles of `k` consecutive words.
///
/// Repeated shingles are kept; consumers that need set semantics collapse them.
/// Text with fewer than `k` words yields no shingles.
pub fn shingles(text: &str, k: usize) -> Vec<String> {
    let cleaned: String = text.chars().filter(|c| !STRIPPED.contains(c)).collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if k == 0 || words.len() < k {
        return Vec::new();
    }
    words.windows(k).map(|window| window.join(" ")).collect()
}

/// Maps a shingle onto `[0, domain)`.
#[inline]
pub fn shingle_code(shingle: &str, domain: u64) -> u64 {
    assert!(domain > 0, "shingle code domain must be non-empty");
    let mut hasher = FxHasher::default();
    shingle.hash(&mut hasher);
    hasher.finish() % domain
}
