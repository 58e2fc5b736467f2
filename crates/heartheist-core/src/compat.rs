//! Deterministic "compatibility score" for two names.

use sha2::{Digest, Sha256};

/// Lowest possible score.
pub const MIN_SCORE: u8 = 80;
/// Highest possible score.
pub const MAX_SCORE: u8 = 100;

/// Score two names in `80..=100`.
///
/// Names are trimmed and lowercased, then sorted, so argument order does
/// not matter. The score is the first two bytes of
/// `SHA-256("<a>+<b>")` as a big-endian integer, reduced mod 21, plus 80.
#[must_use]
pub fn compatibility_score(a: &str, b: &str) -> u8 {
    let mut names = [normalize(a), normalize(b)];
    names.sort();
    let digest = Sha256::digest(names.join("+").as_bytes());
    let head = u16::from_be_bytes([digest[0], digest[1]]);
    let span = u16::from(MAX_SCORE - MIN_SCORE + 1);
    // head % 21 < 21, always fits in u8.
    let offset = u8::try_from(head % span).unwrap_or(0);
    MIN_SCORE + offset
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
