//! Key normalization shared by the loader and the store.

/// Canonical form of a lookup key: surrounding whitespace trimmed, lowercased.
///
/// Applying it twice yields the same string as applying it once, so callers
/// may normalize defensively without changing lookup results.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
