//! Locale-aware string ordering and matching for city fields

use std::cmp::Ordering;

/// Fold a string into a key for ordering: transliterate Unicode to ASCII
/// (`Łódź` -> `Lodz`) and lowercase it.
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Precomputed ordering key: the folded string, then the raw one.
pub fn sort_key(s: &str) -> (String, String) {
    (fold_key(s), s.to_owned())
}

/// Compare two strings the way a human-facing sort expects.
///
/// Folded keys decide the order, so `Ärhus` sorts next to `Arhus` and case
/// is ignored. Strings with equal keys fall back to a plain comparison,
/// which keeps the ordering total. Agrees with ordering by [`sort_key`].
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold_key(a).cmp(&fold_key(b)).then_with(|| a.cmp(b))
}

/// Case-insensitive substring match. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
