//! "Did you mean" suggestions for invalid enumerated input.
//!
//! Used when a user passes a value that must come from a fixed set (output
//! formats, probe types, region names) and gets it slightly wrong.

/// Distance used when the caller passes zero.
pub const DEFAULT_MAX_DISTANCE: usize = 2;

/// Levenshtein edit distance with unit-cost insertions, deletions and
/// substitutions, computed over Unicode scalar values.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row dynamic programming table.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest valid option for `input`.
///
/// Returns `None` when `input` already matches an option (ignoring case) or
/// when no option lies within `max_distance` edits. A `max_distance` of zero
/// selects [`DEFAULT_MAX_DISTANCE`]. Ties are broken by distance, then by the
/// option's original spelling.
///
/// ```rust
/// use probectl_utils::suggest;
///
/// let kinds = ["http", "ping", "tcp", "dns_resolve"];
/// assert_eq!(suggest("htpp", &kinds, 2).as_deref(), Some("http"));
/// assert_eq!(suggest("HTTP", &kinds, 2), None);
/// assert_eq!(suggest("xyz", &kinds, 2), None);
/// ```
#[must_use]
pub fn suggest<S: AsRef<str>>(input: &str, options: &[S], max_distance: usize) -> Option<String> {
    let max_distance = if max_distance == 0 {
        DEFAULT_MAX_DISTANCE
    } else {
        max_distance
    };
    let needle = input.to_lowercase();

    if options
        .iter()
        .any(|option| option.as_ref().to_lowercase() == needle)
    {
        return None;
    }

    let mut candidates: Vec<(usize, &str)> = options
        .iter()
        .map(|option| {
            let option = option.as_ref();
            (levenshtein(&needle, &option.to_lowercase()), option)
        })
        .filter(|(distance, _)| *distance > 0 && *distance <= max_distance)
        .collect();

    candidates.sort_unstable();
    candidates.first().map(|(_, option)| (*option).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_KINDS: [&str; 4] = ["http", "ping", "tcp", "dns_resolve"];

    #[test]
    fn test_levenshtein_reference_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn test_exact_match_yields_nothing() {
        assert_eq!(suggest("http", &PROBE_KINDS, 2), None);
        assert_eq!(suggest("Http", &PROBE_KINDS, 2), None);
    }

    #[test]
    fn test_transposition_is_suggested() {
        assert_eq!(suggest("htpp", &PROBE_KINDS, 2).as_deref(), Some("http"));
    }

    #[test]
    fn test_too_distant_yields_nothing() {
        assert_eq!(suggest("xyz", &PROBE_KINDS, 2), None);
    }

    #[test]
    fn test_zero_distance_uses_default() {
        assert_eq!(suggest("pnig", &PROBE_KINDS, 0).as_deref(), Some("ping"));
    }

    #[test]
    fn test_ties_break_lexicographically() {
        // "bat" is one edit from both "cat" and "bar".
        assert_eq!(suggest("bat", &["cat", "bar"], 1).as_deref(), Some("bar"));
    }

    #[test]
    fn test_preserves_original_spelling() {
        assert_eq!(suggest("jsn", &["JSON", "YAML"], 2).as_deref(), Some("JSON"));
    }

    #[test]
    fn test_empty_options() {
        let none: [&str; 0] = [];
        assert_eq!(suggest("anything", &none, 2), None);
    }
}
