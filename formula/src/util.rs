//! Shared utility functions
//!
//! Typo suggestions for unknown symbols and intrinsic methods.

/// Edit distance between two names, counted in chars.
///
/// Keeps a single row of the distance table; `diagonal` carries the cell
/// that the row update overwrites.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let target: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=target.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in target.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[target.len()]
}

/// Find the candidate closest to `name`, ignoring ASCII case.
///
/// A candidate that differs from `name` only in case always wins, which
/// catches `toupper` vs `ToUpper`. Otherwise the smallest distance within
/// `threshold` is returned; equally close candidates resolve to the
/// alphabetically first, so hints do not depend on table order.
pub fn find_similar_name<'a, I>(name: &str, candidates: I, threshold: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = name.to_ascii_lowercase();
    candidates
        .into_iter()
        .map(|candidate| (levenshtein_distance(&needle, &candidate.to_ascii_lowercase()), candidate))
        .filter(|&(distance, _)| distance <= threshold)
        .min()
        .map(|(_, candidate)| candidate)
}

/// Format a "did you mean" suffix for an unknown name.
pub fn format_suggestion_hint(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(name) => format!("; did you mean `{name}`?"),
        None => String::new(),
    }
}
