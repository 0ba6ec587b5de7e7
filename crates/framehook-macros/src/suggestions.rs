//! Suggestion utilities for helpful error messages.
//!
//! Provides Levenshtein distance calculation for suggesting
//! corrections when users make typos in attribute keys.

/// Calculate the Levenshtein distance between two strings.
///
/// This is the minimum number of single-character edits (insertions,
/// deletions, or substitutions) required to change one string into the other.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    // Handle empty strings
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Create distance matrix
    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    // Initialize first column
    for (i, row) in matrix.iter_mut().enumerate().take(a_len + 1) {
        row[0] = i;
    }

    // Initialize first row
    for j in 0..=b_len {
        matrix[0][j] = j;
    }

    // Fill in the rest of the matrix
    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };

            matrix[i][j] = (matrix[i - 1][j] + 1) // deletion
                .min(matrix[i][j - 1] + 1) // insertion
                .min(matrix[i - 1][j - 1] + cost); // substitution
        }
    }

    matrix[a_len][b_len]
}

/// Find the closest matching name from a list of valid names.
///
/// Returns `Some(suggestion)` if a close match is found (distance <= 3),
/// `None` otherwise.
pub fn find_closest(unknown: &str, valid: &[&str]) -> Option<String> {
    valid
        .iter()
        .map(|&p| (p, levenshtein_distance(unknown, p)))
        .filter(|(_, d)| *d <= 3) // Only suggest if reasonably close
        .min_by_key(|(_, d)| *d)
        .map(|(name, _)| name.to_string())
}

/// Format a helpful error message for an unknown attribute key.
pub fn format_unknown_key_error(attr: &str, unknown_key: &str, valid_keys: &[&str]) -> String {
    let mut msg = format!("unknown key `{}` in `#[{}(...)]`", unknown_key, attr);

    if let Some(suggestion) = find_closest(unknown_key, valid_keys) {
        msg.push_str(&format!("\n\nDid you mean `{}`?", suggestion));
    }

    if valid_keys.is_empty() {
        msg.push_str(&format!("\n\n`#[{}]` takes no arguments", attr));
    } else {
        msg.push_str("\n\nValid keys are: ");
        msg.push_str(&valid_keys.join(", "));
    }

    msg
}

/// Format a helpful error message for a struct with no `#[instance_id]` field.
///
/// `candidates` are fields that look like they were meant to carry the id.
pub fn format_missing_instance_id_error(owner: &str, candidates: &[&str]) -> String {
    let mut msg = format!(
        "`#[derive(Instance)]` on `{}` needs exactly one field marked `#[instance_id]`",
        owner
    );

    if let Some(field) = candidates.first() {
        msg.push_str(&format!("\n\nDid you mean to mark `{}` with `#[instance_id]`?", field));
    }

    msg
}

/// Format a helpful error message for two events with the same name.
pub fn format_duplicate_event_error(owner: &str, name: &str, first_field: &str) -> String {
    format!(
        "duplicate event `{}` on `{}`; it is already declared by field `{}`\n\nUse `#[event(name = \"...\")]` to pick a different name",
        name, owner, first_field
    )
}
