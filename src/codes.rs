//! Generated short codes for budget units and budget lines.
//!
//! Unit codes are uppercase acronyms built from the initials of the name
//! (non-letters stripped, at most four letters). Line codes prefix the
//! owning unit's code to an alphanumeric slug of the line name. Both get a
//! numeric suffix (2, 3, ...) when the base code is already taken.

use std::collections::HashSet;

const UNIT_ACRONYM_MAX_LEN: usize = 4;

/// Derive the base acronym for a budget unit name.
///
/// "Sec. de Educação" → "SDE"; an empty or letter-free name yields "UN".
pub fn unit_acronym(name: &str) -> String {
    let acronym: String = name
        .split_whitespace()
        .filter_map(|word| {
            word.chars()
                .find(|c| c.is_alphabetic())
                .map(|c| c.to_uppercase().next().unwrap_or(c))
        })
        .take(UNIT_ACRONYM_MAX_LEN)
        .collect();

    if acronym.is_empty() {
        "UN".to_string()
    } else {
        acronym
    }
}

/// Derive the base code for a budget line: unit code, hyphen, slug of the
/// line name (uppercase alphanumerics, words joined by underscores).
pub fn line_code(unit_code: &str, name: &str) -> String {
    let slug: String = name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(|c| c.to_uppercase())
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        format!("{unit_code}-LINE")
    } else {
        format!("{unit_code}-{slug}")
    }
}

/// Resolve a base code against the set of codes already in use, appending a
/// numeric suffix until the result is free.
pub fn with_collision_suffix(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut suffix = 2u32;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
