//! Numeric-aware version ordering.
//!
//! Catalog version strings are sorted component-wise on `.`: components are
//! compared as integers when both sides parse as one, so `"2.6.9"` sorts
//! before `"2.6.10"`; a numeric component sorts before a non-numeric one
//! (`"9"` before `"1x"`); two non-numeric components compare as plain
//! strings. A version that is a strict component prefix of another sorts
//! first (`"17.5"` before `"17.5.229"`). The numeric-before-non-numeric rule
//! keeps the component order transitive, which a per-pair fallback would
//! not be.

use std::cmp::Ordering;

/// Compares two version strings, numeric-component-aware, ascending.
pub fn version_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(xn), Ok(yn)) => xn.cmp(&yn),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Sorts a list of version strings ascending with [`version_cmp`].
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| version_cmp(a, b));
}
