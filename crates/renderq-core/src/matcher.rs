//! Partial-version query matching.
//!
//! Query elements are either a full `"type:version"` pair or a bare
//! `"type"`. A [`VersionMatcher`] turns one element into an explicit
//! prefix-anchored predicate over item identifiers, replacing pattern-engine
//! matching with a dedicated version-boundary check so the semantics stay
//! testable on their own.
//!
//! A match requires the identifier's type to equal the query type exactly,
//! and its version to start with the queried prefix (or, for a bare type,
//! with a run of digits) ending at a version boundary: end-of-string, a `.`
//! starting a finer segment, or a `v` immediately preceded by a digit. The
//! `v` rule supports schemes like `10.5v1` where `v` separates segments the
//! way `.` does, which is why `"hou:10.5"` matches `"hou:10.5v1"` but not
//! `"hou:10.55"`.

use crate::id::ItemId;

/// A parsed query element: a type plus either a literal version prefix or a
/// wildcard meaning "any numeric version of this type".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMatcher {
    item_type: String,
    version_prefix: Option<String>,
}

impl VersionMatcher {
    /// Parses a query element. Splits on the first `:`; an element with no
    /// `:` becomes a wildcard matcher for that type.
    pub fn parse(query: &str) -> Self {
        match query.split_once(':') {
            Some((item_type, prefix)) => VersionMatcher {
                item_type: item_type.to_string(),
                version_prefix: Some(prefix.to_string()),
            },
            None => VersionMatcher {
                item_type: query.to_string(),
                version_prefix: None,
            },
        }
    }

    /// The type this matcher is anchored to.
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Whether the identifier satisfies this matcher.
    pub fn matches(&self, id: &ItemId) -> bool {
        let Some((item_type, version)) = id.as_str().split_once(':') else {
            return false;
        };
        if item_type != self.item_type {
            return false;
        }

        match &self.version_prefix {
            Some(prefix) => match version.strip_prefix(prefix.as_str()) {
                Some(rest) => at_version_boundary(prefix.chars().last(), rest),
                None => false,
            },
            None => {
                // Wildcard: the version must open with a digit run ending at
                // a boundary. The run is maximal, so the preceding character
                // for the `v` rule is always a digit.
                let digits = version.chars().take_while(char::is_ascii_digit).count();
                digits > 0 && matches!(version[digits..].chars().next(), None | Some('.') | Some('v'))
            }
        }
    }
}

/// Version boundary predicate: end-of-string, `.`, or `v` after a digit.
fn at_version_boundary(prev: Option<char>, rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some('.') => true,
        Some('v') => prev.is_some_and(|c| c.is_ascii_digit()),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ItemId {
        ItemId::parse(raw).unwrap()
    }

    #[test]
    fn exact_version_matches_itself() {
        let m = VersionMatcher::parse("hou:17.5.229");
        assert!(m.matches(&id("hou:17.5.229")));
    }

    #[test]
    fn prefix_matches_finer_segment() {
        let m = VersionMatcher::parse("hou:17.5");
        assert!(m.matches(&id("hou:17.5.229")));
        assert!(m.matches(&id("hou:17.5")));
    }

    #[test]
    fn prefix_does_not_match_longer_component() {
        // 10.55 continues the component; there is no boundary after 10.5.
        let m = VersionMatcher::parse("hou:10.5");
        assert!(!m.matches(&id("hou:10.55")));
    }

    #[test]
    fn v_after_digit_acts_as_separator() {
        let m = VersionMatcher::parse("hou:10.5");
        assert!(m.matches(&id("hou:10.5v1")));
    }

    #[test]
    fn v_without_preceding_digit_is_not_a_boundary() {
        let m = VersionMatcher::parse("nuke:10.x");
        assert!(!m.matches(&id("nuke:10.xv1")));
    }

    #[test]
    fn type_must_match_exactly() {
        let m = VersionMatcher::parse("hou:17.5");
        assert!(!m.matches(&id("houdini:17.5")));
        assert!(!m.matches(&id("hou_redshift:17.5")));
    }

    #[test]
    fn bare_type_matches_numeric_versions() {
        let m = VersionMatcher::parse("hou");
        assert!(m.matches(&id("hou:17")));
        assert!(m.matches(&id("hou:17.5.229")));
        assert!(m.matches(&id("hou:17v1")));
    }

    #[test]
    fn bare_type_rejects_non_numeric_versions() {
        let m = VersionMatcher::parse("hou");
        assert!(!m.matches(&id("hou:beta")));
        assert!(!m.matches(&id("hou:17a")));
    }

    #[test]
    fn bare_type_rejects_other_types() {
        let m = VersionMatcher::parse("hou");
        assert!(!m.matches(&id("hou_redshift:2.6.37")));
    }

    #[test]
    fn item_type_accessor() {
        assert_eq!(VersionMatcher::parse("hou:17.5").item_type(), "hou");
        assert_eq!(VersionMatcher::parse("hou").item_type(), "hou");
    }
}
