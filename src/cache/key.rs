//! Cache Key Module
//!
//! Derives analysis cache keys that ignore source order but change with
//! source membership.

use std::collections::BTreeSet;

/// Prefix distinguishing analysis results from other cached payloads.
pub const ANALYSIS_KEY_PREFIX: &str = "analysis";

// == Derive Key ==
/// Builds the cache key for an analysis of `subject_domain` against `source_ids`.
///
/// Source ids are deduplicated and sorted before joining, so `{a, b}` and
/// `{b, a}` share a key while adding, removing or substituting a source
/// yields a different one. The domain is trimmed and lowercased. Separators
/// inside the domain or an id are backslash-escaped, so distinct inputs never
/// share a key.
pub fn derive_key<I, S>(subject_domain: &str, source_ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let sorted: BTreeSet<String> = source_ids
        .into_iter()
        .map(|id| escape(id.as_ref().trim()))
        .collect();
    let joined = sorted.into_iter().collect::<Vec<_>>().join(",");

    format!(
        "{}:{}:{}",
        ANALYSIS_KEY_PREFIX,
        escape(&subject_domain.trim().to_lowercase()),
        joined
    )
}

fn escape(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        if matches!(c, '\\' | ',' | ':') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stable_under_reordering() {
        let ab = derive_key("example.com", ["a.com", "b.com"]);
        let ba = derive_key("example.com", ["b.com", "a.com"]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_key_changes_with_membership() {
        let ab = derive_key("example.com", ["a.com", "b.com"]);
        let ac = derive_key("example.com", ["a.com", "c.com"]);
        let a = derive_key("example.com", ["a.com"]);
        let abc = derive_key("example.com", ["a.com", "b.com", "c.com"]);

        assert_ne!(ab, ac);
        assert_ne!(ab, a);
        assert_ne!(ab, abc);
    }

    #[test]
    fn test_key_changes_with_domain() {
        assert_ne!(
            derive_key("one.com", ["a.com"]),
            derive_key("two.com", ["a.com"])
        );
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            derive_key(" Example.COM ", ["z.com", "a.com"]),
            "analysis:example.com:a.com,z.com"
        );
        assert_eq!(derive_key("example.com", Vec::<String>::new()), "analysis:example.com:");
    }

    #[test]
    fn test_key_ignores_duplicate_ids() {
        assert_eq!(
            derive_key("example.com", ["a.com", "a.com", "b.com"]),
            derive_key("example.com", ["b.com", "a.com"])
        );
    }

    #[test]
    fn test_key_separators_in_ids_are_escaped() {
        assert_ne!(
            derive_key("example.com", ["a,b"]),
            derive_key("example.com", ["a", "b"])
        );
        assert_eq!(derive_key("example.com", ["a,b"]), "analysis:example.com:a\\,b");
        assert_ne!(
            derive_key("a:b", ["c"]),
            derive_key("a", ["b:c"])
        );
        assert_ne!(
            derive_key("example.com", ["a\\", "b"]),
            derive_key("example.com", ["a\\,b"])
        );
    }
}
