//! Keyword matching shared by filtering, cross-referencing and expert ranking.
//!
//! Two keywords match when either contains the other, ignoring case. Short
//! keywords therefore match broadly ("ai" matches "maintenance").

/// Bidirectional containment on already lower-cased keywords.
pub fn keywords_overlap(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Case-insensitive variant of [`keywords_overlap`].
pub fn keywords_match(a: &str, b: &str) -> bool {
    keywords_overlap(&a.to_lowercase(), &b.to_lowercase())
}

pub fn lowercase_all<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords.iter().map(|k| k.as_ref().to_lowercase()).collect()
}

/// Entries of `focal` that match at least one entry of `candidate`.
///
/// Both slices must be lower-cased. Duplicates in `focal` are kept.
pub fn shared_keywords(focal: &[String], candidate: &[String]) -> Vec<String> {
    focal
        .iter()
        .filter(|k| candidate.iter().any(|c| keywords_overlap(k, c)))
        .cloned()
        .collect()
}

/// Number of (left, right) pairs that match; a keyword may count several times.
pub fn overlap_pairs(left: &[String], right: &[String]) -> usize {
    left.iter()
        .map(|l| right.iter().filter(|r| keywords_overlap(l, r)).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn containment_works_in_both_directions() {
        assert!(keywords_match("priv", "Privacy"));
        assert!(keywords_match("data privacy", "PRIVACY"));
        assert!(!keywords_match("rights", "privacy"));
    }

    #[test]
    fn short_keywords_match_broadly() {
        assert!(keywords_match("ai", "maintenance"));
    }

    #[test]
    fn shared_keywords_keep_focal_duplicates() {
        let focal = lowercase_all(&["privacy", "privacy", "data"]);
        let candidate = lowercase_all(&["Privacy"]);
        assert_eq!(shared_keywords(&focal, &candidate), vec!["privacy", "privacy"]);
    }

    #[test]
    fn overlap_pairs_double_counts() {
        let left = lowercase_all(&["data", "data governance"]);
        let right = lowercase_all(&["data", "governance"]);
        // data~data, data governance~data, data governance~governance
        assert_eq!(overlap_pairs(&left, &right), 3);
    }

    proptest! {
        #[test]
        fn proptest_overlap_is_symmetric(a in "[a-z]{0,6}", b in "[a-z]{0,6}") {
            prop_assert_eq!(keywords_overlap(&a, &b), keywords_overlap(&b, &a));
        }

        #[test]
        fn proptest_prefix_always_matches(word in "[a-z]{1,10}", cut in 0usize..10) {
            let cut = cut.min(word.len());
            prop_assert!(keywords_overlap(&word[..cut], &word));
        }

        #[test]
        fn proptest_case_is_ignored(word in "[a-zA-Z]{1,10}") {
            prop_assert!(keywords_match(&word.to_uppercase(), &word.to_lowercase()));
        }
    }
}
