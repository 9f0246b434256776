use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordHit {
    pub keyword: String,
    /// Normalised to 0..=1 relative to the best hit.
    pub score: f32,
}

/// Typo-tolerant lookup over the keyword vocabulary using nucleo-matcher.
pub struct KeywordFinder {
    matcher: Matcher,
    vocabulary: Vec<(String, Utf32String)>,
}

impl KeywordFinder {
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary = vocabulary
            .into_iter()
            .map(Into::into)
            .map(|keyword: String| {
                let haystack = Utf32String::from(keyword.as_str());
                (keyword, haystack)
            })
            .collect();
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            vocabulary,
        }
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Best matches first; equal scores keep vocabulary order.
    pub fn find(&mut self, query: &str, limit: usize) -> Vec<KeywordHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);

        let mut scored: Vec<(usize, u32)> = self
            .vocabulary
            .iter()
            .enumerate()
            .filter_map(|(idx, (_, haystack))| {
                pattern
                    .score(haystack.slice(..), &mut self.matcher)
                    .map(|score| (idx, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(limit);

        let max_score = scored.first().map(|(_, s)| *s as f32).unwrap_or(1.0);
        scored
            .into_iter()
            .map(|(idx, score)| KeywordHit {
                keyword: self.vocabulary[idx].0.clone(),
                score: if max_score > 0.0 {
                    score as f32 / max_score
                } else {
                    0.0
                },
            })
            .collect()
    }
}

impl std::fmt::Debug for KeywordFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordFinder")
            .field("vocabulary", &self.vocabulary.len())
            .finish()
    }
}
