use std::collections::BTreeMap;

use serde::Serialize;

use super::levenshtein::{levenshtein, similarity};
use crate::config::Config;

/// Score bonus for a candidate the input is a known misspelling of.
pub const TYPO_BONUS: f64 = 0.2;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub candidate: String,
    pub distance: usize,
    pub score: f64,
}

/// Maximum accepted distance for an input of `len` chars.
pub fn threshold(len: usize) -> usize {
    match len {
        0..=3 => 1,
        4..=6 => 2,
        _ => 3,
    }
}

/// Edit-distance ranker over a candidate pool.
///
/// Stateless apart from the immutable typo table; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct Suggester {
    /// Known misspelling → intended candidate.
    typos: BTreeMap<String, String>,
}

impl Suggester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add curated misspellings.
    pub fn with_typos<I, K, V>(mut self, typos: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.typos
            .extend(typos.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new().with_typos(config.suggest.typos.clone())
    }

    /// Rank `candidates` by similarity to `input`, best first, at most `max`.
    ///
    /// Distances are computed on lowercased strings and filtered by
    /// [`threshold`] of the input's own length, before folding. A candidate the raw input is a
    /// curated misspelling of gets [`TYPO_BONUS`] added (capped at 1.0).
    /// Equal scores keep the pool's enumeration order.
    pub fn rank<S: AsRef<str>>(
        &self,
        input: &str,
        candidates: &[S],
        max: usize,
    ) -> Vec<SimilarityResult> {
        if max == 0 {
            return Vec::new();
        }
        let folded = input.to_lowercase();
        let input_len = folded.chars().count();
        let limit = threshold(input.chars().count());
        let intended = self.typos.get(input).map(String::as_str);

        let mut results: Vec<SimilarityResult> = candidates
            .iter()
            .filter_map(|candidate| {
                let candidate: &str = candidate.as_ref();
                let lowered = candidate.to_lowercase();
                let distance = levenshtein(&folded, &lowered);
                if distance > limit {
                    return None;
                }
                let mut score = similarity(distance, input_len, lowered.chars().count());
                if intended == Some(candidate) {
                    score = (score + TYPO_BONUS).min(1.0);
                }
                Some(SimilarityResult {
                    candidate: candidate.to_string(),
                    distance,
                    score,
                })
            })
            .collect();

        // sort_by is stable: ties stay in pool order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(max);
        log::debug!("rank {input:?}: {} match(es)", results.len());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(results: &[SimilarityResult]) -> Vec<&str> {
        results.iter().map(|r| r.candidate.as_str()).collect()
    }

    #[test]
    fn thresholds() {
        assert_eq!(threshold(0), 1);
        assert_eq!(threshold(3), 1);
        assert_eq!(threshold(4), 2);
        assert_eq!(threshold(6), 2);
        assert_eq!(threshold(7), 3);
        assert_eq!(threshold(40), 3);
    }

    #[test]
    fn best_first() {
        let s = Suggester::new();
        let r = s.rank("serv", &["server", "service", "switch"], 2);
        assert_eq!(names(&r), vec!["server"]);
        assert_eq!(r[0].distance, 2);
        assert!((r[0].score - (1.0 - 2.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn orders_by_score() {
        let s = Suggester::new();
        let r = s.rank("volme", &["volumes", "volume"], 5);
        assert_eq!(names(&r), vec!["volume", "volumes"]);
    }

    #[test]
    fn ties_keep_pool_order() {
        let s = Suggester::new();
        let r = s.rank("cat", &["bat", "hat", "cab", "rat"], 10);
        assert_eq!(names(&r), vec!["bat", "hat", "cab", "rat"]);
        let r = s.rank("cat", &["rat", "cab", "hat", "bat"], 10);
        assert_eq!(names(&r), vec!["rat", "cab", "hat", "bat"]);
    }

    #[test]
    fn max_caps_length() {
        let s = Suggester::new();
        let r = s.rank("cat", &["bat", "hat", "cab", "rat"], 2);
        assert_eq!(names(&r), vec!["bat", "hat"]);
        assert!(s.rank("cat", &["cat"], 0).is_empty());
    }

    #[test]
    fn case_folded() {
        let s = Suggester::new();
        let r = s.rank("SERVER", &["server"], 1);
        assert_eq!(r[0].distance, 0);
        assert_eq!(r[0].score, 1.0);
    }

    #[test]
    fn filters_beyond_threshold() {
        let s = Suggester::new();
        assert!(s.rank("ab", &["abcd"], 3).is_empty());
        assert_eq!(s.rank("ab", &["abc"], 3).len(), 1);
        assert!(s.rank("datacenter", &["lan"], 3).is_empty());
    }

    #[test]
    fn empty_input_and_pool() {
        let s = Suggester::new();
        let r = s.rank("", &["", "a", "ab"], 5);
        assert_eq!(names(&r), vec!["", "a"]);
        assert_eq!(r[0].score, 1.0);
        assert_eq!(r[1].score, 0.0);
        let none: [&str; 0] = [];
        assert!(s.rank("x", &none, 5).is_empty());
    }

    #[test]
    fn typo_bonus_reorders() {
        // "lan" and "lab" are both one edit from "lax"; ties keep pool order
        let plain = Suggester::new();
        assert_eq!(names(&plain.rank("lax", &["lab", "lan"], 2)), vec!["lab", "lan"]);

        let curated = Suggester::new().with_typos([("lax", "lan")]);
        let r = curated.rank("lax", &["lab", "lan"], 2);
        assert_eq!(names(&r), vec!["lan", "lab"]);
        assert!((r[0].score - (1.0 - 1.0 / 3.0 + TYPO_BONUS)).abs() < 1e-9);
    }

    #[test]
    fn typo_bonus_is_capped() {
        let s = Suggester::new().with_typos([("Server", "server")]);
        let r = s.rank("Server", &["server"], 1);
        assert_eq!(r[0].score, 1.0);
    }

    #[test]
    fn typo_bonus_needs_exact_raw_input() {
        let s = Suggester::new().with_typos([("sevrer", "server")]);
        let exact = s.rank("sevrer", &["server"], 1);
        let shouted = s.rank("SEVRER", &["server"], 1);
        assert!(exact[0].score > shouted[0].score);
    }

    #[test]
    fn scores_never_increase_down_the_list() {
        let s = Suggester::from_config(&Config::default_config());
        let pool = ["server", "sever", "serve", "servers", "service", "snapshot"];
        let r = s.rank("sevrer", &pool, 10);
        assert!(r.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn smaller_distance_never_scores_lower() {
        let s = Suggester::new();
        // Same lengths throughout: 5-char input against 5-char candidates
        let r = s.rank("abcde", &["abxxe", "abcdx", "axxxe"], 10);
        for a in &r {
            for b in &r {
                if a.distance < b.distance {
                    assert!(a.score >= b.score);
                }
            }
        }
    }

    #[test]
    fn threshold_uses_unfolded_length() {
        // "İ" lowercases to two chars, so "İab" folds to four chars
        assert_eq!("İab".to_lowercase().chars().count(), 4);
        assert!(Suggester::new().rank("İab", &["ab"], 3).is_empty());
        assert_eq!(Suggester::new().rank("Xab", &["ab"], 3).len(), 1);
    }
}
