//! Correction suggestions for unrecognized words, ranked by edit distance.

pub mod levenshtein;
pub mod ranker;

pub use levenshtein::{levenshtein, similarity};
pub use ranker::{SimilarityResult, Suggester, TYPO_BONUS, threshold};
