//! Boundary to the embedding query engine.
//!
//! The query engine itself lives outside this workspace. This module
//! fixes the interface it must offer over a [`FinalizedAsset`] and the
//! argument checks every implementation shares. Out-of-range arguments
//! are the engine's to reject; the loader never looks inside the payload.

use std::error::Error;
use std::fmt;

use crate::asset::FinalizedAsset;

/// Errors returned by a [`QueryEngine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// A word identifier is not in the vocabulary.
    WordOutOfRange {
        /// The offending identifier.
        word: u32,
        /// Vocabulary size.
        vocab_size: u32,
    },
    /// A timestep index is past the end of the trajectory.
    TimestepOutOfRange {
        /// The offending timestep.
        t: u32,
        /// Number of timesteps.
        num_timesteps: u32,
    },
    /// The two word lists of a pairwise query differ in length.
    LengthMismatch {
        /// Length of the first list.
        left: usize,
        /// Length of the second list.
        right: usize,
    },
    /// The asset does not describe a usable embedding.
    InvalidAsset {
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WordOutOfRange { word, vocab_size } => {
                write!(f, "word {word} out of range (vocabulary size {vocab_size})")
            }
            Self::TimestepOutOfRange { t, num_timesteps } => {
                write!(f, "timestep {t} out of range ({num_timesteps} timesteps)")
            }
            Self::LengthMismatch { left, right } => {
                write!(f, "word lists differ in length: {left} vs {right}")
            }
            Self::InvalidAsset { reason } => write!(f, "invalid asset: {reason}"),
        }
    }
}

impl Error for QueryError {}

/// Similarity queries answered over a loaded asset.
pub trait QueryEngine: Sized {
    /// Take ownership of a finished asset.
    fn from_asset(asset: FinalizedAsset) -> Result<Self, QueryError>;

    /// Number of timesteps in the trajectory.
    fn num_timesteps(&self) -> u32;

    /// Number of words in the vocabulary.
    fn vocab_size(&self) -> u32;

    /// Per-pair, per-timestep similarity of `words1[i]` and `words2[i]`.
    ///
    /// The result is flattened pair-major and has length
    /// `words1.len() * num_timesteps()`.
    fn pairwise_trajectories(&self, words1: &[u32], words2: &[u32])
        -> Result<Vec<f32>, QueryError>;

    /// The `amount` words most related to `words` at timestep `t`, best first.
    fn most_related_to_at_t(
        &self,
        words: &[u32],
        t: u32,
        amount: u32,
    ) -> Result<Vec<u32>, QueryError>;

    /// The `amount` words whose relation to `word` changed most over the
    /// trajectory: at least `min_increasing` of them with growing and
    /// `min_decreasing` with shrinking similarity.
    fn largest_changes_wrt(
        &self,
        word: u32,
        amount: u32,
        min_increasing: u32,
        min_decreasing: u32,
    ) -> Result<Vec<u32>, QueryError>;
}

/// Check that every word is in `0..vocab_size`.
pub fn check_words(words: &[u32], vocab_size: u32) -> Result<(), QueryError> {
    match words.iter().find(|&&word| word >= vocab_size) {
        Some(&word) => Err(QueryError::WordOutOfRange { word, vocab_size }),
        None => Ok(()),
    }
}

/// Check that `t` is in `0..num_timesteps`.
pub fn check_timestep(t: u32, num_timesteps: u32) -> Result<(), QueryError> {
    if t < num_timesteps {
        Ok(())
    } else {
        Err(QueryError::TimestepOutOfRange { t, num_timesteps })
    }
}

/// Check that the two lists of a pairwise query line up and are in range.
pub fn check_pairs(words1: &[u32], words2: &[u32], vocab_size: u32) -> Result<(), QueryError> {
    if words1.len() != words2.len() {
        return Err(QueryError::LengthMismatch {
            left: words1.len(),
            right: words2.len(),
        });
    }
    check_words(words1, vocab_size)?;
    check_words(words2, vocab_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_in_range_pass() {
        assert_eq!(check_words(&[0, 5, 9], 10), Ok(()));
        assert_eq!(check_words(&[], 0), Ok(()));
    }

    #[test]
    fn first_out_of_range_word_is_reported() {
        assert_eq!(
            check_words(&[1, 10, 11], 10),
            Err(QueryError::WordOutOfRange {
                word: 10,
                vocab_size: 10
            })
        );
    }

    #[test]
    fn timestep_bounds() {
        assert!(check_timestep(208, 209).is_ok());
        assert_eq!(
            check_timestep(209, 209),
            Err(QueryError::TimestepOutOfRange {
                t: 209,
                num_timesteps: 209
            })
        );
    }

    #[test]
    fn pair_lists_must_match_in_length() {
        assert_eq!(
            check_pairs(&[1, 2], &[3], 10),
            Err(QueryError::LengthMismatch { left: 2, right: 1 })
        );
        assert!(check_pairs(&[1, 2], &[3, 4], 10).is_ok());
        assert!(check_pairs(&[1, 2], &[3, 40], 10).is_err());
    }
}
