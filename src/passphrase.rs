//! Passphrases built from a word list.

use std::path::Path;

use tracing::debug;

use crate::random::UniformRandomSource;
use crate::{wordlist, Error, ErrorRepr};

/// The words a passphrase may be assembled from.
///
/// Only words whose length (in characters) lies within the configured bounds are kept. A
/// dictionary is never empty, and can be reused for any number of passphrases.
#[derive(Clone, Debug)]
pub struct Dictionary {
    words: Vec<String>,
    min_word_len: usize,
    max_word_len: usize,
}

impl Dictionary {
    /// Keep the words from `words` that are between `min_word_len` and `max_word_len` characters
    /// long, preserving their order.
    pub fn new<I, S>(words: I, min_word_len: usize, max_word_len: usize) -> Result<Dictionary, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if min_word_len == 0 {
            return Err(ErrorRepr::ZeroWordLength.into());
        }
        if min_word_len > max_word_len {
            return Err(ErrorRepr::WordLengthRange {
                min: min_word_len,
                max: max_word_len,
            }
            .into());
        }

        let words = words
            .into_iter()
            .map(Into::<String>::into)
            .filter(|word| {
                let len = word.chars().count();
                min_word_len <= len && len <= max_word_len
            })
            .collect::<Vec<_>>();
        if words.is_empty() {
            return Err(ErrorRepr::EmptyDictionary {
                min: min_word_len,
                max: max_word_len,
            }
            .into());
        }
        debug!(
            words = words.len(),
            min_word_len,
            max_word_len,
            "built passphrase dictionary"
        );
        Ok(Dictionary {
            words,
            min_word_len,
            max_word_len,
        })
    }

    /// Build a dictionary from a file containing one word per line.
    pub fn from_file(
        path: impl AsRef<Path>,
        min_word_len: usize,
        max_word_len: usize,
    ) -> Result<Dictionary, Error> {
        Dictionary::new(wordlist::load_words(path)?, min_word_len, max_word_len)
    }

    /// Build a dictionary from the word list bundled with this crate.
    pub fn embedded(min_word_len: usize, max_word_len: usize) -> Result<Dictionary, Error> {
        let words = wordlist::embedded_words()?;
        Dictionary::new(words.iter().map(String::as_str), min_word_len, max_word_len)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always `false`; construction fails rather than produce an empty dictionary.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn min_word_len(&self) -> usize {
        self.min_word_len
    }

    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }

    /// Bits of entropy in a passphrase of `word_count` words from this dictionary.
    pub fn entropy_bits(&self, word_count: usize) -> f64 {
        word_count as f64 * (self.words.len() as f64).log2()
    }

    /// Pick `word_count` words uniformly at random (with replacement), joined by single spaces.
    pub fn generate<R>(&self, rng: &mut R, word_count: usize) -> Result<String, Error>
    where
        R: UniformRandomSource + ?Sized,
    {
        let bound = self.words.len() as u64;
        let chosen = (0..word_count)
            .map(|_| {
                rng.uniform_below(bound)
                    .map(|index| self.words[index as usize].as_str())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chosen.join(" "))
    }
}
