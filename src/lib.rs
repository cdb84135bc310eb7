//! Cryptographically strong passwords and passphrases.
//!
//! Passwords are drawn from an [`Alphabet`], which maps uniformly random 32-bit words onto an
//! arbitrary number of symbols without modulo bias. Passphrases are drawn from a [`Dictionary`]
//! of candidate words. Both take their randomness from a [`UniformRandomSource`]; the
//! convenience functions in this module use [`OsRandom`].

use std::io;
use std::path::PathBuf;

pub mod passphrase;
pub mod password_generation;
pub mod random;
pub mod wordlist;

pub use passphrase::Dictionary;
pub use password_generation::{Alphabet, CharTable, LinearOffset, SymbolMapper};
pub use random::{CryptoRngSource, OsRandom, UniformRandomSource};

/// Get a password of printable ASCII characters between `min` and `max` characters long.
pub fn secure_password(min: usize, max: usize) -> Result<String, Error> {
    Alphabet::secure().generate(&mut OsRandom::default(), min, max)
}

/// Get a password of decimal digits between `min` and `max` characters long.
pub fn numeric_password(min: usize, max: usize) -> Result<String, Error> {
    Alphabet::numeric().generate(&mut OsRandom::default(), min, max)
}

/// Get a password of ASCII letters and digits between `min` and `max` characters long.
pub fn alphanumeric_password(min: usize, max: usize) -> Result<String, Error> {
    Alphabet::alphanumeric().generate(&mut OsRandom::default(), min, max)
}

/// Get a password of ASCII letters between `min` and `max` characters long.
pub fn alpha_password(min: usize, max: usize) -> Result<String, Error> {
    Alphabet::alpha().generate(&mut OsRandom::default(), min, max)
}

/// Get a password of upper case ASCII letters between `min` and `max` characters long.
pub fn alpha_upper_password(min: usize, max: usize) -> Result<String, Error> {
    Alphabet::alpha_upper().generate(&mut OsRandom::default(), min, max)
}

/// Get a password of lower case ASCII letters between `min` and `max` characters long.
pub fn alpha_lower_password(min: usize, max: usize) -> Result<String, Error> {
    Alphabet::alpha_lower().generate(&mut OsRandom::default(), min, max)
}

/// The dictionary behind [`xkcd_passphrase`]: the bundled word list, restricted to words of 5 to
/// 8 characters.
pub fn xkcd_generator() -> Result<Dictionary, Error> {
    Dictionary::embedded(5, 8)
}

/// Get a passphrase in the style of <https://xkcd.com/936/>: `word_count` common words separated
/// by spaces.
pub fn xkcd_passphrase(word_count: usize) -> Result<String, Error> {
    xkcd_generator()?.generate(&mut OsRandom::default(), word_count)
}

/// The broad category of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The caller supplied parameters that can never produce a result.
    InvalidConfig,
    /// The random source failed to supply bytes.
    RandomSourceFailure,
    /// The random source kept supplying bytes that had to be rejected.
    InsufficientRandomData,
    /// A word list could not be read.
    Io,
    /// The bundled word list is corrupt.
    EmbeddedWordList,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(ErrorRepr);

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self.0 {
            ErrorRepr::AlphabetTooSmall(_)
            | ErrorRepr::AlphabetOutOfRange { .. }
            | ErrorRepr::DuplicateSymbol(_)
            | ErrorRepr::MapperSize { .. }
            | ErrorRepr::LengthTooLarge(_)
            | ErrorRepr::LengthRange { .. }
            | ErrorRepr::WordLengthRange { .. }
            | ErrorRepr::ZeroWordLength
            | ErrorRepr::EmptyDictionary { .. }
            | ErrorRepr::EmptyRange => ErrorKind::InvalidConfig,
            ErrorRepr::RandomSource(_) => ErrorKind::RandomSourceFailure,
            ErrorRepr::InsufficientRandomData { .. } | ErrorRepr::IndexDrawExhausted { .. } => {
                ErrorKind::InsufficientRandomData
            }
            ErrorRepr::WordFile { .. } => ErrorKind::Io,
            ErrorRepr::EmbeddedDecode(_) | ErrorRepr::EmbeddedDecompress(_) => {
                ErrorKind::EmbeddedWordList
            }
        }
    }

    /// Wrap a failure of an entropy source.
    ///
    /// Implementations of [`UniformRandomSource`] outside this crate use this to report that no
    /// bytes could be produced.
    pub fn random_source<E>(err: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ErrorRepr::RandomSource(Box::new(err)).into()
    }
}

impl From<ErrorRepr> for Error {
    fn from(err: ErrorRepr) -> Error {
        Error(err)
    }
}

#[derive(Debug, thiserror::Error)]
enum ErrorRepr {
    #[error("an alphabet needs at least 2 symbols, but {0} were requested")]
    AlphabetTooSmall(usize),
    #[error("an alphabet of {size} symbols starting at {start:?} leaves the valid character range")]
    AlphabetOutOfRange { start: char, size: usize },
    #[error("the character {0:?} appears more than once in the alphabet")]
    DuplicateSymbol(char),
    #[error("the alphabet has {size} symbols, but its mapper covers {covered}")]
    MapperSize { size: usize, covered: usize },
    #[error("a password of {0} characters is too long to generate")]
    LengthTooLarge(usize),
    #[error("the minimum length ({min}) is greater than the maximum length ({max})")]
    LengthRange { min: usize, max: usize },
    #[error("the minimum word length ({min}) is greater than the maximum word length ({max})")]
    WordLengthRange { min: usize, max: usize },
    #[error("word lengths must be at least 1")]
    ZeroWordLength,
    #[error("no words between {min} and {max} characters long are in the word list")]
    EmptyDictionary { min: usize, max: usize },
    #[error("cannot pick a value from an empty range")]
    EmptyRange,
    #[error("the random source failed: {0}")]
    RandomSource(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(
        "the random source produced {rejected} unusable values in a row ({produced} of {requested} \
         symbols were generated)"
    )]
    InsufficientRandomData {
        rejected: u32,
        produced: usize,
        requested: usize,
    },
    #[error(
        "the random source produced {rejected} unusable values in a row while picking a number \
         below {bound}"
    )]
    IndexDrawExhausted { rejected: u32, bound: u64 },
    #[error("failed to read word list {}: {source}", .path.display())]
    WordFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("the bundled word list is not valid base64: {0}")]
    EmbeddedDecode(#[source] base64::DecodeError),
    #[error("failed to decompress the bundled word list: {0}")]
    EmbeddedDecompress(#[source] io::Error),
}
