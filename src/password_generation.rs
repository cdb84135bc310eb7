//! Utilities for generating passwords.
//!
//! An [`Alphabet`] turns uniformly random 32-bit words into symbols. Rather than spending a draw
//! per symbol, it decodes as many symbols as fit in one word: for an alphabet of `size` symbols
//! that is the largest `width` with `size^width <= 2^32 - 1`. A word is read as a `width`-digit
//! number in base `size`, and each digit becomes one symbol.
//!
//! Reducing a 32-bit word modulo `size^width` would favour small values unless `size^width`
//! divides 2^32, so words at or above the largest multiple of `size^width` that fits in 2^32 are
//! thrown away and redrawn. Every symbol that comes out is therefore exactly uniform.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::random::{UniformRandomSource, MAX_CONSECUTIVE_REJECTIONS};
use crate::{Error, ErrorRepr};

/// Maps a symbol index in `[0, size)` to the character that represents it.
pub trait SymbolMapper: Send + Sync {
    fn map_index(&self, index: u32) -> char;

    /// How many indices this mapper has characters for, if it knows.
    ///
    /// An alphabet refuses a mapper whose count differs from the alphabet's size.
    fn symbol_count(&self) -> Option<usize> {
        None
    }
}

/// The default mapping: index `i` becomes the character `start + i`.
#[derive(Clone, Copy, Debug)]
pub struct LinearOffset {
    start: char,
    size: u32,
}

impl LinearOffset {
    /// A linear mapping of `size` characters starting at `start`.
    ///
    /// Fails if any of those characters would fall outside the valid range of `char`.
    pub fn new(start: char, size: usize) -> Result<LinearOffset, Error> {
        let out_of_range = || ErrorRepr::AlphabetOutOfRange { start, size };
        let size = u32::try_from(size).map_err(|_| out_of_range())?;
        let last = size
            .checked_sub(1)
            .and_then(|offset| (start as u32).checked_add(offset))
            .ok_or_else(out_of_range)?;
        // A run of characters is contiguous only if it doesn't straddle the surrogate gap.
        let crosses_surrogates = (start as u32) < 0xD800 && last >= 0xD800;
        if char::from_u32(last).is_none() || crosses_surrogates {
            return Err(out_of_range().into());
        }
        Ok(LinearOffset { start, size })
    }
}

impl SymbolMapper for LinearOffset {
    fn map_index(&self, index: u32) -> char {
        char::from_u32(self.start as u32 + index).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn symbol_count(&self) -> Option<usize> {
        Some(self.size as usize)
    }
}

/// An explicit list of characters; index `i` becomes the `i`th character.
#[derive(Clone, Debug)]
pub struct CharTable(Vec<char>);

impl CharTable {
    pub fn new<I: IntoIterator<Item = char>>(chars: I) -> Result<CharTable, Error> {
        let chars = chars.into_iter().collect::<Vec<_>>();
        let mut seen = HashSet::with_capacity(chars.len());
        for &ch in &chars {
            if !seen.insert(ch) {
                return Err(ErrorRepr::DuplicateSymbol(ch).into());
            }
        }
        Ok(CharTable(chars))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl SymbolMapper for CharTable {
    fn map_index(&self, index: u32) -> char {
        self.0
            .get(index as usize)
            .copied()
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn symbol_count(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

/// `0-9`, then `A-Z`, then `a-z`.
struct AlphaNumeric;

impl SymbolMapper for AlphaNumeric {
    fn map_index(&self, index: u32) -> char {
        let index = index as u8;
        match index {
            0..=9 => char::from(b'0' + index),
            10..=35 => char::from(b'A' + index - 10),
            _ => char::from(b'a' + index - 36),
        }
    }
}

/// `A-Z`, then `a-z`.
struct Alpha;

impl SymbolMapper for Alpha {
    fn map_index(&self, index: u32) -> char {
        let index = index as u8;
        match index {
            0..=25 => char::from(b'A' + index),
            _ => char::from(b'a' + index - 26),
        }
    }
}

/// A fixed set of symbols that passwords are drawn from.
///
/// An alphabet is immutable once built, and can be used to generate any number of passwords,
/// from any number of threads.
pub struct Alphabet {
    start: char,
    size: u32,
    mapper: Box<dyn SymbolMapper>,
    /// Symbols decoded from each accepted 32-bit draw.
    chunk_width: usize,
    /// Draws at or above this are rejected. May be 2^32, in which case nothing is.
    bias_threshold: u64,
}

impl Alphabet {
    /// An alphabet of `size` consecutive characters, starting at `start`.
    pub fn new(start: char, size: usize) -> Result<Alphabet, Error> {
        check_size(size)?;
        let mapper = LinearOffset::new(start, size)?;
        Ok(Alphabet::build(start, size as u32, Box::new(mapper)))
    }

    /// An alphabet of `size` symbols, where `mapper` picks the character for each symbol.
    ///
    /// `start` is only informational here; `mapper` alone decides the output. A mapper that
    /// reports a [`SymbolMapper::symbol_count`] must cover exactly `size` symbols.
    pub fn with_mapper<M>(start: char, size: usize, mapper: M) -> Result<Alphabet, Error>
    where
        M: SymbolMapper + 'static,
    {
        check_size(size)?;
        if let Some(covered) = mapper.symbol_count().filter(|&covered| covered != size) {
            return Err(ErrorRepr::MapperSize { size, covered }.into());
        }
        let size = u32::try_from(size).map_err(|_| ErrorRepr::AlphabetOutOfRange { start, size })?;
        Ok(Alphabet::build(start, size, Box::new(mapper)))
    }

    /// An alphabet made of exactly the given characters, which must be distinct.
    pub fn from_chars<I: IntoIterator<Item = char>>(chars: I) -> Result<Alphabet, Error> {
        let table = CharTable::new(chars)?;
        check_size(table.len())?;
        let start = table.0[0];
        Alphabet::with_mapper(start, table.len(), table)
    }

    /// Printable ASCII, `' '` through `'~'`: 95 characters.
    pub fn secure() -> Alphabet {
        Alphabet::build(' ', 95, Box::new(LinearOffset { start: ' ', size: 95 }))
    }

    /// `0-9`: 10 characters.
    pub fn numeric() -> Alphabet {
        Alphabet::build('0', 10, Box::new(LinearOffset { start: '0', size: 10 }))
    }

    /// `0-9`, `A-Z` and `a-z`: 62 characters.
    pub fn alphanumeric() -> Alphabet {
        Alphabet::build('0', 62, Box::new(AlphaNumeric))
    }

    /// `A-Z` and `a-z`: 52 characters.
    pub fn alpha() -> Alphabet {
        Alphabet::build('A', 52, Box::new(Alpha))
    }

    /// `A-Z`: 26 characters.
    pub fn alpha_upper() -> Alphabet {
        Alphabet::build('A', 26, Box::new(LinearOffset { start: 'A', size: 26 }))
    }

    /// `a-z`: 26 characters.
    pub fn alpha_lower() -> Alphabet {
        Alphabet::build('a', 26, Box::new(LinearOffset { start: 'a', size: 26 }))
    }

    fn build(start: char, size: u32, mapper: Box<dyn SymbolMapper>) -> Alphabet {
        let size_wide = u64::from(size);
        let mut chunk_width = 0;
        let mut span = 1u64;
        // `span` and `size` are both below 2^32, so this can't overflow.
        while span * size_wide <= u64::from(u32::MAX) {
            span *= size_wide;
            chunk_width += 1;
        }
        let bias_threshold = (1u64 << 32) / span * span;
        debug!(size, chunk_width, bias_threshold, "built password alphabet");
        Alphabet {
            start,
            size,
            mapper,
            chunk_width,
            bias_threshold,
        }
    }

    pub fn start(&self) -> char {
        self.start
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// How many symbols one accepted 32-bit draw yields.
    pub fn chunk_width(&self) -> usize {
        self.chunk_width
    }

    /// Draws at or above this value are discarded.
    pub fn bias_threshold(&self) -> u64 {
        self.bias_threshold
    }

    /// Bits of entropy in a password of `len` symbols from this alphabet.
    pub fn entropy_bits(&self, len: usize) -> f64 {
        len as f64 * f64::from(self.size).log2()
    }

    /// Generate a password between `min` and `max` characters long (inclusive).
    ///
    /// When `min != max` the length itself is picked uniformly at random. Either a password of
    /// the chosen length is returned, or an error; never a shorter password.
    pub fn generate<R>(&self, rng: &mut R, min: usize, max: usize) -> Result<String, Error>
    where
        R: UniformRandomSource + ?Sized,
    {
        if min > max {
            return Err(ErrorRepr::LengthRange { min, max }.into());
        }
        let length = if min == max {
            min
        } else {
            let span = (max - min) as u64;
            let extra = match span.checked_add(1) {
                Some(bound) => rng.uniform_below(bound)?,
                None => rng.next_u64()?,
            };
            min + extra as usize
        };

        let capacity = length
            .div_ceil(self.chunk_width)
            .checked_mul(self.chunk_width)
            .ok_or(ErrorRepr::LengthTooLarge(length))?;
        let mut buf = vec!['\0'; capacity];
        let mut filled = 0;
        let mut rejected = 0;
        while filled < length {
            let v = rng.next_u32()?;
            if u64::from(v) >= self.bias_threshold {
                rejected += 1;
                trace!(rejected, "rejected biased draw");
                if rejected == MAX_CONSECUTIVE_REJECTIONS {
                    warn!(
                        produced = filled,
                        requested = length,
                        "random source exhausted the rejection budget"
                    );
                    return Err(ErrorRepr::InsufficientRandomData {
                        rejected,
                        produced: filled,
                        requested: length,
                    }
                    .into());
                }
                continue;
            }
            rejected = 0;
            self.decode_chunk(v, &mut buf[filled..filled + self.chunk_width]);
            filled += self.chunk_width;
        }

        Ok(buf[..length].iter().collect())
    }

    /// Write `v` into `out` as base-`size` digits, most significant first.
    fn decode_chunk(&self, mut v: u32, out: &mut [char]) {
        for slot in out.iter_mut().rev() {
            *slot = self.mapper.map_index(v % self.size);
            v /= self.size;
        }
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alphabet")
            .field("start", &self.start)
            .field("size", &self.size)
            .field("chunk_width", &self.chunk_width)
            .field("bias_threshold", &self.bias_threshold)
            .finish_non_exhaustive()
    }
}

fn check_size(size: usize) -> Result<(), Error> {
    if size < 2 {
        Err(ErrorRepr::AlphabetTooSmall(size).into())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::random::testing::Replay;
    use crate::{CryptoRngSource, ErrorKind};

    fn seeded() -> CryptoRngSource<StdRng> {
        CryptoRngSource::new(StdRng::seed_from_u64(0x5eed))
    }

    #[test]
    fn chunk_width_and_threshold() {
        let cases = [
            (Alphabet::numeric(), 9, 4_000_000_000u64),
            (Alphabet::secure(), 4, 52 * 81_450_625),
            (Alphabet::alpha_lower(), 6, 13 * 308_915_776),
            (Alphabet::alphanumeric(), 5, 4 * 916_132_832),
            (Alphabet::new('0', 2).unwrap(), 31, 1u64 << 32),
            (
                Alphabet::with_mapper(
                    '\0',
                    65_536,
                    LinearOffset {
                        start: '\0',
                        size: 65_536,
                    },
                )
                .unwrap(),
                1,
                1u64 << 32,
            ),
        ];
        for (alphabet, width, threshold) in cases {
            assert_eq!(alphabet.chunk_width(), width, "{alphabet:?}");
            assert_eq!(alphabet.bias_threshold(), threshold, "{alphabet:?}");
            let size = alphabet.size() as u64;
            assert!(size.pow(width as u32) <= u64::from(u32::MAX));
            assert!(size.pow(width as u32 + 1) > u64::from(u32::MAX));
        }
    }

    #[test]
    fn decodes_most_significant_digit_first() {
        let mut src = Replay::words(&[123_456_789]);
        let password = Alphabet::numeric().generate(&mut src, 9, 9).unwrap();
        assert_eq!(password, "123456789");

        let mut src = Replay::words(&[123_456_789]);
        let password = Alphabet::numeric().generate(&mut src, 4, 4).unwrap();
        assert_eq!(password, "1234");
    }

    #[test]
    fn draws_at_the_threshold_are_rejected() {
        let mut src = Replay::words(&[u32::MAX, 4_000_000_000, 3_999_999_999]);
        let password = Alphabet::numeric().generate(&mut src, 9, 9).unwrap();
        assert_eq!(password, "999999999");
        assert_eq!(src.pos, 12);
    }

    #[test]
    fn long_passwords_span_several_draws() {
        let mut src = Replay::words(&[111_111_111, 222_222_222]);
        let password = Alphabet::numeric().generate(&mut src, 12, 12).unwrap();
        assert_eq!(password, "111111111222");
    }

    #[test]
    fn stuck_source_is_insufficient() {
        let mut src = Replay::words(&[u32::MAX]);
        let err = Alphabet::numeric().generate(&mut src, 8, 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientRandomData);
    }

    #[test]
    fn zero_length() {
        let mut src = Replay::words(&[1]);
        assert_eq!(Alphabet::secure().generate(&mut src, 0, 0).unwrap(), "");
        assert_eq!(src.pos, 0);
    }

    #[test]
    fn lengths_within_bounds() {
        let mut rng = seeded();
        let alphabet = Alphabet::secure();
        for _ in 0..500 {
            let len = alphabet.generate(&mut rng, 14, 20).unwrap().chars().count();
            assert!((14..=20).contains(&len), "{len}");
        }
        for len in [1, 4, 15, 40, 200] {
            let password = alphabet.generate(&mut rng, len, len).unwrap();
            assert_eq!(password.chars().count(), len);
        }
    }

    #[test]
    fn preset_alphabets_stay_in_their_sets() {
        let digits = "0123456789";
        let upper = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let lower = "abcdefghijklmnopqrstuvwxyz";
        let cases: [(Alphabet, String); 6] = [
            (Alphabet::numeric(), digits.to_owned()),
            (Alphabet::alpha_upper(), upper.to_owned()),
            (Alphabet::alpha_lower(), lower.to_owned()),
            (Alphabet::alpha(), format!("{upper}{lower}")),
            (Alphabet::alphanumeric(), format!("{digits}{upper}{lower}")),
            (Alphabet::secure(), (' '..='~').collect::<String>()),
        ];
        let mut rng = seeded();
        for (alphabet, allowed) in cases {
            let mut seen = HashSet::new();
            for _ in 0..200 {
                let password = alphabet.generate(&mut rng, 40, 200).unwrap();
                for ch in password.chars() {
                    assert!(allowed.contains(ch), "{ch:?} from {alphabet:?}");
                    seen.insert(ch);
                }
            }
            assert_eq!(seen.len(), alphabet.size(), "{alphabet:?}");
        }
    }

    #[test]
    fn small_linear_alphabet() {
        let alphabet = Alphabet::new('a', 5).unwrap();
        let mut rng = seeded();
        let password = alphabet.generate(&mut rng, 500, 500).unwrap();
        assert!(password.chars().all(|c| ('a'..='e').contains(&c)));
    }

    #[test]
    fn custom_characters() {
        let alphabet = Alphabet::from_chars("!x7".chars()).unwrap();
        assert_eq!(alphabet.size(), 3);
        let mut rng = seeded();
        let password = alphabet.generate(&mut rng, 100, 100).unwrap();
        assert!(password.chars().all(|c| "!x7".contains(c)));

        let err = Alphabet::from_chars("abca".chars()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn mapper_must_cover_the_alphabet() {
        let short_table = CharTable::new("ab".chars()).unwrap();
        let err = Alphabet::with_mapper('a', 10, short_table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let five = LinearOffset::new('a', 5).unwrap();
        let err = Alphabet::with_mapper('a', 26, five).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let alphabet = Alphabet::with_mapper('a', 5, five).unwrap();
        let password = alphabet.generate(&mut seeded(), 200, 200).unwrap();
        assert!(password.chars().all(|c| ('a'..='e').contains(&c)), "{password}");

        let table = CharTable::new("xyz".chars()).unwrap();
        let alphabet = Alphabet::with_mapper('x', 3, table).unwrap();
        let password = alphabet.generate(&mut seeded(), 50, 50).unwrap();
        assert!(password.chars().all(|c| "xyz".contains(c)), "{password}");
    }

    #[test]
    fn oversized_length_is_invalid() {
        let mut src = Replay::words(&[1]);
        for alphabet in [Alphabet::numeric(), Alphabet::secure()] {
            let err = alphabet
                .generate(&mut src, usize::MAX, usize::MAX)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        }
        assert_eq!(src.pos, 0);
    }

    #[test]
    fn invalid_alphabets() {
        for size in [0, 1] {
            assert_eq!(
                Alphabet::new('a', size).unwrap_err().kind(),
                ErrorKind::InvalidConfig
            );
        }
        assert_eq!(
            Alphabet::from_chars("a".chars()).unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
        assert!(Alphabet::new('\u{D7FF}', 2).is_err());
        assert!(Alphabet::new(char::MAX, 2).is_err());
        assert!(Alphabet::new('\u{E000}', 2).is_ok());
    }

    #[test]
    fn min_above_max_is_invalid() {
        let err = Alphabet::numeric()
            .generate(&mut seeded(), 5, 4)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn entropy() {
        let bits = Alphabet::new('a', 16).unwrap().entropy_bits(10);
        assert!((bits - 40.0).abs() < 1e-9);
    }

    #[test]
    fn alphabets_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Alphabet>();
    }
}
