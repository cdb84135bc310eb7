//! The `passphrase` command.

use std::io::Write;

use anyhow::Context;
use passgen::{Dictionary, OsRandom};

use crate::ProgError;

/// `--dict` value selecting the bundled word list.
pub(crate) static INTERNAL_DICT: &str = "internal";

pub(crate) fn load_dictionary(dict: &str, min: usize, max: usize) -> Result<Dictionary, ProgError> {
    let dictionary = if dict == INTERNAL_DICT {
        Dictionary::embedded(min, max)?
    } else {
        Dictionary::from_file(dict, min, max)?
    };
    tracing::info!(words = dictionary.len(), "dictionary ready");
    Ok(dictionary)
}

pub(crate) fn print_passphrases(
    dictionary: &Dictionary,
    num: usize,
    words: usize,
    show_entropy: bool,
    mut output: impl Write,
) -> Result<(), ProgError> {
    let mut rng = OsRandom::default();
    for _ in 0..num {
        let passphrase = dictionary.generate(&mut rng, words)?;
        writeln!(output, "{passphrase}").context("failed to write passphrase")?;
    }
    output.flush().context("failed to write passphrase")?;

    if show_entropy {
        eprintln!(
            "{:.1} bits of entropy ({} candidate words)",
            dictionary.entropy_bits(words),
            dictionary.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_dictionary() {
        let dictionary = load_dictionary(INTERNAL_DICT, 4, 10).unwrap();
        let mut out = Vec::new();
        print_passphrases(&dictionary, 3, 4, false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 3);
        for line in out.lines() {
            let words = line.split(' ').collect::<Vec<_>>();
            assert_eq!(words.len(), 4);
            assert!(words.iter().all(|w| (4..=10).contains(&w.len())), "{line}");
        }
    }

    #[test]
    fn dictionary_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cat\nhorse\nox").unwrap();
        let path = file.path().to_str().unwrap();
        let dictionary = load_dictionary(path, 3, 3).unwrap();
        assert_eq!(dictionary.words(), ["cat"]);

        assert!(load_dictionary(path, 6, 9).is_err());
    }
}
