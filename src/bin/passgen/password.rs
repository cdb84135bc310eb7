//! The `password` command.

use std::io::Write;

use anyhow::Context;
use passgen::{Alphabet, OsRandom};

use crate::ProgError;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum PasswordType {
    /// Printable ASCII, including space and punctuation.
    #[value(alias = "s")]
    Secure,
    /// Decimal digits.
    #[value(alias = "n")]
    Numeric,
    /// ASCII letters and digits.
    #[value(alias = "a")]
    Alphanumeric,
    /// ASCII letters.
    Alpha,
    /// Upper case ASCII letters.
    Upper,
    /// Lower case ASCII letters.
    Lower,
}

pub(crate) fn select_alphabet(
    kind: PasswordType,
    chars: Option<&str>,
) -> Result<Alphabet, ProgError> {
    if let Some(chars) = chars {
        return Ok(Alphabet::from_chars(chars.chars())?);
    }
    Ok(match kind {
        PasswordType::Secure => Alphabet::secure(),
        PasswordType::Numeric => Alphabet::numeric(),
        PasswordType::Alphanumeric => Alphabet::alphanumeric(),
        PasswordType::Alpha => Alphabet::alpha(),
        PasswordType::Upper => Alphabet::alpha_upper(),
        PasswordType::Lower => Alphabet::alpha_lower(),
    })
}

pub(crate) fn print_passwords(
    alphabet: &Alphabet,
    num: usize,
    min: usize,
    max: usize,
    show_entropy: bool,
    mut output: impl Write,
) -> Result<(), ProgError> {
    let mut rng = OsRandom::default();
    for _ in 0..num {
        let password = alphabet.generate(&mut rng, min, max)?;
        writeln!(output, "{password}").context("failed to write password")?;
    }
    output.flush().context("failed to write password")?;

    if show_entropy {
        if min == max {
            eprintln!("{:.1} bits of entropy", alphabet.entropy_bits(min));
        } else {
            eprintln!(
                "{:.1} to {:.1} bits of entropy",
                alphabet.entropy_bits(min),
                alphabet.entropy_bits(max)
            );
        }
    }
    Ok(())
}
