use std::io;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod passphrase;
mod password;

use password::PasswordType;

/// Create secure passwords and passphrases.
#[derive(Parser)]
#[command(name = "passgen")]
enum Args {
    /// Generate passwords of random characters.
    Password {
        /// Number of passwords to generate.
        #[arg(short, long, default_value_t = 1)]
        num: usize,
        /// Minimum length of a generated password.
        #[arg(short, long, default_value_t = 8)]
        min: usize,
        /// Maximum length of a generated password.
        #[arg(short = 'x', long, default_value_t = 14)]
        max: usize,
        /// Which characters a password may contain.
        #[arg(short = 't', long = "type", value_enum, default_value_t = PasswordType::Secure)]
        kind: PasswordType,
        /// Draw from exactly these characters instead; overrides `--type`.
        #[arg(long)]
        chars: Option<String>,
        /// Report the entropy of the generated passwords on stderr.
        #[arg(long)]
        entropy: bool,
    },
    /// Generate passphrases of random words.
    Passphrase {
        /// Number of passphrases to generate.
        #[arg(short, long, default_value_t = 1)]
        num: usize,
        /// Number of words in each passphrase.
        #[arg(short, long, default_value_t = 4)]
        words: usize,
        /// Minimum length of the words to allow.
        #[arg(short, long, default_value_t = 4)]
        min: usize,
        /// Maximum length of the words to allow.
        #[arg(short = 'x', long, default_value_t = 10)]
        max: usize,
        /// Word list to draw from, one word per line. `internal` uses the bundled list.
        #[arg(short, long, env = "PASSGEN_DICT", default_value = "internal")]
        dict: String,
        /// Report the entropy of the generated passphrases on stderr.
        #[arg(long)]
        entropy: bool,
    },
}

fn run() -> Result<(), ProgError> {
    let args = Args::parse();

    match args {
        Args::Password {
            num,
            min,
            max,
            kind,
            chars,
            entropy,
        } => {
            let alphabet = password::select_alphabet(kind, chars.as_deref())?;
            password::print_passwords(&alphabet, num, min, max, entropy, io::stdout().lock())?;
        }
        Args::Passphrase {
            num,
            words,
            min,
            max,
            dict,
            entropy,
        } => {
            let dictionary = passphrase::load_dictionary(&dict, min, max)?;
            passphrase::print_passphrases(&dictionary, num, words, entropy, io::stdout().lock())?;
        }
    }

    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        process::exit(1);
    }
}

#[derive(Debug, thiserror::Error)]
enum ProgError {
    #[error("{0}")]
    Passgen(passgen::Error),
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for ProgError {
    fn from(err: anyhow::Error) -> ProgError {
        ProgError::Other(err)
    }
}

impl From<passgen::Error> for ProgError {
    fn from(err: passgen::Error) -> ProgError {
        ProgError::Passgen(err)
    }
}
