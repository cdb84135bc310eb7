//! Reading word lists.
//!
//! A word list is plain text with one word per line. The crate also bundles a default list,
//! stored gzip-compressed and base64-encoded; it is decoded on first use and then shared for the
//! life of the process.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use base64::Engine;
use flate2::read::GzDecoder;
use tracing::debug;

use crate::{Error, ErrorRepr};

static EMBEDDED: &str = include_str!("../data/words.gz.b64");

static EMBEDDED_WORDS: OnceLock<Vec<String>> = OnceLock::new();

/// Read one word per line, skipping blank lines and trimming surrounding whitespace.
pub fn parse_words(rdr: impl Read) -> io::Result<Vec<String>> {
    let mut words = Vec::new();
    for line in BufReader::new(rdr).lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_owned());
        }
    }
    Ok(words)
}

/// Read a word list file.
pub fn load_words(path: impl AsRef<Path>) -> Result<Vec<String>, Error> {
    let path = path.as_ref();
    let with_path = |source| ErrorRepr::WordFile {
        path: path.to_owned(),
        source,
    };
    let file = File::open(path).map_err(with_path)?;
    let words = parse_words(file).map_err(with_path)?;
    debug!(path = %path.display(), words = words.len(), "loaded word list");
    Ok(words)
}

/// The bundled word list.
pub fn embedded_words() -> Result<&'static [String], Error> {
    if let Some(words) = EMBEDDED_WORDS.get() {
        return Ok(words);
    }
    // Two threads may both decode here; whichever finishes first is kept.
    let words = decode_embedded(EMBEDDED)?;
    debug!(words = words.len(), "decoded bundled word list");
    Ok(EMBEDDED_WORDS.get_or_init(|| words))
}

fn decode_embedded(encoded: &str) -> Result<Vec<String>, ErrorRepr> {
    let compact = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect::<Vec<_>>();
    let compressed = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(ErrorRepr::EmbeddedDecode)?;
    parse_words(GzDecoder::new(&compressed[..])).map_err(ErrorRepr::EmbeddedDecompress)
}
