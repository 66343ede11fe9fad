//! Text to symbol stream.
//!
//! Sequence lines are concatenated without separators. Every marker line
//! becomes a `Marker` followed by enough `Pad` to close the current codon, so
//! that a record boundary never shares a codon with the next record's bases.
//! The block of a marker line that comes before any sequence carries no data
//! and is not emitted.

use crate::error::CodecError;
use crate::symbol::{Nucleotide, Symbol, SymbolStream, CODON_LEN};

/// First non-whitespace byte of a record header line.
pub const RECORD_SENTINEL: u8 = b'>';

/// True when the first non-whitespace byte of `line` is [`RECORD_SENTINEL`].
pub fn is_marker_line(line: &[u8]) -> bool {
    line.trim_ascii_start().first() == Some(&RECORD_SENTINEL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The next symbol lands in `slot` of the current codon.
    Accumulating { slot: usize },
    /// Codon-aligned right after a marker block.
    Flushed,
}

/// Line-by-line normalizer. Feed lines in order, then call [`finish`].
///
/// [`finish`]: Normalizer::finish
#[derive(Debug)]
pub struct Normalizer {
    state: State,
    symbols: Vec<Symbol>,
    line_no: usize,
    leading: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer {
            state: State::Accumulating { slot: 0 },
            symbols: Vec::new(),
            line_no: 0,
            leading: true,
        }
    }

    /// Pre-size the symbol buffer, e.g. from the input length.
    pub fn with_capacity(capacity: usize) -> Self {
        Normalizer {
            symbols: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    fn slot(&self) -> usize {
        match self.state {
            State::Accumulating { slot } => slot,
            State::Flushed => 0,
        }
    }

    fn push(&mut self, symbol: Symbol) {
        let slot = self.slot();
        self.symbols.push(symbol);
        self.state = State::Accumulating {
            slot: (slot + 1) % CODON_LEN,
        };
    }

    /// Pad out the current codon and enter `Flushed`.
    fn flush(&mut self) {
        let missing = (CODON_LEN - self.slot()) % CODON_LEN;
        self.symbols.extend(std::iter::repeat(Symbol::Pad).take(missing));
        self.state = State::Flushed;
        debug_assert_eq!(self.symbols.len() % CODON_LEN, 0);
    }

    /// Consume one line, with or without its trailing separator.
    pub fn feed_line(&mut self, line: &[u8]) -> Result<(), CodecError> {
        self.line_no += 1;

        if is_marker_line(line) {
            if self.leading {
                self.leading = false;
                self.state = State::Flushed;
                return Ok(());
            }
            self.push(Symbol::Marker);
            self.flush();
            return Ok(());
        }

        let indent = line.len() - line.trim_ascii_start().len();
        let trimmed = line.trim_ascii();
        for (i, &byte) in trimmed.iter().enumerate() {
            let base = Nucleotide::from_ascii(byte).ok_or_else(|| CodecError::InvalidSymbol {
                symbol: char_at(trimmed, i),
                line: self.line_no,
                column: indent + i + 1,
            })?;
            self.leading = false;
            self.push(Symbol::Base(base));
        }
        Ok(())
    }

    /// Pad the tail and hand out the aligned stream.
    pub fn finish(mut self) -> Result<SymbolStream, CodecError> {
        self.flush();
        SymbolStream::from_aligned(self.symbols).map_err(|s| CodecError::Unaligned(s.len()))
    }
}

/// The character starting at byte `at`, or U+FFFD when the bytes there are
/// not valid UTF-8.
fn char_at(bytes: &[u8], at: usize) -> char {
    let end = bytes.len().min(at + 4);
    String::from_utf8_lossy(&bytes[at..end])
        .chars()
        .next()
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Normalize a whole text buffer.
pub fn normalize(text: impl AsRef<[u8]>) -> Result<SymbolStream, CodecError> {
    let text = text.as_ref();
    let mut normalizer = Normalizer::with_capacity(text.len() + CODON_LEN);
    for line in text.split(|&b| b == b'\n') {
        normalizer.feed_line(line)?;
    }
    normalizer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(text: &str) -> String {
        normalize(text).unwrap().to_string()
    }

    #[test]
    fn test_single_record() {
        assert_eq!(norm(">seq1\nACGT\n"), "ACGT__");
    }

    #[test]
    fn test_lines_are_concatenated() {
        assert_eq!(norm(">seq1\nACG\nTTA\nC\n"), "ACGTTAC__");
    }

    #[test]
    fn test_interior_marker_pads_current_codon() {
        assert_eq!(norm(">r1\nAC\n>r2\nG\n"), "AC>G__");
        assert_eq!(norm(">r1\nA\n>r2\nG\n"), "A>_G__");
        assert_eq!(norm(">r1\nACG\n>r2\nT\n"), "ACG>__T__");
    }

    #[test]
    fn test_only_first_leading_marker_is_dropped() {
        assert_eq!(norm(">a\n>b\nAC\n"), ">__AC_");
    }

    #[test]
    fn test_markerless_input_keeps_every_symbol() {
        assert_eq!(norm("ACGT\nA\n"), "ACGTA_");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(norm("  >seq1 desc\r\n  AC \r\n\tGT\r\n"), "ACGT__");
    }

    #[test]
    fn test_blank_lines_contribute_nothing() {
        assert_eq!(norm("\n\n>seq\n\nAC\n\nG\n"), "ACG");
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(normalize("").unwrap().is_empty());
        assert!(normalize(">only\n").unwrap().is_empty());
    }

    #[test]
    fn test_u_is_kept_verbatim() {
        assert_eq!(norm(">rna\nACGU\n"), "ACGU__");
    }

    #[test]
    fn test_unknown_symbol_fails_fast() {
        let err = normalize(">x\nAC\n GN\n").unwrap_err();
        match err {
            CodecError::InvalidSymbol {
                symbol,
                line,
                column,
            } => {
                assert_eq!(symbol, 'N');
                assert_eq!(line, 3);
                assert_eq!(column, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lowercase_is_rejected() {
        assert!(matches!(
            normalize(">x\nacgt\n"),
            Err(CodecError::InvalidSymbol { symbol: 'a', .. })
        ));
    }

    #[test]
    fn test_multibyte_symbol_is_reported_whole() {
        match normalize(">x\nACé\n").unwrap_err() {
            CodecError::InvalidSymbol { symbol, line, column } => {
                assert_eq!(symbol, 'é');
                assert_eq!(line, 2);
                assert_eq!(column, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            normalize(b"AC\xff\n"),
            Err(CodecError::InvalidSymbol { symbol: char::REPLACEMENT_CHARACTER, .. })
        ));
    }

    #[test]
    fn test_marker_detection() {
        assert!(is_marker_line(b">chr1"));
        assert!(is_marker_line(b"   >chr1"));
        assert!(!is_marker_line(b"AC>GT"));
        assert!(!is_marker_line(b""));
    }
}
