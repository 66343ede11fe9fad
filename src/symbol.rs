use core::fmt;

/// A nucleotide as it appears in sequence text.
///
/// `U` is kept distinct so normalization stays verbatim, but it shares `T`'s
/// code everywhere a code is needed (A=0, C=1, G=2, T/U=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    U,
}

impl Nucleotide {
    /// Parse an uppercase ASCII byte. Lowercase and ambiguity codes are not
    /// part of the alphabet.
    #[inline]
    pub const fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(Self::A),
            b'C' => Some(Self::C),
            b'G' => Some(Self::G),
            b'T' => Some(Self::T),
            b'U' => Some(Self::U),
            _ => None,
        }
    }

    /// Two-bit code of the base.
    #[inline(always)]
    pub const fn code(self) -> u8 {
        match self {
            Self::A => 0,
            Self::C => 1,
            Self::G => 2,
            Self::T | Self::U => 3,
        }
    }

    /// Inverse of [`Nucleotide::code`]. Code 3 always yields `T`.
    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::A),
            1 => Some(Self::C),
            2 => Some(Self::G),
            3 => Some(Self::T),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn to_ascii(self) -> u8 {
        match self {
            Self::A => b'A',
            Self::C => b'C',
            Self::G => b'G',
            Self::T => b'T',
            Self::U => b'U',
        }
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii() as char)
    }
}

/// One slot of the normalized stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Base(Nucleotide),
    /// In-band record boundary.
    Marker,
    /// Alignment filler, only ever produced by the normalizer.
    Pad,
}

impl Symbol {
    /// Character used when rendering a stream: bases as themselves, `>` for
    /// markers and `_` for padding.
    pub const fn to_ascii(self) -> u8 {
        match self {
            Self::Base(n) => n.to_ascii(),
            Self::Marker => b'>',
            Self::Pad => b'_',
        }
    }
}

/// Number of symbols packed into one byte.
pub const CODON_LEN: usize = 3;

/// A symbol stream whose length is a multiple of [`CODON_LEN`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolStream {
    symbols: Vec<Symbol>,
}

impl SymbolStream {
    /// Wrap an already aligned vector, returning it back if it is not aligned.
    pub fn from_aligned(symbols: Vec<Symbol>) -> Result<Self, Vec<Symbol>> {
        if symbols.len() % CODON_LEN == 0 {
            Ok(Self { symbols })
        } else {
            Err(symbols)
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over complete codons.
    pub fn codons(&self) -> impl Iterator<Item = [Symbol; CODON_LEN]> + '_ {
        self.symbols
            .chunks_exact(CODON_LEN)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
    }
}

impl fmt::Display for SymbolStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol.to_ascii() as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u_shares_t_code() {
        assert_eq!(Nucleotide::U.code(), Nucleotide::T.code());
        assert_eq!(Nucleotide::from_code(3), Some(Nucleotide::T));
    }

    #[test]
    fn test_from_ascii_is_case_sensitive() {
        assert_eq!(Nucleotide::from_ascii(b'G'), Some(Nucleotide::G));
        assert_eq!(Nucleotide::from_ascii(b'g'), None);
        assert_eq!(Nucleotide::from_ascii(b'N'), None);
    }

    #[test]
    fn test_stream_rejects_unaligned() {
        let symbols = vec![Symbol::Base(Nucleotide::A), Symbol::Pad];
        assert!(SymbolStream::from_aligned(symbols).is_err());
    }

    #[test]
    fn test_codons_walk_the_stream_in_order() {
        let stream = SymbolStream::from_aligned(vec![
            Symbol::Base(Nucleotide::G),
            Symbol::Base(Nucleotide::A),
            Symbol::Base(Nucleotide::T),
            Symbol::Base(Nucleotide::C),
            Symbol::Pad,
            Symbol::Pad,
        ])
        .unwrap();
        let codons: Vec<_> = stream.codons().collect();
        assert_eq!(codons.len(), stream.len() / CODON_LEN);
        assert_eq!(codons[1], [Symbol::Base(Nucleotide::C), Symbol::Pad, Symbol::Pad]);
    }

    #[test]
    fn test_stream_display() {
        let stream = SymbolStream::from_aligned(vec![
            Symbol::Base(Nucleotide::A),
            Symbol::Marker,
            Symbol::Pad,
        ])
        .unwrap();
        assert_eq!(stream.to_string(), "A>_");
        assert_eq!(stream.codons().count(), 1);
    }
}
