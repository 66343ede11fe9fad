//! Three symbols per byte.
//!
//! Every real base in a codon adds the base-presence value 64 plus its code
//! scaled by the slot weight (16, 4, 1 for slots 0, 1, 2). A `Pad` adds 1 and
//! ends the codon; a `Marker` adds nothing.
//!
//! | symbol | slot 0 | slot 1 | slot 2 |
//! |--------|--------|--------|--------|
//! | A      | 64     | 64     | 64     |
//! | C      | 80     | 68     | 65     |
//! | G      | 96     | 72     | 66     |
//! | T / U  | 112    | 76     | 67     |

use crate::error::CodecError;
use crate::symbol::{Nucleotide, Symbol, SymbolStream, CODON_LEN};

const BASE_PRESENT: u8 = 64;
const SLOT_WEIGHTS: [u8; CODON_LEN] = [16, 4, 1];
const PAD_BIT: u8 = 1;

/// Pack one codon. Slots are visited 0, 1, 2; the first `Pad` sets the pad
/// bit and returns without looking at the remaining slots.
pub fn pack_codon(codon: &[Symbol; CODON_LEN]) -> u8 {
    let mut byte = 0u8;
    for (slot, symbol) in codon.iter().enumerate() {
        match symbol {
            Symbol::Pad => return byte + PAD_BIT,
            Symbol::Base(base) => byte += BASE_PRESENT + base.code() * SLOT_WEIGHTS[slot],
            Symbol::Marker => {}
        }
    }
    byte
}

/// Pack an aligned stream, one byte per codon in stream order.
pub fn pack(stream: &SymbolStream) -> Vec<u8> {
    stream.codons().map(|codon| pack_codon(&codon)).collect()
}

/// Expand one packed byte back into its codon.
///
/// A marker is only visible when it sits in slot 2; a marker in slot 0 or 1
/// is followed by padding and reads back as `Pad`.
pub fn unpack_byte(byte: u8) -> Option<[Symbol; CODON_LEN]> {
    let bases = byte / BASE_PRESENT;
    let rest = byte % BASE_PRESENT;
    let base = |slot: usize| {
        let code = (rest / SLOT_WEIGHTS[slot]) % 4;
        Nucleotide::from_code(code).map(Symbol::Base)
    };

    match (bases, rest) {
        (3, _) => Some([base(0)?, base(1)?, base(2)?]),
        (2, r) if r % 4 == 1 => Some([base(0)?, base(1)?, Symbol::Pad]),
        (2, r) if r % 4 == 0 => Some([base(0)?, base(1)?, Symbol::Marker]),
        (1, r) if r % 16 == 1 => Some([base(0)?, Symbol::Pad, Symbol::Pad]),
        (0, 1) => Some([Symbol::Pad; CODON_LEN]),
        _ => None,
    }
}

/// Inverse of [`pack`] up to the marker ambiguity described on [`unpack_byte`].
pub fn unpack(bytes: &[u8]) -> Result<Vec<Symbol>, CodecError> {
    let mut symbols = Vec::with_capacity(bytes.len() * CODON_LEN);
    for (offset, &byte) in bytes.iter().enumerate() {
        let codon = unpack_byte(byte).ok_or(CodecError::InvalidByte { offset, byte })?;
        symbols.extend_from_slice(&codon);
    }
    Ok(symbols)
}

/// Decode only the real bases as uppercase ASCII. `U` comes back as `T`.
pub fn decode_bases(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    Ok(unpack(bytes)?
        .into_iter()
        .filter_map(|symbol| match symbol {
            Symbol::Base(base) => Some(base.to_ascii()),
            Symbol::Marker | Symbol::Pad => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    const A: Symbol = Symbol::Base(Nucleotide::A);
    const C: Symbol = Symbol::Base(Nucleotide::C);
    const G: Symbol = Symbol::Base(Nucleotide::G);
    const T: Symbol = Symbol::Base(Nucleotide::T);
    const U: Symbol = Symbol::Base(Nucleotide::U);
    const M: Symbol = Symbol::Marker;
    const P: Symbol = Symbol::Pad;

    #[test]
    fn test_slot_table() {
        let expected = [
            (A, [64, 64, 64]),
            (C, [80, 68, 65]),
            (G, [96, 72, 66]),
            (T, [112, 76, 67]),
        ];
        for (symbol, per_slot) in expected {
            // Isolate each slot by filling the others with A (64 each).
            assert_eq!(pack_codon(&[symbol, A, A]), per_slot[0] + 128);
            assert_eq!(pack_codon(&[A, symbol, A]), per_slot[1] + 128);
            assert_eq!(pack_codon(&[A, A, symbol]), per_slot[2] + 128);
        }
    }

    #[test]
    fn test_pad_stops_the_codon() {
        assert_eq!(pack_codon(&[P, P, P]), 1);
        assert_eq!(pack_codon(&[T, P, P]), 113);
        assert_eq!(pack_codon(&[C, G, P]), 80 + 72 + 1);
        // Whatever follows a pad is never read.
        assert_eq!(pack_codon(&[P, T, T]), 1);
    }

    #[test]
    fn test_marker_contributes_zero() {
        assert_eq!(pack_codon(&[A, C, M]), 64 + 68);
        assert_eq!(pack_codon(&[G, M, P]), 96 + 1);
        assert_eq!(pack_codon(&[M, P, P]), 1);
    }

    #[test]
    fn test_u_packs_like_t() {
        assert_eq!(pack_codon(&[U, U, U]), pack_codon(&[T, T, T]));
        assert_eq!(pack_codon(&[A, U, P]), pack_codon(&[A, T, P]));
        assert_eq!(pack_codon(&[G, C, U]), pack_codon(&[G, C, T]));
    }

    #[test]
    fn test_single_record_bytes() {
        let stream = normalize(">seq1\nACGT\n").unwrap();
        assert_eq!(pack(&stream), vec![198, 113]);
    }

    #[test]
    fn test_output_length_is_codon_count() {
        let stream = normalize(">r1\nACGTA\n>r2\nGG\n").unwrap();
        assert_eq!(pack(&stream).len(), stream.len() / CODON_LEN);
    }

    #[test]
    fn test_unpack_recovers_codons() {
        for codon in [[A, C, G], [T, T, T], [G, A, P], [C, P, P], [P, P, P], [A, G, M]] {
            assert_eq!(unpack_byte(pack_codon(&codon)), Some(codon));
        }
        // Marker in slot 1 reads back as padding.
        assert_eq!(unpack_byte(pack_codon(&[C, M, P])), Some([C, P, P]));
    }

    #[test]
    fn test_unpack_rejects_impossible_bytes() {
        for byte in [0u8, 2, 63, 64, 66, 80, 130] {
            assert!(unpack_byte(byte).is_none(), "byte {byte} should be invalid");
        }
        assert!(matches!(
            unpack(&[198, 2]),
            Err(CodecError::InvalidByte { offset: 1, byte: 2 })
        ));
    }

    #[test]
    fn test_decode_bases_round_trip() {
        let stream = normalize(">x\nACGTTGCA\nGGA\n").unwrap();
        assert_eq!(decode_bases(&pack(&stream)).unwrap(), b"ACGTTGCAGGA");
    }

    #[test]
    fn test_decode_maps_u_to_t() {
        let stream = normalize(">x\nAUGU\n").unwrap();
        assert_eq!(decode_bases(&pack(&stream)).unwrap(), b"ATGT");
    }
}
