use crate::error::CodecError;
use crate::normalize::normalize;
use crate::pack::{decode_bases, pack};

/// A reversible transform between sequence text and packed bytes.
pub trait Codec {
    fn encode(&self, text: &[u8]) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Normalize then pack three symbols per byte.
///
/// Decoding returns only the bases; record boundaries and padding are dropped
/// and `U` becomes `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TripletCodec;

impl Codec for TripletCodec {
    fn encode(&self, text: &[u8]) -> Result<Vec<u8>, CodecError> {
        let stream = normalize(text)?;
        Ok(pack(&stream))
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        decode_bases(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_multi_line() {
        let codec = TripletCodec;
        let text = b">NC_000001.1 test\nACGTACGTAC\nGTTTGA\nC\n";
        let encoded = codec.encode(text).unwrap();
        assert_eq!(encoded.len(), 6);
        assert_eq!(codec.decode(&encoded).unwrap(), b"ACGTACGTACGTTTGAC");
    }

    #[test]
    fn test_encode_propagates_invalid_symbol() {
        assert!(TripletCodec.encode(b">x\nACXT\n").is_err());
    }
}
