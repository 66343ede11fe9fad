//! Genome preprocessing: header stripping and 3:1 sequence packing.

pub mod codec;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod pack;
pub mod pipeline;
pub mod seqio;
pub mod strip;
pub mod symbol;

pub use codec::{Codec, TripletCodec};
pub use error::{CodecError, PipelineError};
pub use normalize::{is_marker_line, normalize, Normalizer};
pub use pack::{decode_bases, pack, pack_codon, unpack};
pub use pipeline::{process_file, run, Config, RunReport};
pub use strip::{strip_headers, StripStats};
pub use symbol::{Nucleotide, Symbol, SymbolStream};
