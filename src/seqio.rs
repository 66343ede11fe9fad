//! Readers and writers for sequence files. Inputs ending in `.gz` are
//! inflated on the fly.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;

    if is_gzip(path) {
        let decoder = MultiGzDecoder::new(file);
        Ok(Box::new(BufReader::with_capacity(2 << 20, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(2 << 20, file)))
    }
}

/// Read a whole (possibly gzipped) file into memory.
pub fn read_all(path: &Path) -> io::Result<Vec<u8>> {
    let mut reader = open_reader(path)?;
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

pub fn create_writer(path: &Path) -> io::Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::with_capacity(4 << 20, file))
}

/// Write `bytes` to `path` in one go and flush.
pub fn write_all(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_all(bytes)?;
    writer.flush()
}
