use std::io::{self, BufRead, Write};

use crate::normalize::is_marker_line;

/// Line counts from one [`strip_headers`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripStats {
    pub kept: u64,
    pub dropped: u64,
}

/// Copy every non-marker line from `reader` to `writer` byte for byte,
/// including its separator.
pub fn strip_headers<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<StripStats> {
    let mut stats = StripStats::default();
    let mut line = Vec::with_capacity(256);
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if is_marker_line(&line) {
            stats.dropped += 1;
        } else {
            writer.write_all(&line)?;
            stats.kept += 1;
        }
    }
    writer.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(input: &str) -> (String, StripStats) {
        let mut out = Vec::new();
        let stats = strip_headers(input.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_drops_headers_only() {
        let (out, stats) = strip(">chr1\nACGT\nGG\n>chr2\nTT\n");
        assert_eq!(out, "ACGT\nGG\nTT\n");
        assert_eq!(stats, StripStats { kept: 3, dropped: 2 });
    }

    #[test]
    fn test_separators_preserved() {
        let (out, _) = strip(">h\r\nAC \r\n\nGT");
        assert_eq!(out, "AC \r\n\nGT");
    }

    #[test]
    fn test_empty_input() {
        let (out, stats) = strip("");
        assert!(out.is_empty());
        assert_eq!(stats, StripStats::default());
    }
}
