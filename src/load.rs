//! Loading GFA files (or stdin) into a [`Gfa`].

use std::io::BufRead;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::gfa::Gfa;
use crate::optfields::OptFields;
use crate::parser::GfaParser;

/// Load a GFA file from disk with the default parser tolerance.
pub fn load_gfa<T: OptFields, P: AsRef<Path>>(path: P) -> Result<Gfa<T>> {
    let path = path.as_ref();
    let parser: GfaParser<T> = GfaParser::new();
    let gfa = parser.parse_file(path)?;
    info!(
        path = %path.display(),
        segments = gfa.segments.len(),
        links = gfa.links.len(),
        "loaded GFA"
    );
    Ok(gfa)
}

/// Load a GFA from any buffered reader, typically stdin.
pub fn load_gfa_reader<T: OptFields, R: BufRead>(reader: R) -> Result<Gfa<T>> {
    let parser: GfaParser<T> = GfaParser::new();
    let gfa = parser.parse_reader(reader)?;
    info!(
        segments = gfa.segments.len(),
        links = gfa.links.len(),
        "loaded GFA from reader"
    );
    Ok(gfa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optfields::OptionalFields;
    use std::io::Cursor;

    #[test]
    fn reader_and_file_loading_agree() {
        let text = b"H\tVN:Z:1.0\nS\t1\tACGT\nS\t2\tGGCC\nL\t1\t+\t2\t+\t2M\n";

        let from_reader: Gfa<OptionalFields> =
            load_gfa_reader(Cursor::new(&text[..])).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.gfa");
        std::fs::write(&path, text).unwrap();
        let from_file: Gfa<OptionalFields> = load_gfa(&path).unwrap();

        assert_eq!(from_reader, from_file);
        assert_eq!(from_file.segments.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result: Result<Gfa<()>> = load_gfa("/nonexistent/file.gfa");
        assert!(result.is_err());
    }
}
