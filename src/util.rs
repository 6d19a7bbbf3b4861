/// Reverse complement a DNA sequence.
///
/// Case is preserved; any base that is not one of `ACGTacgt` (or `N`/`n`)
/// complements to `N`.
pub fn reverse_complement(dna: &[u8]) -> Vec<u8> {
    let mut revcomp: Vec<u8> = dna.iter().map(|b| switch_base(*b)).collect();
    revcomp.reverse();
    revcomp
}

#[inline]
fn switch_base(c: u8) -> u8 {
    match c {
        b'A' => b'T',
        b'a' => b't',
        b'C' => b'G',
        b'c' => b'g',
        b'T' => b'A',
        b't' => b'a',
        b'G' => b'C',
        b'g' => b'c',
        b'N' => b'N',
        b'n' => b'n',
        _ => b'N',
    }
}

/// The fraction of G/C bases in a sequence. Zero for an empty sequence.
pub fn gc_content(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq
        .iter()
        .filter(|b| matches!(**b, b'G' | b'g' | b'C' | b'c'))
        .count();
    gc as f64 / seq.len() as f64
}

/// Format a base count in kilobases for log lines and the stats table.
pub fn format_kb(len: usize) -> String {
    format!("{:.2}kb", len as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revcomp() {
        assert_eq!(reverse_complement(b"AACG"), b"CGTT".to_vec());
        assert_eq!(reverse_complement(b"acgt"), b"acgt".to_vec());
        assert_eq!(reverse_complement(b"AXC"), b"GNT".to_vec());
    }

    #[test]
    fn gc() {
        assert_eq!(gc_content(b"GGCC"), 1.0);
        assert_eq!(gc_content(b"AATT"), 0.0);
        assert_eq!(gc_content(b"ACGT"), 0.5);
        assert_eq!(gc_content(b""), 0.0);
    }

    #[test]
    fn kb_format() {
        assert_eq!(format_kb(1500), "1.50kb");
    }
}
