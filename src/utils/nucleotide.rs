//! Nucleotide sequence helpers: complements and codon translation.

/// Complement a single IUPAC nucleotide symbol (uppercase in, uppercase out).
#[must_use]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        // S, W and N are their own complements
        other => other,
    }
}

/// Reverse complement of an uppercase nucleotide sequence.
#[must_use]
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}

/// Whether two symbols count as identical in an alignment.
///
/// Ambiguity codes never match, so `N` runs cannot inflate identity.
#[inline]
#[must_use]
pub fn is_identity(a: u8, b: u8) -> bool {
    a == b && matches!(a, b'A' | b'C' | b'G' | b'T')
}

/// Translate a codon using the standard genetic code.
///
/// Returns `'*'` for stop codons and `'X'` when the codon contains anything
/// other than `ACGT` or is not three bases long.
#[must_use]
pub fn translate_codon(codon: &[u8]) -> char {
    fn index(base: u8) -> Option<usize> {
        match base {
            b'T' => Some(0),
            b'C' => Some(1),
            b'A' => Some(2),
            b'G' => Some(3),
            _ => None,
        }
    }

    // TCAG ordering, first base slowest
    const TABLE: &[u8; 64] =
        b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

    if codon.len() != 3 {
        return 'X';
    }
    match (index(codon[0]), index(codon[1]), index(codon[2])) {
        (Some(a), Some(b), Some(c)) => char::from(TABLE[a * 16 + b * 4 + c]),
        _ => 'X',
    }
}
