//! Centralized validation and helper functions.

/// Maximum number of records allowed in a single genome file
pub const MAX_CONTIGS: usize = 10_000;

/// Maximum number of alleles allowed in a loaded catalog
pub const MAX_ALLELES: usize = 1_000_000;

/// Unambiguous nucleotide symbols
pub const NUCLEOTIDES: &[u8] = b"ACGT";

/// IUPAC ambiguity codes (accepted, but flagged)
pub const AMBIGUITY_CODES: &[u8] = b"RYSWKMBDHVN";

/// Outcome of checking a sequence against the nucleotide alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlphabetReport {
    /// Number of IUPAC ambiguity symbols found
    pub ambiguous: usize,
}

/// Check that a sequence only uses the recognized nucleotide alphabet.
///
/// Case-insensitive. `U` is treated as `T`. Returns the first offending
/// `(position, byte)` on failure.
///
/// # Examples
///
/// ```
/// use amr_predict::utils::validation::check_alphabet;
///
/// assert_eq!(check_alphabet(b"ACGTN").unwrap().ambiguous, 1);
/// assert!(check_alphabet(b"ACGT*").is_err());
/// ```
///
/// # Errors
///
/// Returns the zero-based offset and value of the first byte outside the
/// nucleotide alphabet.
pub fn check_alphabet(sequence: &[u8]) -> Result<AlphabetReport, (usize, u8)> {
    let mut report = AlphabetReport::default();
    for (i, &b) in sequence.iter().enumerate() {
        let upper = b.to_ascii_uppercase();
        if NUCLEOTIDES.contains(&upper) || upper == b'U' {
            continue;
        }
        if AMBIGUITY_CODES.contains(&upper) {
            report.ambiguous += 1;
            continue;
        }
        return Err((i, b));
    }
    Ok(report)
}

/// Uppercase a sequence and fold RNA `U` to `T`.
#[must_use]
pub fn normalize_sequence(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .map(|b| match b.to_ascii_uppercase() {
            b'U' => b'T',
            other => other,
        })
        .collect()
}

/// Compute the MD5 checksum of a normalized sequence (lowercase hex).
#[must_use]
pub fn sequence_md5(sequence: &[u8]) -> String {
    format!("{:x}", md5::compute(sequence))
}

/// Check if adding another record would exceed `limit`.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_record_limit(count: usize, limit: usize) -> Option<String> {
    if count >= limit {
        Some(format!(
            "Too many records: adding another would exceed maximum of {limit}"
        ))
    } else {
        None
    }
}

/// Validate that a fraction lies in `[0, 1]`.
#[must_use]
pub fn is_valid_fraction(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_alphabet_accepts_lowercase_and_rna() {
        let report = check_alphabet(b"acgtuACGTU").unwrap();
        assert_eq!(report.ambiguous, 0);
    }

    #[test]
    fn test_check_alphabet_counts_ambiguity_codes() {
        let report = check_alphabet(b"ACNNRYT").unwrap();
        assert_eq!(report.ambiguous, 4);
    }

    #[test]
    fn test_check_alphabet_rejects_invalid_bytes() {
        assert_eq!(check_alphabet(b"ACG-T"), Err((3, b'-')));
        assert_eq!(check_alphabet(b"AC GT"), Err((2, b' ')));
        assert_eq!(check_alphabet(b"X"), Err((0, b'X')));
    }

    #[test]
    fn test_normalize_sequence() {
        assert_eq!(normalize_sequence(b"acgu"), b"ACGT".to_vec());
    }

    #[test]
    fn test_sequence_md5() {
        // "ACGT" -> f1f8f4bf413b16ad135722aa4591043e
        assert_eq!(sequence_md5(b"ACGT"), "f1f8f4bf413b16ad135722aa4591043e");
    }

    #[test]
    fn test_check_record_limit() {
        assert!(check_record_limit(0, 2).is_none());
        assert!(check_record_limit(1, 2).is_none());
        assert!(check_record_limit(2, 2).is_some());
    }

    #[test]
    fn test_is_valid_fraction() {
        assert!(is_valid_fraction(0.0));
        assert!(is_valid_fraction(1.0));
        assert!(!is_valid_fraction(1.01));
        assert!(!is_valid_fraction(-0.1));
        assert!(!is_valid_fraction(f64::NAN));
    }
}
