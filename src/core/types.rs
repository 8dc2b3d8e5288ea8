use serde::{Deserialize, Serialize};

/// Unique identifier for an allele in the catalog
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlleleId(pub String);

impl AlleleId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlleleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strand of the query contig an alignment was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub const BOTH: [Strand; 2] = [Strand::Forward, Strand::Reverse];
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

/// Antimicrobial class a determinant confers resistance to.
///
/// This is the fixed taxonomy catalog metadata is validated against. It
/// follows the NDARO drug classes, plus disinfectants and a multidrug class
/// for efflux determinants without a single target class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResistanceClass {
    Aminoglycoside,
    BetaLactam,
    Colistin,
    Fosfomycin,
    FusidicAcid,
    Glycopeptide,
    Lincosamide,
    Macrolide,
    Nitroimidazole,
    Nucleoside,
    Oxazolidinone,
    Phenicol,
    Pleuromutilin,
    PseudomonicAcid,
    Quinolone,
    Rifampicin,
    Streptogramin,
    Sulphonamide,
    Tetracycline,
    Trimethoprim,
    Disinfectant,
    Multidrug,
}

impl ResistanceClass {
    pub const ALL: [ResistanceClass; 22] = [
        Self::Aminoglycoside,
        Self::BetaLactam,
        Self::Colistin,
        Self::Fosfomycin,
        Self::FusidicAcid,
        Self::Glycopeptide,
        Self::Lincosamide,
        Self::Macrolide,
        Self::Nitroimidazole,
        Self::Nucleoside,
        Self::Oxazolidinone,
        Self::Phenicol,
        Self::Pleuromutilin,
        Self::PseudomonicAcid,
        Self::Quinolone,
        Self::Rifampicin,
        Self::Streptogramin,
        Self::Sulphonamide,
        Self::Tetracycline,
        Self::Trimethoprim,
        Self::Disinfectant,
        Self::Multidrug,
    ];

    /// Parse a single class label as written in curated metadata files.
    ///
    /// Matching is case-insensitive, ignores a trailing "resistance" and
    /// accepts the usual spelling variants and drug names. Returns `None` for
    /// labels outside the taxonomy. Compound labels ("X and Y") are split by
    /// [`ResistanceClass::parse_list`].
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let lowered = label.trim().to_lowercase();
        let key = lowered
            .strip_suffix("resistance")
            .unwrap_or(&lowered)
            .trim()
            .replace(['_', ' '], "-");

        let class = match key.as_str() {
            "aminoglycoside" | "aminoglycosides" => Self::Aminoglycoside,
            "beta-lactam" | "betalactam" | "beta-lactams" | "b-lactam" | "cephalosporin"
            | "carbapenem" | "penam" => Self::BetaLactam,
            "colistin" | "polymyxin" => Self::Colistin,
            "fosfomycin" => Self::Fosfomycin,
            "fusidic-acid" | "fusidicacid" => Self::FusidicAcid,
            "glycopeptide" | "glycopeptides" | "vancomycin" => Self::Glycopeptide,
            "lincosamide" | "lincosamides" => Self::Lincosamide,
            "macrolide" | "macrolides" => Self::Macrolide,
            "nitroimidazole" => Self::Nitroimidazole,
            "nucleoside" => Self::Nucleoside,
            "oxazolidinone" => Self::Oxazolidinone,
            "phenicol" | "phenicols" | "amphenicol" | "chloramphenicol" => Self::Phenicol,
            "pleuromutilin" | "pleuromutilins" => Self::Pleuromutilin,
            "pseudomonic-acid" | "mupirocin" => Self::PseudomonicAcid,
            "quinolone" | "quinolones" | "fluoroquinolone" | "fluoroquinolones" => Self::Quinolone,
            "rifampicin" | "rifamycin" | "rifampin" => Self::Rifampicin,
            "streptogramin" | "streptogramins" | "streptogramin-a" | "streptogramin-b" => {
                Self::Streptogramin
            }
            "sulphonamide" | "sulfonamide" | "sulphonamides" | "sulfonamides" => Self::Sulphonamide,
            "tetracycline" | "tetracyclines" => Self::Tetracycline,
            "trimethoprim" => Self::Trimethoprim,
            "disinfectant" | "biocide" => Self::Disinfectant,
            "multidrug" | "multi-drug" | "efflux" => Self::Multidrug,
            _ => return None,
        };
        Some(class)
    }

    /// Parse a class list such as "Macrolide, Lincosamide and Streptogramin B
    /// resistance" into one class per label.
    ///
    /// Labels are separated by commas or the word "and". "MLS" expands to its
    /// three classes. On failure the offending label is returned as written.
    pub fn parse_list(field: &str) -> Result<Vec<Self>, String> {
        let mut classes = Vec::new();
        for label in split_labels(field) {
            if label.eq_ignore_ascii_case("mls") || label.eq_ignore_ascii_case("mls resistance") {
                classes.extend([Self::Macrolide, Self::Lincosamide, Self::Streptogramin]);
                continue;
            }
            classes.push(Self::parse(label).ok_or_else(|| label.to_string())?);
        }
        Ok(classes)
    }
}

/// Non-empty labels of a class list, split on commas and on the word "and"
fn split_labels(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').flat_map(|part| {
        let mut labels = Vec::new();
        let mut rest = part;
        // ASCII lowercasing keeps byte offsets aligned with `rest`
        while let Some(idx) = rest.to_ascii_lowercase().find(" and ") {
            labels.push(&rest[..idx]);
            rest = &rest[idx + " and ".len()..];
        }
        labels.push(rest);
        labels
            .into_iter()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    })
}

impl std::fmt::Display for ResistanceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Aminoglycoside => "aminoglycoside",
            Self::BetaLactam => "beta-lactam",
            Self::Colistin => "colistin",
            Self::Fosfomycin => "fosfomycin",
            Self::FusidicAcid => "fusidic acid",
            Self::Glycopeptide => "glycopeptide",
            Self::Lincosamide => "lincosamide",
            Self::Macrolide => "macrolide",
            Self::Nitroimidazole => "nitroimidazole",
            Self::Nucleoside => "nucleoside",
            Self::Oxazolidinone => "oxazolidinone",
            Self::Phenicol => "phenicol",
            Self::Pleuromutilin => "pleuromutilin",
            Self::PseudomonicAcid => "pseudomonic acid",
            Self::Quinolone => "quinolone",
            Self::Rifampicin => "rifampicin",
            Self::Streptogramin => "streptogramin",
            Self::Sulphonamide => "sulphonamide",
            Self::Tetracycline => "tetracycline",
            Self::Trimethoprim => "trimethoprim",
            Self::Disinfectant => "disinfectant",
            Self::Multidrug => "multidrug",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resistance_class_variants() {
        assert_eq!(
            ResistanceClass::parse("Beta-lactam resistance"),
            Some(ResistanceClass::BetaLactam)
        );
        assert_eq!(
            ResistanceClass::parse("sulfonamide"),
            Some(ResistanceClass::Sulphonamide)
        );
        assert_eq!(
            ResistanceClass::parse(" Fluoroquinolone "),
            Some(ResistanceClass::Quinolone)
        );
        assert_eq!(
            ResistanceClass::parse("fusidic acid"),
            Some(ResistanceClass::FusidicAcid)
        );
        assert_eq!(
            ResistanceClass::parse("Lincosamide resistance"),
            Some(ResistanceClass::Lincosamide)
        );
        assert_eq!(
            ResistanceClass::parse("Streptogramin B"),
            Some(ResistanceClass::Streptogramin)
        );
        assert_eq!(ResistanceClass::parse("unobtainium"), None);
    }

    #[test]
    fn test_parse_compound_class_list() {
        assert_eq!(
            ResistanceClass::parse_list("Fluoroquinolone and aminoglycoside resistance"),
            Ok(vec![ResistanceClass::Quinolone, ResistanceClass::Aminoglycoside])
        );
        assert_eq!(
            ResistanceClass::parse_list("Macrolide, Lincosamide AND Streptogramin B resistance"),
            Ok(vec![
                ResistanceClass::Macrolide,
                ResistanceClass::Lincosamide,
                ResistanceClass::Streptogramin
            ])
        );
        assert_eq!(
            ResistanceClass::parse_list("MLS resistance"),
            Ok(vec![
                ResistanceClass::Macrolide,
                ResistanceClass::Lincosamide,
                ResistanceClass::Streptogramin
            ])
        );
        // "and" inside a word is not a separator
        assert_eq!(
            ResistanceClass::parse_list("Sandalwood resistance"),
            Err("Sandalwood resistance".to_string())
        );
        assert_eq!(ResistanceClass::parse_list(" , "), Ok(Vec::new()));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for class in ResistanceClass::ALL {
            assert_eq!(ResistanceClass::parse(&class.to_string()), Some(class));
        }
    }

    #[test]
    fn test_allele_id_ordering_is_lexicographic() {
        let mut ids = vec![AlleleId::new("tetA_2"), AlleleId::new("blaTEM_1"), AlleleId::new("tetA_10")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "blaTEM_1");
        assert_eq!(ids[1].as_str(), "tetA_10");
        assert_eq!(ids[2].as_str(), "tetA_2");
    }
}
