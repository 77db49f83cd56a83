use serde::{Deserialize, Serialize};

/// Relationship between the donor and the recipient of a gift.
///
/// The category decides which exemption ceiling applies. Codes follow the
/// identifiers used by the gift form (`adultChild`, `sonInLawDaughterInLaw`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relationship {
    AdultChild,
    MinorChild,
    Spouse,
    #[serde(rename = "sonInLawDaughterInLaw", alias = "sonInLawOrDaughterInLaw")]
    SonInLawOrDaughterInLaw,
    Other,
}

impl Relationship {
    pub const ALL: [Relationship; 5] = [
        Self::AdultChild,
        Self::MinorChild,
        Self::Spouse,
        Self::SonInLawOrDaughterInLaw,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdultChild => "adultChild",
            Self::MinorChild => "minorChild",
            Self::Spouse => "spouse",
            Self::SonInLawOrDaughterInLaw => "sonInLawDaughterInLaw",
            Self::Other => "other",
        }
    }

    /// Parses a form code. Unknown codes yield `None`, which the engine
    /// treats as a category with no exemption.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "adultChild" => Some(Self::AdultChild),
            "minorChild" => Some(Self::MinorChild),
            "spouse" => Some(Self::Spouse),
            "sonInLawDaughterInLaw" | "sonInLawOrDaughterInLaw" => {
                Some(Self::SonInLawOrDaughterInLaw)
            }
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Korean display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AdultChild => "성년 자녀",
            Self::MinorChild => "미성년 자녀",
            Self::Spouse => "배우자",
            Self::SonInLawOrDaughterInLaw => "사위/며느리",
            Self::Other => "타인",
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_code() {
        for relationship in Relationship::ALL {
            assert_eq!(Relationship::parse(relationship.as_str()), Some(relationship));
        }
    }

    #[test]
    fn parse_accepts_long_in_law_alias() {
        assert_eq!(
            Relationship::parse("sonInLawOrDaughterInLaw"),
            Some(Relationship::SonInLawOrDaughterInLaw)
        );
    }

    #[test]
    fn parse_rejects_unknown_code() {
        assert_eq!(Relationship::parse("cousin"), None);
        assert_eq!(Relationship::parse(""), None);
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(Relationship::parse("  spouse "), Some(Relationship::Spouse));
    }
}
