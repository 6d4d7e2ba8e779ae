use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// DataError – failures of the aggregation layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("unknown personality type '{0}'")]
    UnknownType(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("count must be at least 1, got {0}")]
    InvalidCount(usize),
}

// ---------------------------------------------------------------------------
// TypeKey – the 16 MBTI categories
// ---------------------------------------------------------------------------

/// One of the 16 personality types.
///
/// The declaration order is the column order of the source CSV and is the
/// tie-break order wherever types are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKey {
    Infj,
    Isfj,
    Intp,
    Isfp,
    Entp,
    Infp,
    Entj,
    Istp,
    Intj,
    Esfp,
    Estj,
    Enfp,
    Estp,
    Istj,
    Enfj,
    Esfj,
}

impl TypeKey {
    pub const COUNT: usize = 16;

    pub const ALL: [TypeKey; TypeKey::COUNT] = [
        TypeKey::Infj,
        TypeKey::Isfj,
        TypeKey::Intp,
        TypeKey::Isfp,
        TypeKey::Entp,
        TypeKey::Infp,
        TypeKey::Entj,
        TypeKey::Istp,
        TypeKey::Intj,
        TypeKey::Esfp,
        TypeKey::Estj,
        TypeKey::Enfp,
        TypeKey::Estp,
        TypeKey::Istj,
        TypeKey::Enfj,
        TypeKey::Esfj,
    ];

    /// Column label, e.g. `"INFJ"`.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKey::Infj => "INFJ",
            TypeKey::Isfj => "ISFJ",
            TypeKey::Intp => "INTP",
            TypeKey::Isfp => "ISFP",
            TypeKey::Entp => "ENTP",
            TypeKey::Infp => "INFP",
            TypeKey::Entj => "ENTJ",
            TypeKey::Istp => "ISTP",
            TypeKey::Intj => "INTJ",
            TypeKey::Esfp => "ESFP",
            TypeKey::Estj => "ESTJ",
            TypeKey::Enfp => "ENFP",
            TypeKey::Estp => "ESTP",
            TypeKey::Istj => "ISTJ",
            TypeKey::Enfj => "ENFJ",
            TypeKey::Esfj => "ESFJ",
        }
    }

    /// Position in [`TypeKey::ALL`], used to index [`CountryRecord::values`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn has_letter(self, letter: char) -> bool {
        self.as_str().contains(letter.to_ascii_uppercase())
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeKey {
    type Err = DataError;

    /// Only the exact column labels are recognised.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DataError::UnknownType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Dichotomy – the four letter axes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dichotomy {
    /// Extraversion / Introversion
    EnergyFocus,
    /// Sensing / Intuition
    Perception,
    /// Thinking / Feeling
    Judgement,
    /// Judging / Perceiving
    Lifestyle,
}

impl Dichotomy {
    pub const ALL: [Dichotomy; 4] = [
        Dichotomy::EnergyFocus,
        Dichotomy::Perception,
        Dichotomy::Judgement,
        Dichotomy::Lifestyle,
    ];

    /// The two letters of the axis, in MBTI notation order.
    pub fn poles(self) -> (char, char) {
        match self {
            Dichotomy::EnergyFocus => ('E', 'I'),
            Dichotomy::Perception => ('S', 'N'),
            Dichotomy::Judgement => ('T', 'F'),
            Dichotomy::Lifestyle => ('J', 'P'),
        }
    }
}

// ---------------------------------------------------------------------------
// CountryRecord – one row of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub country: String,
    /// Fractions in [0, 1], indexed by [`TypeKey::index`].
    /// They are not required to sum to 1.
    pub values: [f64; TypeKey::COUNT],
}

impl CountryRecord {
    pub fn new(country: impl Into<String>, values: [f64; TypeKey::COUNT]) -> Self {
        Self {
            country: country.into(),
            values,
        }
    }

    pub fn value(&self, key: TypeKey) -> f64 {
        self.values[key.index()]
    }

    /// Value as a percentage (×100).
    pub fn percent(&self, key: TypeKey) -> f64 {
        self.value(key) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Country rows in file order. Never mutated after loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<CountryRecord>,
    /// Where the rows came from (file name), shown in the status bar.
    pub source: String,
}

impl Dataset {
    pub fn new(records: Vec<CountryRecord>, source: impl Into<String>) -> Self {
        Self {
            records,
            source: source.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row of the first record named `country`. Names are not unique.
    pub fn position(&self, country: &str) -> Option<usize> {
        self.records.iter().position(|r| r.country == country)
    }
}
