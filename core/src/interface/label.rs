use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Diagnosis categories reported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Label {
    #[serde(rename = "CNV")]
    Cnv,
    #[serde(rename = "DME")]
    Dme,
    #[serde(rename = "Drusen")]
    Drusen,
    #[serde(rename = "Normal")]
    Normal,
}

impl Label {
    /// Every label in declaration order. Synthesis walks the non-dominant
    /// labels in this order.
    pub const ALL: [Label; 4] = [Label::Cnv, Label::Dme, Label::Drusen, Label::Normal];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Cnv => "CNV",
            Label::Dme => "DME",
            Label::Drusen => "Drusen",
            Label::Normal => "Normal",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Label::Cnv => 0,
            Label::Dme => 1,
            Label::Drusen => 2,
            Label::Normal => 3,
        }
    }

    /// Maps the number embedded in a file name to a label.
    pub fn from_code(code: u64) -> Label {
        match code {
            1..=10 => Label::Drusen,
            11..=20 => Label::Cnv,
            21..=30 => Label::Dme,
            _ => Label::Normal,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Accepts any casing, like [`FromStr`]; backends disagree on it.
impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_expected_ranges() {
        for n in 1..=10 {
            assert_eq!(Label::from_code(n), Label::Drusen);
        }
        for n in 11..=20 {
            assert_eq!(Label::from_code(n), Label::Cnv);
        }
        for n in 21..=30 {
            assert_eq!(Label::from_code(n), Label::Dme);
        }
        assert_eq!(Label::from_code(0), Label::Normal);
        assert_eq!(Label::from_code(31), Label::Normal);
        assert_eq!(Label::from_code(u64::MAX), Label::Normal);
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!("DRUSEN".parse::<Label>().unwrap(), Label::Drusen);
        assert_eq!("cnv".parse::<Label>().unwrap(), Label::Cnv);
        assert!("AMD".parse::<Label>().is_err());
    }

    #[test]
    fn serializes_as_display_strings() {
        let json = serde_json::to_string(&Label::ALL).unwrap();
        assert_eq!(json, r#"["CNV","DME","Drusen","Normal"]"#);
        let back: Label = serde_json::from_str("\"NORMAL\"").unwrap();
        assert_eq!(back, Label::Normal);
        let mixed: Vec<Label> = serde_json::from_str(r#"["Dme","cNv","dRUSEN"]"#).unwrap();
        assert_eq!(mixed, vec![Label::Dme, Label::Cnv, Label::Drusen]);
        assert!(serde_json::from_str::<Label>("\"AMD\"").is_err());
    }
}
