use clap::builder::PossibleValue;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spoken languages a transcript can be requested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LanguageSelection {
    #[default]
    English,
    Hindi,
    Marathi,
    Tamil,
    Kannada,
}

impl LanguageSelection {
    pub const ALL: [LanguageSelection; 5] = [
        LanguageSelection::English,
        LanguageSelection::Hindi,
        LanguageSelection::Marathi,
        LanguageSelection::Tamil,
        LanguageSelection::Kannada,
    ];

    /// Two-letter language code used by YouTube caption tracks
    pub fn code(&self) -> &'static str {
        match self {
            LanguageSelection::English => "en",
            LanguageSelection::Hindi => "hi",
            LanguageSelection::Marathi => "mr",
            LanguageSelection::Tamil => "ta",
            LanguageSelection::Kannada => "kn",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LanguageSelection::English => "English",
            LanguageSelection::Hindi => "Hindi",
            LanguageSelection::Marathi => "Marathi",
            LanguageSelection::Tamil => "Tamil",
            LanguageSelection::Kannada => "Kannada",
        }
    }

    /// Lowercase label accepted on the command line
    pub fn alias(&self) -> &'static str {
        match self {
            LanguageSelection::English => "english",
            LanguageSelection::Hindi => "hindi",
            LanguageSelection::Marathi => "marathi",
            LanguageSelection::Tamil => "tamil",
            LanguageSelection::Kannada => "kannada",
        }
    }

    /// Accepts either the code or the label, ignoring case
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim();
        Self::ALL.into_iter().find(|lang| {
            lang.code().eq_ignore_ascii_case(needle) || lang.label().eq_ignore_ascii_case(needle)
        })
    }
}

impl fmt::Display for LanguageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for LanguageSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let supported: Vec<&str> = Self::ALL.iter().map(|l| l.code()).collect();
            format!(
                "unsupported language '{}' (supported: {})",
                s,
                supported.join(", ")
            )
        })
    }
}

impl TryFrom<String> for LanguageSelection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LanguageSelection> for String {
    fn from(lang: LanguageSelection) -> Self {
        lang.code().to_string()
    }
}

impl ValueEnum for LanguageSelection {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(
            PossibleValue::new(self.code())
                .alias(self.alias())
                .help(self.label()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_two_letters() {
        for lang in LanguageSelection::ALL {
            assert_eq!(lang.code().len(), 2);
        }
    }

    #[test]
    fn test_parse_code_and_label() {
        assert_eq!(LanguageSelection::parse("hi"), Some(LanguageSelection::Hindi));
        assert_eq!(LanguageSelection::parse("Hindi"), Some(LanguageSelection::Hindi));
        assert_eq!(LanguageSelection::parse(" TAMIL "), Some(LanguageSelection::Tamil));
        assert_eq!(LanguageSelection::parse("fr"), None);
    }

    #[test]
    fn test_from_str_lists_supported_codes() {
        let err = "klingon".parse::<LanguageSelection>().unwrap_err();
        assert!(err.contains("en, hi, mr, ta, kn"));
    }

    #[test]
    fn test_value_enum_accepts_code_and_label() {
        for lang in LanguageSelection::ALL {
            assert_eq!(lang.alias(), lang.label().to_lowercase());
            assert_eq!(<LanguageSelection as ValueEnum>::from_str(lang.code(), false), Ok(lang));
            assert_eq!(<LanguageSelection as ValueEnum>::from_str(lang.label(), true), Ok(lang));
        }
    }

    #[test]
    fn test_serde_uses_code() {
        let yaml = serde_yaml::to_string(&LanguageSelection::Kannada).unwrap();
        assert_eq!(yaml.trim(), "kn");
        let parsed: LanguageSelection = serde_yaml::from_str("Marathi").unwrap();
        assert_eq!(parsed, LanguageSelection::Marathi);
    }
}
