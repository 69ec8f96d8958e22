//! Locales

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Localized strings keyed by locale, e.g. command name translations.
pub type Dictionary = HashMap<Locale, String>;

macro_rules! locales {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// A client locale. Unrecognized codes are preserved in [`Locale::Other`].
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum Locale {
            $(
                #[doc = $code]
                $variant,
            )+
            /// Any code not in the table above.
            Other(String),
        }

        impl Locale {
            /// Locale code as sent on the wire.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Other(code) => code,
                }
            }
        }

        impl From<&str> for Locale {
            fn from(code: &str) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }
    };
}

locales! {
    EnglishUs => "en-US",
    EnglishGb => "en-GB",
    Bulgarian => "bg",
    ChineseCn => "zh-CN",
    ChineseTw => "zh-TW",
    Croatian => "hr",
    Czech => "cs",
    Danish => "da",
    Dutch => "nl",
    Finnish => "fi",
    French => "fr",
    German => "de",
    Greek => "el",
    Hindi => "hi",
    Hungarian => "hu",
    Italian => "it",
    Japanese => "ja",
    Korean => "ko",
    Lithuanian => "lt",
    Norwegian => "no",
    Polish => "pl",
    PortugueseBr => "pt-BR",
    Romanian => "ro",
    Russian => "ru",
    SpanishEs => "es-ES",
    Swedish => "sv-SE",
    Thai => "th",
    Turkish => "tr",
    Ukrainian => "uk",
    Vietnamese => "vi",
}

impl From<String> for Locale {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        match locale {
            Locale::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
