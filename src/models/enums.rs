use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {field} value: {value}")]
pub struct UnknownVariant {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Values double as the file extensions accepted in a corpus.
str_enum!(DocumentFormat {
    Pdf => "pdf",
    PlainText => "txt",
});

impl DocumentFormat {
    /// Detect the format from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.to_ascii_lowercase().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_roundtrip() {
        for format in [DocumentFormat::Pdf, DocumentFormat::PlainText] {
            let parsed: DocumentFormat = format.as_str().parse().unwrap();
            assert_eq!(parsed, format);
        }
    }

    #[test]
    fn extension_detection_ignores_case() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("txt"), Some(DocumentFormat::PlainText));
        assert_eq!(DocumentFormat::from_extension("docx"), None);
    }

    #[test]
    fn unknown_value_names_the_enum() {
        let err = "epub".parse::<DocumentFormat>().unwrap_err();
        assert_eq!(err.field, "DocumentFormat");
        assert_eq!(err.value, "epub");
    }
}
