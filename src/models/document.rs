use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::enums::DocumentFormat;

/// One corpus entry. Lives only for the duration of its extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name, used as `paper_name` on every record extracted from it.
    pub id: String,
    pub path: PathBuf,
    pub format: DocumentFormat,
}

impl Document {
    /// Build a document from a path, or `None` if the extension is unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension)?;
        let id = path.file_name()?.to_string_lossy().into_owned();

        Some(Self {
            id,
            path: path.to_path_buf(),
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_file_name() {
        let doc = Document::from_path(Path::new("/corpus/smith2021.pdf")).unwrap();
        assert_eq!(doc.id, "smith2021.pdf");
        assert_eq!(doc.format, DocumentFormat::Pdf);
    }

    #[test]
    fn uppercase_extension_accepted() {
        let doc = Document::from_path(Path::new("notes/README.TXT")).unwrap();
        assert_eq!(doc.format, DocumentFormat::PlainText);
    }

    #[test]
    fn unsupported_extension_rejected() {
        assert!(Document::from_path(Path::new("paper.docx")).is_none());
        assert!(Document::from_path(Path::new("no_extension")).is_none());
    }
}
