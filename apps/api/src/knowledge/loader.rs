use std::path::Path;

use anyhow::{bail, Context, Result};

/// A loaded source document, before splitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    /// Detects the kind from a file name's extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" | "txt" => Some(DocumentKind::Text),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

pub fn load_document(path: &Path) -> Result<Document> {
    let name = path.display().to_string();
    let bytes = std::fs::read(path).with_context(|| format!("No document at {name}"))?;
    load_document_bytes(&name, &bytes)
}

/// Loads an uploaded or already-read document. Markdown and plain text must
/// be UTF-8; PDFs go through `pdf-extract`.
pub fn load_document_bytes(name: &str, bytes: &[u8]) -> Result<Document> {
    let kind = DocumentKind::from_name(name).with_context(|| {
        format!("Unsupported document type for '{name}' (expected .md, .txt or .pdf)")
    })?;

    let text = match kind {
        DocumentKind::Text => std::str::from_utf8(bytes)
            .with_context(|| format!("'{name}' is not valid UTF-8"))?
            .to_string(),
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to extract text from '{name}': {e}"))?,
    };

    if text.trim().is_empty() {
        bail!("'{name}' contains no text");
    }

    Ok(Document {
        source: name.to_string(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(DocumentKind::from_name("notes.MD"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_name("guide.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_name("image.png"), None);
        assert_eq!(DocumentKind::from_name("README"), None);
    }

    #[test]
    fn test_load_markdown_file() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        writeln!(file, "# Depression\n\nIt is common and treatable.").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert!(doc.text.contains("common and treatable"));
        assert!(doc.source.ends_with(".md"));
    }

    #[test]
    fn test_rejects_unknown_extension_and_empty_text() {
        assert!(load_document_bytes("data.csv", b"a,b").is_err());
        assert!(load_document_bytes("empty.md", b"  \n ").is_err());
        assert!(load_document_bytes("bad.txt", &[0xff, 0xfe, 0xfd]).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_document(Path::new("/nonexistent/depression.md")).is_err());
    }
}
