//! Document loading and text extraction.

use crate::types::Document;
use docqa_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    Markdown,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            Some("md") | Some("markdown") => Self::Markdown,
            Some("txt") | Some("text") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// Load one file as a [`Document`] named after its file name.
pub fn load_document(path: &Path) -> AppResult<Document> {
    let content_type = ContentType::from_path(path);
    tracing::debug!("Loading {:?} as {}", path, content_type.as_str());

    let text = match content_type {
        ContentType::Pdf => extract_pdf_text(path)?,
        ContentType::Markdown | ContentType::PlainText | ContentType::Unknown => {
            read_text(path)?
        }
    };

    Ok(Document::new(source_name(path), text))
}

/// Load every file under `paths`, descending into directories.
///
/// Files that fail to load are logged and skipped; successes keep input order.
pub fn load_documents(paths: &[PathBuf]) -> Vec<Document> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() {
                    push_loaded(&mut documents, entry.path());
                }
            }
        } else {
            push_loaded(&mut documents, path);
        }
    }

    tracing::info!("Loaded {} documents", documents.len());
    documents
}

fn push_loaded(documents: &mut Vec<Document>, path: &Path) {
    match load_document(path) {
        Ok(document) => documents.push(document),
        Err(e) => tracing::warn!("Skipping {:?}: {}", path, e),
    }
}

/// Extract the text of every page, joined by newlines.
fn extract_pdf_text(path: &Path) -> AppResult<String> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| AppError::Document(format!("Failed to load PDF {:?}: {}", path, e)))?;

    let pages = doc.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());

    // get_pages is keyed by page number, so iteration is already in page order
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => page_texts.push(text),
            Err(e) => {
                tracing::warn!("Failed to extract page {} of {:?}: {}", page_number, path, e);
            }
        }
    }

    Ok(page_texts.join("\n"))
}

fn read_text(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path)?;

    if !is_likely_text(&bytes) {
        return Err(AppError::Document(format!(
            "Binary file not supported: {:?}",
            path
        )));
    }

    String::from_utf8(bytes)
        .map_err(|_| AppError::Document(format!("File is not valid UTF-8: {:?}", path)))
}

/// Check if content is likely text (not binary).
fn is_likely_text(data: &[u8]) -> bool {
    !data.contains(&0)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(ContentType::from_path(Path::new("paper.PDF")), ContentType::Pdf);
        assert_eq!(ContentType::from_path(Path::new("notes.md")), ContentType::Markdown);
        assert_eq!(ContentType::from_path(Path::new("notes.txt")), ContentType::PlainText);
        assert_eq!(ContentType::from_path(Path::new("data.bin")), ContentType::Unknown);
    }

    #[test]
    fn test_load_text_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dynamo.txt");
        fs::write(&path, "DynamoDB is a key-value store.").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.source, "dynamo.txt");
        assert_eq!(doc.text, "DynamoDB is a key-value store.");
    }

    #[test]
    fn test_load_rejects_binary() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.dat");
        fs::write(&path, [0x89u8, b'P', b'N', b'G', 0, 0, 1]).unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, AppError::Document(_)));
    }

    #[test]
    fn test_load_invalid_pdf() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.pdf");
        fs::write(&path, "not a pdf").unwrap();

        assert!(matches!(load_document(&path), Err(AppError::Document(_))));
    }

    #[test]
    fn test_load_documents_skips_failures() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("a.md");
        let bad = temp.path().join("missing.txt");
        fs::write(&good, "# Title\nBody").unwrap();

        let docs = load_documents(&[good, bad]);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "a.md");
        // markdown is kept verbatim
        assert_eq!(docs[0].text, "# Title\nBody");
    }

    #[test]
    fn test_load_documents_walks_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("b.txt"), "second").unwrap();
        fs::write(temp.path().join("nested").join("c.txt"), "third").unwrap();
        fs::write(temp.path().join("a.txt"), "first").unwrap();

        let docs = load_documents(&[temp.path().to_path_buf()]);
        let sources: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "b.txt", "c.txt"]);
    }
}
