use crate::error::IngestError;
use std::fs;
use std::path::Path;

/// External collaborator that turns a document path into raw text.
pub trait DocumentReader {
    fn read(&self, path: &Path) -> Result<String, IngestError>;
}

/// Reads a PDF with lopdf and joins the per-page text in page order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn read(&self, path: &Path) -> Result<String, IngestError> {
        // Surface missing/unreadable files as read errors rather than a
        // parse error from lopdf.
        fs::metadata(path).map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let document = lopdf::Document::load(path)
            .map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_number, _) in document.get_pages() {
            let text = document
                .extract_text(&[page_number])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;
            if !text.trim().is_empty() {
                pages.push(text);
            }
        }

        if pages.is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(pages.join("\n"))
    }
}

/// Reads the file as UTF-8 text. Used for plain-text inputs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextReader;

impl DocumentReader for PlainTextReader {
    fn read(&self, path: &Path) -> Result<String, IngestError> {
        fs::read_to_string(path).map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })
    }
}
