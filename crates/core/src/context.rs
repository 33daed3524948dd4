use crate::models::Chunk;
use std::collections::HashSet;

/// Builds the bounded context string handed to the generation backend: a
/// labeled head excerpt of the document followed by the labeled fused
/// retrieval results.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    pub head_chars: usize,
    pub head_label: String,
    pub retrieved_label: String,
}

impl ContextAssembler {
    pub fn new(head_chars: usize, head_label: String, retrieved_label: String) -> Self {
        Self {
            head_chars,
            head_label,
            retrieved_label,
        }
    }

    /// `chunks` must already be in fused order. Duplicate chunk ids are
    /// skipped so an overlap between the two retrievers never repeats text.
    pub fn assemble(&self, document_text: &str, chunks: &[&Chunk]) -> String {
        let head = head_excerpt(document_text, self.head_chars);

        let mut seen: HashSet<usize> = HashSet::new();
        let retrieved = chunks
            .iter()
            .filter(|chunk| seen.insert(chunk.id))
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "{}\n{}\n\n{}\n{}",
            self.head_label, head, self.retrieved_label, retrieved
        )
    }
}

/// First `budget` characters of the text, verbatim, cut on a char boundary.
fn head_excerpt(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
