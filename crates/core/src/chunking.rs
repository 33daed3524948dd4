use crate::error::IngestError;
use crate::models::Chunk;
use std::collections::VecDeque;

/// Budgets are measured in characters, not bytes. Separators are ordered
/// coarsest to finest and stay attached to the piece they terminate, so
/// every chunk is a verbatim slice of the source text.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            separators: ["\n\n", "\n", ".", ";", ","]
                .iter()
                .map(|separator| (*separator).to_string())
                .collect(),
        }
    }
}

impl ChunkingConfig {
    fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}

/// A contiguous byte span of the source text with its character length.
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

/// Splits normalized text into overlapping chunks along semantic boundaries.
///
/// The text is split recursively: the coarsest separator first, oversize
/// pieces again with the next separator, and at the raw character budget
/// once no separator applies. Atomic pieces are then merged back up to
/// `chunk_size`, keeping a tail of up to `chunk_overlap` characters as the
/// seed of the following chunk. Identical input always yields the identical
/// chunk sequence.
pub fn split_chunks(text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, IngestError> {
    config.validate()?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let separators: Vec<&str> = config
        .separators
        .iter()
        .map(String::as_str)
        .filter(|separator| !separator.is_empty())
        .collect();

    let mut pieces = Vec::new();
    split_recursive(text, 0, &separators, config.chunk_size, &mut pieces);

    Ok(merge_pieces(text, &pieces, config))
}

fn split_recursive(
    text: &str,
    base: usize,
    separators: &[&str],
    budget: usize,
    out: &mut Vec<Piece>,
) {
    let chars = text.chars().count();
    if chars <= budget {
        out.push(Piece {
            start: base,
            end: base + text.len(),
            chars,
        });
        return;
    }

    let Some(active) = separators
        .iter()
        .position(|separator| text.contains(separator))
    else {
        hard_split(text, base, budget, out);
        return;
    };

    let separator = separators[active];
    let finer = &separators[active + 1..];
    let mut piece_start = 0;

    for (position, _) in text.match_indices(separator) {
        let piece_end = position + separator.len();
        if piece_end <= piece_start {
            // Overlapping matches of the same separator.
            continue;
        }
        split_recursive(
            &text[piece_start..piece_end],
            base + piece_start,
            finer,
            budget,
            out,
        );
        piece_start = piece_end;
    }

    if piece_start < text.len() {
        split_recursive(&text[piece_start..], base + piece_start, finer, budget, out);
    }
}

/// Last resort for a piece with no usable boundary: cut every `budget`
/// characters at the raw character boundary.
fn hard_split(text: &str, base: usize, budget: usize, out: &mut Vec<Piece>) {
    let mut start = 0;
    let mut chars = 0;

    for (offset, _) in text.char_indices() {
        if chars == budget {
            out.push(Piece {
                start: base + start,
                end: base + offset,
                chars,
            });
            start = offset;
            chars = 0;
        }
        chars += 1;
    }

    if start < text.len() {
        out.push(Piece {
            start: base + start,
            end: base + text.len(),
            chars,
        });
    }
}

fn merge_pieces(text: &str, pieces: &[Piece], config: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut window: VecDeque<Piece> = VecDeque::new();
    let mut window_chars = 0usize;

    let emit = |window: &VecDeque<Piece>, chunks: &mut Vec<Chunk>| {
        let (Some(first), Some(last)) = (window.front(), window.back()) else {
            return;
        };
        chunks.push(Chunk {
            id: chunks.len(),
            text: text[first.start..last.end].to_string(),
            source_offset: first.start,
        });
    };

    for piece in pieces {
        if window_chars + piece.chars > config.chunk_size && !window.is_empty() {
            emit(&window, &mut chunks);

            // Slide back: keep a trailing run of at most `chunk_overlap`
            // characters as the seed of the next chunk.
            while !window.is_empty()
                && (window_chars > config.chunk_overlap
                    || window_chars + piece.chars > config.chunk_size)
            {
                if let Some(dropped) = window.pop_front() {
                    window_chars -= dropped.chars;
                }
            }
        }

        window.push_back(*piece);
        window_chars += piece.chars;
    }

    if !window.is_empty() {
        emit(&window, &mut chunks);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            ..ChunkingConfig::default()
        }
    }

    fn sample_text() -> String {
        let mut text = String::new();
        for paragraph in 0..8 {
            for sentence in 0..5 {
                text.push_str(&format!(
                    "Paragrafo {paragraph} frase {sentence} sobre o termo de securitizacao."
                ));
                text.push(' ');
            }
            text.push_str("\n\n");
        }
        text
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks = split_chunks("", &ChunkingConfig::default()).expect("config is valid");
        assert!(chunks.is_empty());
    }

    #[test]
    fn chunk_spans_cover_the_full_input() {
        let text = sample_text();
        let chunks = split_chunks(&text, &config(120, 30)).expect("config is valid");

        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].source_offset, 0);

        let mut covered_to = 0;
        for chunk in &chunks {
            assert!(chunk.source_offset <= covered_to, "gap before chunk {}", chunk.id);
            covered_to = covered_to.max(chunk.source_offset + chunk.text.len());
        }
        assert_eq!(covered_to, text.len());
    }

    #[test]
    fn every_chunk_respects_the_character_budget() {
        let text = sample_text();
        let chunks = split_chunks(&text, &config(120, 30)).expect("config is valid");
        for chunk in &chunks {
            assert!(
                chunk.text.chars().count() <= 120,
                "chunk {} has {} chars",
                chunk.id,
                chunk.text.chars().count()
            );
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = sample_text();
        let chunks = split_chunks(&text, &config(120, 40)).expect("config is valid");
        assert!(chunks.len() > 2);

        for pair in chunks.windows(2) {
            let previous_end = pair[0].source_offset + pair[0].text.len();
            assert!(
                pair[1].source_offset <= previous_end,
                "chunks {} and {} do not touch",
                pair[0].id,
                pair[1].id
            );
        }
    }

    #[test]
    fn chunk_text_is_a_verbatim_slice_of_the_source() {
        let text = sample_text();
        let chunks = split_chunks(&text, &config(100, 20)).expect("config is valid");
        for chunk in &chunks {
            assert_eq!(
                &text[chunk.source_offset..chunk.source_offset + chunk.text.len()],
                chunk.text
            );
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = sample_text();
        let first = split_chunks(&text, &ChunkingConfig::default()).expect("config is valid");
        let second = split_chunks(&text, &ChunkingConfig::default()).expect("config is valid");
        assert_eq!(first, second);
    }

    #[test]
    fn paragraph_boundary_is_preferred_over_mid_sentence_cut() {
        let text = "Primeiro paragrafo curto.\n\nSegundo paragrafo curto.";
        let chunks = split_chunks(text, &config(30, 5)).expect("config is valid");
        assert!(chunks
            .iter()
            .any(|chunk| chunk.text.starts_with("Segundo paragrafo")));
    }

    #[test]
    fn text_without_separators_is_hard_split() {
        let text = "a".repeat(95);
        let chunks = split_chunks(&text, &config(30, 5)).expect("config is valid");
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 30);
        }
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "ção é emissão à ".repeat(40);
        let chunks = split_chunks(&text, &config(50, 10)).expect("config is valid");
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 50);
        }
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let result = split_chunks("abc", &config(10, 10));
        assert!(matches!(result, Err(IngestError::InvalidChunkConfig(_))));
    }
}
