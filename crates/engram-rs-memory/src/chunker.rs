//! Sentence-aligned chunking with keyword-density ranking.
//!
//! Sentences are packed greedily into chunks of at most `max_chunk_tokens`
//! segmenter tokens. A sentence is never split: one that alone exceeds the cap
//! becomes its own chunk. Each chunk is scored by how often the document's
//! keywords (nouns, proper nouns and verbs, repetitions included) occur among
//! its tokens, and chunks are returned best first with ties in document order.

use crate::error::MemoryError;
use crate::segmenter::{Segmentation, Segmenter, Sentence};
use log::debug;
use std::collections::HashMap;

/// A scored run of sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Sentence texts joined by single spaces.
    pub text: String,
    /// Keyword-density score.
    pub score: usize,
    /// Zero-based position of the chunk in the document.
    pub position: usize,
    /// Number of segmenter tokens in the chunk.
    pub token_count: usize,
}

/// Segment `content` and return its chunk texts, highest-scoring first.
///
/// Empty or whitespace-only content yields no chunks without calling the
/// segmenter. Segmenter failures propagate.
pub fn chunk_content(
    segmenter: &dyn Segmenter,
    content: &str,
    max_chunk_tokens: usize,
) -> Result<Vec<String>, MemoryError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let segmentation = segmenter.segment(content)?;
    Ok(chunk_document(&segmentation, max_chunk_tokens)
        .into_iter()
        .map(|chunk| chunk.text)
        .collect())
}

/// Chunk an already segmented document, highest-scoring first.
pub fn chunk_document(segmentation: &Segmentation, max_chunk_tokens: usize) -> Vec<Chunk> {
    let keywords = keyword_counts(segmentation);
    let mut chunks = Vec::new();
    let mut current: Vec<&Sentence> = Vec::new();
    let mut current_tokens = 0usize;

    for sentence in &segmentation.sentences {
        let sentence_tokens = sentence.tokens.len();
        if !current.is_empty() && current_tokens + sentence_tokens > max_chunk_tokens {
            chunks.push(close_chunk(&current, chunks.len(), &keywords));
            current.clear();
            current_tokens = 0;
        }
        current.push(sentence);
        current_tokens += sentence_tokens;
    }
    if !current.is_empty() {
        chunks.push(close_chunk(&current, chunks.len(), &keywords));
    }

    // Stable: equal scores keep document order.
    chunks.sort_by(|a, b| b.score.cmp(&a.score));
    debug!(
        "chunked document (sentences={}, chunks={}, max_chunk_tokens={})",
        segmentation.sentences.len(),
        chunks.len(),
        max_chunk_tokens
    );
    chunks
}

/// Extract the keyword list: every noun, proper noun and verb token, in order.
pub fn extract_keywords(segmentation: &Segmentation) -> Vec<&str> {
    segmentation
        .tokens()
        .filter(|token| token.pos.is_keyword())
        .map(|token| token.text.as_str())
        .collect()
}

/// Score chunk tokens against a keyword list.
///
/// Every keyword entry contributes the number of times its surface text occurs
/// among the chunk tokens, so both keyword repetition in the document and
/// token repetition in the chunk raise the score.
pub fn score_chunk<'a>(
    chunk_tokens: impl IntoIterator<Item = &'a str>,
    keywords: &[&str],
) -> usize {
    let mut keyword_counts: HashMap<&str, usize> = HashMap::new();
    for keyword in keywords {
        *keyword_counts.entry(*keyword).or_default() += 1;
    }
    score_tokens(chunk_tokens, &keyword_counts)
}

/// Keyword multiplicities for a whole document.
fn keyword_counts(segmentation: &Segmentation) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for keyword in extract_keywords(segmentation) {
        *counts.entry(keyword).or_default() += 1;
    }
    counts
}

/// Sum of keyword multiplicity times occurrence for each chunk token.
fn score_tokens<'a>(
    chunk_tokens: impl IntoIterator<Item = &'a str>,
    keyword_counts: &HashMap<&str, usize>,
) -> usize {
    chunk_tokens
        .into_iter()
        .map(|token| keyword_counts.get(token).copied().unwrap_or(0))
        .sum()
}

fn close_chunk(
    sentences: &[&Sentence],
    position: usize,
    keywords: &HashMap<&str, usize>,
) -> Chunk {
    let tokens = sentences
        .iter()
        .flat_map(|sentence| sentence.tokens.iter())
        .map(|token| token.text.as_str());
    let score = score_tokens(tokens, keywords);
    let text = sentences
        .iter()
        .map(|sentence| sentence.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Chunk {
        text,
        score,
        position,
        token_count: sentences.iter().map(|sentence| sentence.tokens.len()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::PartOfSpeech::{Determiner as Det, Noun, Punctuation as Punct, Verb};
    use crate::segmenter::{PartOfSpeech, RuleSegmenter, Token};
    use pretty_assertions::assert_eq;

    fn sentence(tokens: &[(&str, PartOfSpeech)]) -> Sentence {
        Sentence {
            text: tokens
                .iter()
                .map(|(text, _)| *text)
                .collect::<Vec<_>>()
                .join(" "),
            tokens: tokens
                .iter()
                .map(|(text, pos)| Token::new(*text, *pos))
                .collect(),
        }
    }

    fn document(sentences: Vec<Sentence>) -> Segmentation {
        Segmentation { sentences }
    }

    struct PanickingSegmenter;

    impl Segmenter for PanickingSegmenter {
        fn segment(&self, _text: &str) -> Result<Segmentation, MemoryError> {
            panic!("segmenter must not be called");
        }
    }

    struct FailingSegmenter;

    impl Segmenter for FailingSegmenter {
        fn segment(&self, _text: &str) -> Result<Segmentation, MemoryError> {
            Err(MemoryError::Segmenter("model unavailable".to_string()))
        }
    }

    #[test]
    fn empty_content_skips_segmenter() {
        let chunks = chunk_content(&PanickingSegmenter, "", 10).expect("chunk");
        assert!(chunks.is_empty());
        let chunks = chunk_content(&PanickingSegmenter, " \n ", 10).expect("chunk");
        assert!(chunks.is_empty());
    }

    #[test]
    fn segmenter_failure_propagates() {
        let err = chunk_content(&FailingSegmenter, "Some text.", 10).unwrap_err();
        assert!(matches!(err, MemoryError::Segmenter(_)));
    }

    #[test]
    fn short_content_is_a_single_chunk() {
        let segmenter = RuleSegmenter::load();
        let chunks = chunk_content(&segmenter, "The cat sat. The dog ran.", 100).expect("chunk");
        assert_eq!(chunks, vec!["The cat sat. The dog ran.".to_string()]);
    }

    #[test]
    fn ranks_keyword_dense_chunks_first() {
        let segmenter = RuleSegmenter::load();
        let chunks = chunk_content(
            &segmenter,
            "Rust is fast. Rust compiles code. Cats sleep.",
            4,
        )
        .expect("chunk");
        assert_eq!(
            chunks,
            vec![
                "Rust compiles code.".to_string(),
                "Rust is fast.".to_string(),
                "Cats sleep.".to_string(),
            ]
        );
    }

    #[test]
    fn oversized_sentence_becomes_its_own_chunk() {
        let doc = document(vec![
            sentence(&[("a", Det), ("b", Noun), (".", Punct)]),
            sentence(&[
                ("c", Noun),
                ("d", Noun),
                ("e", Noun),
                ("f", Noun),
                ("g", Noun),
                (".", Punct),
            ]),
            sentence(&[("h", Det), (".", Punct)]),
        ]);
        let mut chunks = chunk_document(&doc, 4);
        chunks.sort_by_key(|chunk| chunk.position);
        let sizes: Vec<usize> = chunks.iter().map(|chunk| chunk.token_count).collect();
        assert_eq!(sizes, vec![3, 6, 2]);
    }

    #[test]
    fn chunks_respect_cap_and_cover_every_sentence_once() {
        let sentences: Vec<Sentence> = (0..12)
            .map(|idx| {
                let words: Vec<String> = (0..(idx % 5 + 1)).map(|w| format!("w{idx}_{w}")).collect();
                let mut tokens: Vec<(&str, PartOfSpeech)> =
                    words.iter().map(|word| (word.as_str(), Noun)).collect();
                tokens.push((".", Punct));
                sentence(&tokens)
            })
            .collect();
        let doc = document(sentences.clone());

        for max in [1usize, 2, 3, 5, 8, 13, 100] {
            let mut chunks = chunk_document(&doc, max);
            chunks.sort_by_key(|chunk| chunk.position);
            for chunk in &chunks {
                let single_sentence = sentences.iter().any(|s| s.text == chunk.text);
                assert!(
                    chunk.token_count <= max || single_sentence,
                    "chunk over cap (max={max}, tokens={})",
                    chunk.token_count
                );
            }
            let rebuilt = chunks
                .iter()
                .map(|chunk| chunk.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let original = sentences
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            assert_eq!(rebuilt, original, "coverage failed for max={max}");
        }
    }

    #[test]
    fn zero_cap_puts_each_sentence_in_its_own_chunk() {
        let doc = document(vec![
            sentence(&[("a", Noun), (".", Punct)]),
            sentence(&[("b", Noun), (".", Punct)]),
        ]);
        assert_eq!(chunk_document(&doc, 0).len(), 2);
    }

    #[test]
    fn repeated_keywords_score_higher() {
        let keywords = ["alpha"];
        let dense = score_chunk(["alpha", "alpha", "alpha", "alpha", "alpha"], &keywords);
        let sparse = score_chunk(["alpha", "beta", "beta", "beta", "beta"], &keywords);
        assert_eq!(dense, 5);
        assert_eq!(sparse, 1);
        assert!(dense > sparse);
    }

    #[test]
    fn keyword_list_repetition_multiplies_score() {
        assert_eq!(score_chunk(["alpha", "alpha"], &["alpha", "alpha", "beta"]), 4);
        assert_eq!(score_chunk(["Alpha"], &["alpha"]), 0);
    }

    #[test]
    fn keywords_keep_duplicates_in_document_order() {
        let doc = document(vec![sentence(&[
            ("the", Det),
            ("dog", Noun),
            ("chased", Verb),
            ("the", Det),
            ("dog", Noun),
        ])]);
        assert_eq!(extract_keywords(&doc), vec!["dog", "chased", "dog"]);
    }

    #[test]
    fn no_keyword_matches_fall_back_to_document_order() {
        let doc = document(vec![
            sentence(&[("a", Det), (".", Punct)]),
            sentence(&[("the", Det), (".", Punct)]),
            sentence(&[("an", Det), (".", Punct)]),
        ]);
        let chunks = chunk_document(&doc, 2);
        let positions: Vec<usize> = chunks.iter().map(|chunk| chunk.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!(chunks.iter().all(|chunk| chunk.score == 0));
    }
}
