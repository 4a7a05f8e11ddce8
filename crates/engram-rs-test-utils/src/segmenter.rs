use engram_rs_memory::{MemoryError, PartOfSpeech, Segmentation, Segmenter, Sentence, Token};

/// Segmenter splitting on whitespace and tagging every token as a noun.
///
/// A sentence ends after any token ending in `.`, `!` or `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> Result<Segmentation, MemoryError> {
        let mut sentences = Vec::new();
        let mut tokens: Vec<Token> = Vec::new();
        for word in text.split_whitespace() {
            tokens.push(Token::new(word, PartOfSpeech::Noun));
            if word.ends_with(['.', '!', '?']) {
                sentences.push(close_sentence(std::mem::take(&mut tokens)));
            }
        }
        if !tokens.is_empty() {
            sentences.push(close_sentence(tokens));
        }
        Ok(Segmentation { sentences })
    }
}

fn close_sentence(tokens: Vec<Token>) -> Sentence {
    let text = tokens
        .iter()
        .map(|token| token.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Sentence { text, tokens }
}

/// Segmenter that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSegmenter;

impl Segmenter for FailingSegmenter {
    fn segment(&self, _text: &str) -> Result<Segmentation, MemoryError> {
        Err(MemoryError::Segmenter("model unavailable".to_string()))
    }
}
