//! Sentence segmentation and part-of-speech tagging.
//!
//! The chunker only needs sentence boundaries, token surface text and a coarse
//! tag per token. [`RuleSegmenter`] provides this with Unicode text
//! segmentation plus a lexicon-and-suffix tagger; heavier NLP backends plug in
//! through the [`Segmenter`] trait.

use crate::error::MemoryError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Coarse part-of-speech tags using the universal tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    #[serde(rename = "NOUN")]
    Noun,
    #[serde(rename = "PROPN")]
    ProperNoun,
    #[serde(rename = "VERB")]
    Verb,
    #[serde(rename = "ADJ")]
    Adjective,
    #[serde(rename = "ADV")]
    Adverb,
    #[serde(rename = "PRON")]
    Pronoun,
    #[serde(rename = "DET")]
    Determiner,
    #[serde(rename = "ADP")]
    Adposition,
    #[serde(rename = "CCONJ")]
    Conjunction,
    #[serde(rename = "AUX")]
    Auxiliary,
    #[serde(rename = "NUM")]
    Numeral,
    #[serde(rename = "PUNCT")]
    Punctuation,
    #[serde(rename = "X")]
    Other,
}

impl PartOfSpeech {
    /// Whether tokens with this tag count as chunk-scoring keywords.
    pub fn is_keyword(self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun | Self::Verb)
    }
}

/// A single token with its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text.
    pub text: String,
    /// Part-of-speech tag.
    pub pos: PartOfSpeech,
}

impl Token {
    /// Create a token.
    pub fn new(text: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

/// One sentence and its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Sentence text with surrounding whitespace trimmed.
    pub text: String,
    /// Tokens in document order.
    pub tokens: Vec<Token>,
}

/// Segmenter output for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    /// Sentences in document order.
    pub sentences: Vec<Sentence>,
}

impl Segmentation {
    /// Iterate over every token of the document.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences
            .iter()
            .flat_map(|sentence| sentence.tokens.iter())
    }

    /// Total number of tokens in the document.
    pub fn token_count(&self) -> usize {
        self.sentences
            .iter()
            .map(|sentence| sentence.tokens.len())
            .sum()
    }
}

/// Splits text into sentences and tagged tokens.
pub trait Segmenter: Send + Sync {
    /// Segment a document.
    fn segment(&self, text: &str) -> Result<Segmentation, MemoryError>;
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "all", "both", "either", "neither", "another", "such", "what", "which", "whose",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we", "us",
    "our", "ours", "ourselves", "they", "them", "their", "theirs", "themselves", "who", "whom",
    "someone", "something", "anyone", "anything", "everyone", "everything", "nobody", "nothing",
];

const ADPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from", "up", "down", "over",
    "under", "around", "among", "without", "within", "across", "behind", "beyond", "near",
    "toward", "towards", "upon", "via", "per", "since", "until", "than",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "while", "if",
    "unless", "whereas", "whether", "once",
];

const AUXILIARIES: &[&str] = &[
    "is", "am", "are", "was", "were", "be", "been", "being", "do", "does", "did", "have", "has",
    "had", "having", "will", "would", "shall", "should", "can", "could", "may", "might", "must",
    "ought", "'s", "'re", "'ve", "'ll", "'d", "'m", "n't", "not",
];

const ADVERBS: &[&str] = &[
    "very", "too", "also", "just", "only", "even", "still", "already", "often", "never",
    "always", "sometimes", "soon", "now", "then", "here", "there", "when", "where", "why", "how",
    "again", "ever", "quite", "rather", "almost", "perhaps", "well", "together", "away", "back",
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "new", "old", "big", "small", "large", "little", "long", "short", "high",
    "low", "great", "first", "last", "next", "other", "same", "different", "important", "early",
    "late", "young", "many", "much", "few", "more", "most", "less", "own", "sure", "true",
    "false", "real", "best", "better", "worse", "worst", "whole", "free", "full", "clear",
];

const VERBS: &[&str] = &[
    "go", "goes", "went", "gone", "get", "gets", "got", "make", "makes", "made", "take", "takes",
    "took", "taken", "see", "sees", "saw", "seen", "come", "comes", "came", "know", "knows",
    "knew", "known", "think", "thinks", "thought", "say", "says", "said", "give", "gives",
    "gave", "given", "find", "finds", "found", "tell", "tells", "told", "become", "becomes",
    "became", "leave", "leaves", "left", "feel", "feels", "felt", "bring", "brings", "brought",
    "begin", "begins", "began", "keep", "keeps", "kept", "hold", "holds", "held", "write",
    "writes", "wrote", "written", "stand", "stands", "stood", "hear", "hears", "heard", "let",
    "lets", "mean", "means", "meant", "set", "sets", "meet", "meets", "met", "run", "runs", "ran",
    "pay", "pays", "paid", "sit", "sits", "sat", "speak", "speaks", "spoke", "lie", "lies", "lay",
    "lead", "leads", "led", "read", "reads", "grow", "grows", "grew", "lose", "loses", "lost",
    "fall", "falls", "fell", "send", "sends", "sent", "build", "builds", "built", "understand",
    "understands", "understood", "draw", "draws", "drew", "break", "breaks", "broke", "spend",
    "spends", "spent", "cut", "cuts", "rise", "rises", "rose", "drive", "drives", "drove", "buy",
    "buys", "bought", "wear", "wears", "wore", "choose", "chooses", "chose", "use", "uses",
    "want", "wants", "need", "needs", "help", "helps", "like", "likes", "store", "stores",
    "remember", "remembers", "eat", "eats", "ate", "sleep", "sleeps", "slept",
];

/// Lowercased word lists backing the rule-based tagger.
#[derive(Debug, Clone)]
struct Lexicon {
    closed: HashMap<String, PartOfSpeech>,
}

impl Lexicon {
    /// Build the built-in lexicon.
    fn builtin() -> Self {
        let mut closed = HashMap::new();
        // Later lists win for words that appear in more than one.
        for (words, pos) in [
            (VERBS, PartOfSpeech::Verb),
            (ADJECTIVES, PartOfSpeech::Adjective),
            (ADVERBS, PartOfSpeech::Adverb),
            (ADPOSITIONS, PartOfSpeech::Adposition),
            (CONJUNCTIONS, PartOfSpeech::Conjunction),
            (PRONOUNS, PartOfSpeech::Pronoun),
            (DETERMINERS, PartOfSpeech::Determiner),
            (AUXILIARIES, PartOfSpeech::Auxiliary),
        ] {
            for word in words {
                closed.insert((*word).to_string(), pos);
            }
        }
        Self { closed }
    }

    fn lookup(&self, lowered: &str) -> Option<PartOfSpeech> {
        self.closed.get(lowered).copied()
    }
}

/// Rule-based segmenter built on Unicode sentence and word boundaries.
#[derive(Debug, Clone)]
pub struct RuleSegmenter {
    lexicon: Lexicon,
}

impl RuleSegmenter {
    /// Load the built-in lexicon.
    ///
    /// Construction is the one-time initialization step; segmenting never
    /// loads anything lazily.
    pub fn load() -> Self {
        let lexicon = Lexicon::builtin();
        info!(
            "loaded rule segmenter (lexicon_entries={})",
            lexicon.closed.len()
        );
        Self { lexicon }
    }

    /// Load the built-in lexicon extended with a JSON `{ "word": "TAG" }` file.
    ///
    /// Entries from the file take precedence over built-in ones.
    pub fn load_with_lexicon(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            MemoryError::Segmenter(format!("failed to read lexicon {}: {err}", path.display()))
        })?;
        let overrides: HashMap<String, PartOfSpeech> = serde_json::from_str(&contents)
            .map_err(|err| {
                MemoryError::Segmenter(format!("invalid lexicon {}: {err}", path.display()))
            })?;
        let mut segmenter = Self::load();
        for (word, pos) in overrides {
            segmenter.lexicon.closed.insert(word.to_lowercase(), pos);
        }
        info!(
            "extended segmenter lexicon (path={}, lexicon_entries={})",
            path.display(),
            segmenter.lexicon.closed.len()
        );
        Ok(segmenter)
    }

    /// Tag one word given whether it opens its sentence.
    fn tag(&self, word: &str, sentence_initial: bool) -> PartOfSpeech {
        if !word.chars().any(char::is_alphanumeric) {
            return PartOfSpeech::Punctuation;
        }
        if is_numeral(word) {
            return PartOfSpeech::Numeral;
        }
        let lowered = word.to_lowercase();
        if let Some(pos) = self.lexicon.lookup(&lowered) {
            return pos;
        }
        let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
        let acronym = word.chars().count() > 1 && word.chars().all(|c| !c.is_lowercase());
        if acronym || (starts_upper && !sentence_initial) {
            return PartOfSpeech::ProperNoun;
        }
        suffix_tag(&lowered)
    }
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self::load()
    }
}

impl Segmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Result<Segmentation, MemoryError> {
        let mut sentences = Vec::new();
        for raw in text.split_sentence_bounds() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut tokens = Vec::new();
            for word in trimmed.split_word_bounds() {
                if word.trim().is_empty() {
                    continue;
                }
                let sentence_initial = !tokens
                    .iter()
                    .any(|token: &Token| token.pos != PartOfSpeech::Punctuation);
                tokens.push(Token::new(word, self.tag(word, sentence_initial)));
            }
            sentences.push(Sentence {
                text: trimmed.to_string(),
                tokens,
            });
        }
        let segmentation = Segmentation { sentences };
        debug!(
            "segmented text (chars={}, sentences={}, tokens={})",
            text.chars().count(),
            segmentation.sentences.len(),
            segmentation.token_count()
        );
        Ok(segmentation)
    }
}

/// Whether a word is a number such as `42`, `3.14` or `1,000`.
fn is_numeral(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '%'))
}

/// Fallback tag for open-class words based on common English suffixes.
fn suffix_tag(lowered: &str) -> PartOfSpeech {
    let len = lowered.chars().count();
    if len > 4 && lowered.ends_with("ly") {
        return PartOfSpeech::Adverb;
    }
    if len > 4 && (lowered.ends_with("ing") || lowered.ends_with("ed")) {
        return PartOfSpeech::Verb;
    }
    if len > 4 && ["ize", "ise", "ify"].iter().any(|s| lowered.ends_with(s)) {
        return PartOfSpeech::Verb;
    }
    if len > 4
        && ["ous", "ful", "ive", "able", "ible", "less", "ical"]
            .iter()
            .any(|s| lowered.ends_with(s))
    {
        return PartOfSpeech::Adjective;
    }
    PartOfSpeech::Noun
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn tags(segmenter: &RuleSegmenter, text: &str) -> Vec<(String, PartOfSpeech)> {
        segmenter
            .segment(text)
            .expect("segment")
            .tokens()
            .map(|token| (token.text.clone(), token.pos))
            .collect()
    }

    #[test]
    fn splits_sentences_and_trims_whitespace() {
        let segmenter = RuleSegmenter::load();
        let segmentation = segmenter
            .segment("The cat sat. The dog ran!  Where is Alice?")
            .expect("segment");
        let texts: Vec<&str> = segmentation
            .sentences
            .iter()
            .map(|sentence| sentence.text.as_str())
            .collect();
        assert_eq!(texts, vec!["The cat sat.", "The dog ran!", "Where is Alice?"]);
        assert_eq!(segmentation.sentences[0].tokens.len(), 4);
        assert_eq!(segmentation.token_count(), 12);
    }

    #[test]
    fn empty_text_has_no_sentences() {
        let segmenter = RuleSegmenter::load();
        assert_eq!(segmenter.segment("").expect("segment"), Segmentation::default());
        assert_eq!(
            segmenter.segment("  \n\t ").expect("segment"),
            Segmentation::default()
        );
    }

    #[test]
    fn tags_open_and_closed_class_words() {
        let segmenter = RuleSegmenter::load();
        let tagged = tags(&segmenter, "The engineer quickly deployed Kubernetes to 3 servers.");
        assert_eq!(
            tagged,
            vec![
                ("The".to_string(), PartOfSpeech::Determiner),
                ("engineer".to_string(), PartOfSpeech::Noun),
                ("quickly".to_string(), PartOfSpeech::Adverb),
                ("deployed".to_string(), PartOfSpeech::Verb),
                ("Kubernetes".to_string(), PartOfSpeech::ProperNoun),
                ("to".to_string(), PartOfSpeech::Adposition),
                ("3".to_string(), PartOfSpeech::Numeral),
                ("servers".to_string(), PartOfSpeech::Noun),
                (".".to_string(), PartOfSpeech::Punctuation),
            ]
        );
    }

    #[test]
    fn acronyms_are_proper_nouns_even_sentence_initially() {
        let segmenter = RuleSegmenter::load();
        let tagged = tags(&segmenter, "NASA launched rockets.");
        assert_eq!(tagged[0].1, PartOfSpeech::ProperNoun);
        assert_eq!(tagged[1].1, PartOfSpeech::Verb);
    }

    #[test]
    fn lexicon_file_overrides_builtin_tags() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{ "the": "NOUN", "zorp": "VERB" }}"#).expect("write");
        let segmenter = RuleSegmenter::load_with_lexicon(file.path()).expect("load");
        let tagged = tags(&segmenter, "Cats zorp the mice.");
        assert_eq!(tagged[1].1, PartOfSpeech::Verb);
        assert_eq!(tagged[2].1, PartOfSpeech::Noun);
    }

    #[test]
    fn invalid_lexicon_is_a_segmenter_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{ "the": "NOT_A_TAG" }}"#).expect("write");
        let err = RuleSegmenter::load_with_lexicon(file.path()).unwrap_err();
        assert!(matches!(err, MemoryError::Segmenter(_)));
    }

    #[test]
    fn keyword_tags() {
        assert!(PartOfSpeech::Noun.is_keyword());
        assert!(PartOfSpeech::ProperNoun.is_keyword());
        assert!(PartOfSpeech::Verb.is_keyword());
        assert!(!PartOfSpeech::Adjective.is_keyword());
        assert!(!PartOfSpeech::Punctuation.is_keyword());
    }
}
