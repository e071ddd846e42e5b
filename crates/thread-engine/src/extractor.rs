//! Lexical feature extraction from post text.
//!
//! Pure functions, no side effects. Keywords come from the lowercased text;
//! entities come from a capitalization scan of the original-case text.

/// Maximum keywords retained per post, first-occurrence order.
pub const MAX_KEYWORDS: usize = 10;

/// Maximum entities retained per post, first-occurrence order.
pub const MAX_ENTITIES: usize = 5;

/// Keyword and entity fingerprint of a piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFeatures {
    /// Lowercased keywords, deduplicated, first-occurrence order
    pub keywords: Vec<String>,
    /// Capitalized-token entities, original case, deduplicated
    pub entities: Vec<String>,
}

/// Extract keywords and entities from raw text.
///
/// Total and deterministic; empty or very short input yields empty vectors.
pub fn extract_features(text: &str) -> ExtractedFeatures {
    ExtractedFeatures {
        keywords: extract_keywords(text),
        entities: extract_entities(text),
    }
}

/// Extract up to [`MAX_KEYWORDS`] keywords.
///
/// Tokenizes on non-alphanumeric characters, lowercases, discards tokens of
/// length <= 3 and stop words, deduplicates preserving first occurrence.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 3)
        .filter(|t| !is_stop_word(t))
    {
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
            if keywords.len() == MAX_KEYWORDS {
                break;
            }
        }
    }
    keywords
}

/// Extract up to [`MAX_ENTITIES`] entities from the original-case text.
///
/// An entity is a maximal run of consecutive capitalized words, joined with
/// single spaces ("New York City"). A word counts as capitalized when its
/// first character is an ASCII uppercase letter, so all-caps tickers like
/// "NVDA" qualify. Trailing punctuation ends a run, keeping sentence
/// boundaries from gluing unrelated names together.
pub fn extract_entities(text: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let cleaned = word.trim_matches(|c: char| !c.is_alphanumeric());
        if !cleaned.is_empty() && cleaned.starts_with(|c: char| c.is_ascii_uppercase()) {
            run.push(cleaned);
            if word.ends_with(|c: char| !c.is_alphanumeric()) {
                flush_run(&mut run, &mut entities);
            }
        } else {
            flush_run(&mut run, &mut entities);
        }
    }
    flush_run(&mut run, &mut entities);

    entities.truncate(MAX_ENTITIES);
    entities
}

fn flush_run(run: &mut Vec<&str>, entities: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let entity = run.join(" ");
    if !entities.iter().any(|e| e == &entity) {
        entities.push(entity);
    }
    run.clear();
}

/// Check if a word is on the fixed stop-word list.
fn is_stop_word(word: &str) -> bool {
    const STOP_WORDS: &[&str] = &[
        "that", "this", "with", "from", "they", "have", "been", "said", "says", "will", "would",
        "could", "should",
    ];
    STOP_WORDS.contains(&word)
}
