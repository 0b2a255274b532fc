// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises one message body before vectorisation.
//
// Steps (applied in order):
//   1. Lowercase
//   2. Tokenise: words are runs of alphanumeric characters,
//      every other non-space character is its own token, and
//      "n't" / "'s"-style clitics are split off the word
//   3. Keep only tokens made entirely of alphanumerics
//   4. Drop stop-words and punctuation
//   5. Lemmatise each remaining token
//   6. Drop tokens whose lemma is itself a stop-word
//   7. Join with single spaces
//
// Step 6 keeps the transform idempotent: running it again on
// its own output returns the same string.
//
// Missing or empty text simply yields the empty string.
// A bad cell never aborts the whole partition.

use crate::data::lexicon::{is_punctuation, is_stop_word, lemmatize};

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Run the full normalisation pipeline over one text value
    pub fn transform(&self, text: &str) -> String {
        let lowered = text.to_lowercase();

        tokenize(&lowered)
            .into_iter()
            .filter(|t| t.chars().all(char::is_alphanumeric))
            .filter(|t| !is_stop_word(t) && !is_punctuation(t))
            .map(|t| lemmatize(&t))
            .filter(|t| !is_stop_word(t))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Split lowercase text into word, clitic and punctuation tokens.
///
///   "don't stop!" → ["do", "n't", "stop", "!"]
///   "it's £5"     → ["it", "'s", "£", "5"]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for chunk in text.split_whitespace() {
        let chars: Vec<char> = chunk.chars().collect();
        let mut i = 0usize;

        while i < chars.len() {
            let c = chars[i];

            if c.is_alphanumeric() {
                let start = i;
                while i < chars.len() && chars[i].is_alphanumeric() {
                    i += 1;
                }
                let mut word: String = chars[start..i].iter().collect();

                // "can't" → "ca" + "n't", the way treebank tokenisers split it
                let negation = word.chars().count() > 1
                    && word.ends_with('n')
                    && chars.get(i) == Some(&'\'')
                    && chars.get(i + 1) == Some(&'t')
                    && chars.get(i + 2).map_or(true, |c| !c.is_alphanumeric());
                if negation {
                    word.pop();
                    tokens.push(word);
                    tokens.push("n't".to_string());
                    i += 2;
                } else {
                    tokens.push(word);
                }
            } else if c == '\''
                && i > 0
                && chars[i - 1].is_alphanumeric()
                && chars.get(i + 1).is_some_and(|c| c.is_alphanumeric())
            {
                // clitic: 's 're 'll 've 'd 'm
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_alphanumeric() {
                    i += 1;
                }
                tokens.push(chars[start..i].iter().collect());
            } else {
                tokens.push(c.to_string());
                i += 1;
            }
        }
    }

    tokens
}
