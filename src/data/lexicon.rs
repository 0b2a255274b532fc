// ============================================================
// Layer 4 — English Lexicon (stop-words + lemmatizer)
// ============================================================
// Static word lists used by the text preprocessor.
//
// Stop-words: the standard English list used by most NLP
// toolkits (179 entries, including contraction fragments
// such as "don", "t", "ll" left over after tokenisation).
//
// Lemmatizer: a rule-based noun lemmatizer. It maps plural
// nouns to their singular form using a table of irregular
// plurals plus the usual suffix rules:
//
//   sses → ss    (classes  → class)
//   ies  → y     (cities   → city)
//   xes  → x     (boxes    → box)
//   ches → ch    (churches → church)
//   shes → sh    (wishes   → wish)
//   zzes → zz    (buzzes   → buzz)
//   s    → ""    (texts    → text)
//
// Words of three letters or fewer, words ending in ss/us/is,
// and a short list of non-plural "-s" words are left alone.
// Rules are applied until the word stops changing, so the
// lemmatizer is idempotent: lemma(lemma(w)) == lemma(w).

use std::collections::HashSet;
use std::sync::OnceLock;

pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what",
    "which", "who", "whom", "this", "that", "that'll", "these", "those", "am", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about",
    "against", "between", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// ASCII punctuation characters, each one a token on its own
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("oxen", "ox"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("wolves", "wolf"),
];

// "-s" words that are not plurals
const INVARIANT: &[&str] = &[
    "always", "perhaps", "sometimes", "news", "series", "species", "whereas",
    "thanks", "towards", "afterwards", "besides", "nowadays", "sms", "mms",
    "lots", "pls", "plus", "yes", "chess", "mathematics", "physics",
];

// Ordered: longer suffixes must win over the bare "s" rule
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("zzes", "zz"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("ies", "y"),
    ("s", ""),
];

fn stop_word_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(token: &str) -> bool {
    stop_word_set().contains(token)
}

pub fn is_punctuation(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if PUNCTUATION.contains(c))
}

/// Noun lemma of a lowercase token
pub fn lemmatize(token: &str) -> String {
    let mut current = token.to_string();
    // Every rule shortens the word or maps to a stable irregular form,
    // so this terminates well within the word length.
    loop {
        let next = lemmatize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn lemmatize_once(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }
    if word.chars().count() <= 3
        || !word.chars().all(char::is_alphabetic)
        || INVARIANT.contains(&word)
        || word.ends_with("ss")
        || word.ends_with("us")
        || word.ends_with("is")
    {
        return word.to_string();
    }

    for (suffix, replacement) in SUFFIX_RULES {
        if let Some(stem) = word.strip_suffix(suffix) {
            // "ies" → "y" only for longer words: ties → tie, cities → city
            if *suffix == "ies" && stem.chars().count() < 2 {
                continue;
            }
            return format!("{stem}{replacement}");
        }
    }
    word.to_string()
}
