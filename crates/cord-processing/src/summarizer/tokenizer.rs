//! Title tokenization and stopword filtering.

use std::collections::HashSet;

/// Built-in stopwords: common English function words plus terms that
/// appear in nearly every title of a coronavirus literature corpus.
///
/// Hyphenated entries such as `covid-19` never survive tokenization as a
/// single token; their parts (`covid`, `cov`) are listed on their own.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    // function words
    "the", "and", "of", "in", "to", "a", "for", "on", "with", "is", "by", "from", "an", "are",
    "as", "at", "be", "or", "its", "their", "this", "that", "these", "those", "was", "were",
    "has", "have", "had", "been", "not", "can", "into", "via", "between", "during", "after",
    "before", "among", "within", "without", "under", "over", "than", "which", "who", "what",
    "how", "why", "when", "where", "does", "did", "our", "your", "but", "all", "also", "may",
    "new", "use", "based",
    // corpus terms
    "covid", "covid-19", "sars", "sars-cov-2", "cov", "coronavirus",
];

/// A set of lowercase words excluded from word frequencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS.iter().copied())
    }
}

impl Stopwords {
    /// A stopword set made of exactly `words` (lowercased).
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// An empty set: every token counts.
    pub fn none() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Add more words to the set.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Split text into lowercase tokens.
///
/// Every character that is not a letter or digit acts as a separator, so
/// `"SARS-CoV-2: a review"` yields `sars`, `cov`, `2`, `a`, `review`.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + use<> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}

/// Tokens of `text` that count toward word frequencies.
pub(crate) fn content_tokens(
    text: &str,
    stopwords: &Stopwords,
    min_len: usize,
) -> impl Iterator<Item = String> {
    tokenize(text)
        .filter(move |token| token.chars().count() >= min_len && !stopwords.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<String> {
        tokenize(text).collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            collect("SARS-CoV-2: a Review!"),
            vec!["sars", "cov", "2", "a", "review"]
        );
        assert_eq!(collect("  spaced\tout\nwords "), vec!["spaced", "out", "words"]);
        assert!(collect("?!...").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_non_ascii_letters() {
        assert_eq!(collect("Étude über Viren"), vec!["étude", "über", "viren"]);
    }

    #[test]
    fn test_content_tokens_filters_stopwords_and_short_tokens() {
        let stopwords = Stopwords::default();
        let tokens: Vec<_> =
            content_tokens("The Spread of COVID-19 in an ICU ward", &stopwords, 3).collect();

        assert_eq!(tokens, vec!["spread", "icu", "ward"]);
    }

    #[test]
    fn test_min_length_counts_characters() {
        let stopwords = Stopwords::none();
        let tokens: Vec<_> = content_tokens("ab éé abc", &stopwords, 3).collect();
        assert_eq!(tokens, vec!["abc"]);
    }

    #[test]
    fn test_custom_stopwords() {
        let mut stopwords = Stopwords::new(["Virus"]);
        stopwords.extend([" Vaccine ", ""]);

        assert!(stopwords.contains("virus"));
        assert!(stopwords.contains("vaccine"));
        assert!(!stopwords.contains("the"));
        assert_eq!(stopwords.len(), 2);
    }
}
