//! Text analysis used when building segments.
//!
//! Text is split on Unicode word boundaries (UAX #29) and lowercased. Only
//! segment construction analyzes text; enumeration works on the stored terms.

use unicode_segmentation::UnicodeSegmentation;

use crate::term::Term;

/// Splits text into lowercase Unicode words.
///
/// ```
/// use termwalk::lexical::analyzer::UnicodeWordAnalyzer;
///
/// let analyzer = UnicodeWordAnalyzer::new();
/// let terms: Vec<_> = analyzer.analyze("Don't forget, be careful!").collect();
/// assert_eq!(terms, vec!["don't", "forget", "be", "careful"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordAnalyzer {
    max_token_length: Option<usize>,
}

impl UnicodeWordAnalyzer {
    /// Create a new analyzer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop tokens longer than `max` bytes.
    pub fn with_max_token_length(mut self, max: usize) -> Self {
        self.max_token_length = Some(max);
        self
    }

    /// Tokens of `text`, in order of appearance (duplicates included).
    pub fn analyze<'a>(&self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        let max = self.max_token_length;
        text.unicode_words()
            .map(|word| word.to_lowercase())
            .filter(move |word| max.is_none_or(|max| word.len() <= max))
    }

    /// Tokens of `text` as terms.
    pub fn terms<'a>(&self, text: &'a str) -> impl Iterator<Item = Term> + 'a {
        self.analyze(text).map(Term::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_is_dropped() {
        let analyzer = UnicodeWordAnalyzer::new();
        let tokens: Vec<_> = analyzer.analyze("Hello, world! 你好").collect();
        assert_eq!(tokens[0], "hello");
        assert_eq!(tokens[1], "world");
        assert!(tokens.len() >= 3);
    }

    #[test]
    fn test_max_token_length() {
        let analyzer = UnicodeWordAnalyzer::new().with_max_token_length(4);
        let tokens: Vec<_> = analyzer.analyze("be careful always").collect();
        assert_eq!(tokens, vec!["be"]);
    }
}
