use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        // Contractions appear split at the apostrophe ("don't" -> "don", "t").
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","couldn",
            "d","did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "just","let","ll","m","me","more","most","mustn","my","myself",
            "no","nor","not","now","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "re","s","same","she","should","shouldn","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","would","wouldn",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Knobs that change how text maps to terms. Index build and query projection
/// must use the same options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Reduce terms to their English stem ("running" -> "run").
    pub stem: bool,
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize with default options (no stemming).
pub fn tokenize(text: &str) -> Vec<String> { tokenize_with(text, TokenizerOptions::default()) }

/// Tokenize text into terms: NFKC normalization, lowercase, split on anything that
/// is not a letter or digit, stopword removal, and optional stemming.
pub fn tokenize_with(text: &str, options: TokenizerOptions) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let mut tokens = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if is_stopword(token) { continue; }
        if options.stem {
            tokens.push(STEMMER.stem(token).into_owned());
        } else {
            tokens.push(token.to_string());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Harry Potter and the Sorcerer's Stone");
        assert_eq!(t, vec!["harry", "potter", "sorcerer", "stone"]);
    }

    #[test]
    fn stemming_is_opt_in() {
        let plain = tokenize("Running runners");
        assert_eq!(plain, vec!["running", "runners"]);
        let stemmed = tokenize_with("Running runners", TokenizerOptions { stem: true });
        assert!(stemmed.iter().any(|w| w == "run"));
    }
}
