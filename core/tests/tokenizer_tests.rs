use bookrec_core::tokenizer::{tokenize, tokenize_with, TokenizerOptions};

#[test]
fn it_normalizes_and_lowercases() {
    let words = tokenize("ＦＵＬＬＷＩＤＴＨ Café RUN!");
    // NFKC folds fullwidth letters
    assert!(words.contains(&"fullwidth".to_string()));
    assert!(words.contains(&"café".to_string()));
    assert!(words.contains(&"run".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn it_splits_on_punctuation() {
    let words = tokenize("sci-fi,young_adult 1984");
    assert_eq!(words, vec!["sci", "fi", "young", "adult", "1984"]);
}

#[test]
fn stopword_only_text_is_empty() {
    assert!(tokenize("the a an").is_empty());
    assert!(tokenize("  ...  ").is_empty());
}

#[test]
fn stemming_collapses_inflections() {
    let words = tokenize_with("Wizards wizard", TokenizerOptions { stem: true });
    assert_eq!(words, vec!["wizard", "wizard"]);
}
