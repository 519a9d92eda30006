use storyline_core::tokenizer::{is_stopword, normalize, tokenize};

#[test]
fn it_lowercases_and_strips_punctuation() {
    assert_eq!(normalize("Heist!!! In 1999, LONDON..."), "heist 1999 london");
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn it_does_not_stem() {
    assert_eq!(normalize("Running runners run"), "running runners run");
}

#[test]
fn non_ascii_letters_are_removed() {
    // Characters outside [a-z0-9] vanish rather than being transliterated.
    assert_eq!(normalize("Café Amélie"), "caf amlie");
}

#[test]
fn whitespace_collapses_to_single_spaces() {
    assert_eq!(normalize("  space\t\tpirates \n return  "), "space pirates return");
}

#[test]
fn normalization_is_idempotent() {
    let samples = [
        "A young wizard begins his journey at a magical school.",
        "Two detectives -- one rookie, one veteran -- hunt a killer in 1970s Seoul.",
        "",
        "   ",
        "the and of",
        "Ünïcödé & symbols: #1, @home, 100%!",
    ];
    for s in samples {
        let once = normalize(s);
        assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
    }
}

#[test]
fn stopword_only_text_normalizes_to_empty() {
    assert_eq!(normalize("The, and... of it!"), "");
    assert!(tokenize("   ").is_empty());
    assert!(is_stopword("wasn"));
    assert!(!is_stopword("wizard"));
}

#[test]
fn only_the_fixed_stopword_list_is_removed() {
    // Counting words and adverbs outside the list stay in the vocabulary.
    assert_eq!(normalize("Two friends travel together, one last time"), "two friends travel together one last time");
}
