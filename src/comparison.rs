// 🔤 Comparison - positional similarity for strings, token lists and sentences
// Intentionally simple: element i of one side is only ever compared with element i of the other.

use crate::error::{Result, SequenceError};

/// Splitters applied to descriptions on top of whitespace
pub const DEFAULT_SPLITTERS: [&str; 2] = ["--", "*"];

// ============================================================================
// ITERABLE COMPARISON
// ============================================================================

/// Compare two ordered sequences position by position.
///
/// Only the shared prefix (length of the shorter side) is scored; trailing
/// elements of the longer side are ignored. Returns matches / compared,
/// ranging from 0.0 to 1.0.
///
/// Fails with [`SequenceError::EmptyComparison`] when there is nothing to
/// compare, i.e. when either side is empty.
pub fn compare_iterables<A, B, T>(a: A, b: B) -> Result<f64>
where
    A: IntoIterator<Item = T>,
    B: IntoIterator<Item = T>,
    T: PartialEq,
{
    let mut similarity: usize = 0;
    let mut difference: usize = 0;

    for (x, y) in a.into_iter().zip(b) {
        if x == y {
            similarity += 1;
        } else {
            difference += 1;
        }
    }

    let compared = similarity + difference;
    if compared == 0 {
        return Err(SequenceError::EmptyComparison);
    }

    Ok(similarity as f64 / compared as f64)
}

// ============================================================================
// SENTENCE COMPARISON
// ============================================================================

/// Normalize a sentence into tokens: trim, turn every extra splitter into a
/// space, then split on whitespace.
pub fn split_sentence<S: AsRef<str>>(sentence: &str, extra_splits: &[S]) -> Vec<String> {
    let mut reworked = sentence.trim().to_string();
    for chars in extra_splits {
        let chars = chars.as_ref();
        if !chars.is_empty() {
            reworked = reworked.replace(chars, " ");
        }
    }

    reworked.split_whitespace().map(str::to_string).collect()
}

/// Compare two sentences token by token.
pub fn compare_sentences<S: AsRef<str>>(
    sentence_a: &str,
    sentence_b: &str,
    extra_splits: &[S],
) -> Result<f64> {
    let tokens_a = split_sentence(sentence_a, extra_splits);
    let tokens_b = split_sentence(sentence_b, extra_splits);
    compare_iterables(&tokens_a, &tokens_b)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_equal_string_iterables() {
        let result = compare_iterables("TEST 1014".chars(), "TEST 1014".chars()).unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn test_compare_similar_string_iterables() {
        // Only the 7 shared positions count: "TEST 14" vs "TEST 10"
        let result = compare_iterables("TEST 14".chars(), "TEST 1014".chars()).unwrap();
        assert!((result - 6.0 / 7.0).abs() < 1e-9);
        assert!(result >= 0.5);
    }

    #[test]
    fn test_compare_different_string_iterables() {
        let result = compare_iterables("TEST 14".chars(), "DIVE 1014".chars()).unwrap();
        assert!(result < 0.5);
    }

    #[test]
    fn test_compare_equal_list_iterables() {
        let result = compare_iterables(["TEST", "1014"], ["TEST", "1014"]).unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn test_compare_similar_list_iterables() {
        let result = compare_iterables(["TEST", "14"], ["TEST", "1014"]).unwrap();
        assert_eq!(result, 0.5);
    }

    #[test]
    fn test_compare_disjoint_lists() {
        let result = compare_iterables(["TEST", "14"], ["DIVE", "1014"]).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_compare_is_symmetric() {
        let a = "NETFLIX.COM 866-579-7172";
        let b = "NETFLIX COM 866 579 7172 CA";
        let ab = compare_iterables(a.chars(), b.chars()).unwrap();
        let ba = compare_iterables(b.chars(), a.chars()).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_compare_empty_is_error() {
        let empty: [&str; 0] = [];
        let result = compare_iterables(empty, empty);
        assert!(matches!(result, Err(SequenceError::EmptyComparison)));

        // One empty side leaves no shared positions either
        let result = compare_iterables(empty, ["TEST"]);
        assert!(matches!(result, Err(SequenceError::EmptyComparison)));
    }

    #[test]
    fn test_split_sentence_with_default_splitters() {
        let tokens = split_sentence("  THIRD*ONE--6565  ", &DEFAULT_SPLITTERS);
        assert_eq!(tokens, vec!["THIRD", "ONE", "6565"]);
    }

    #[test]
    fn test_compare_equal_sentences() {
        let result = compare_sentences(
            "PETCO ANIMAL SUPPLIES",
            "PETCO ANIMAL SUPPLIES",
            &DEFAULT_SPLITTERS,
        )
        .unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn test_compare_similar_sentences() {
        let result = compare_sentences(
            "JACK IN THE BOX 92495",
            "JACK IN THE BOX 57812",
            &DEFAULT_SPLITTERS,
        )
        .unwrap();
        assert!((result - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_compare_different_sentences() {
        let result = compare_sentences("THE HOME DEPOT 6132", "DILLARD'S", &DEFAULT_SPLITTERS).unwrap();
        assert!(result < 0.5);
    }

    #[test]
    fn test_compare_sentences_uses_extra_splits() {
        // Without splitting on '*' both sides are a single differing token
        let none: [&str; 0] = [];
        let plain = compare_sentences("THIRD*ONE*6565", "THIRD*ONE*2907", &none).unwrap();
        assert_eq!(plain, 0.0);

        let split = compare_sentences("THIRD*ONE*6565", "THIRD*ONE*2907", &DEFAULT_SPLITTERS).unwrap();
        assert!((split - 2.0 / 3.0).abs() < 1e-9);
    }
}
