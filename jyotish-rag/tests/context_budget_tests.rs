//! Property tests for the evidence-packing character budget.

use jyotish_rag::context::assemble;
use jyotish_rag::document::{SearchResult, Tag};
use proptest::prelude::*;

fn result(id: usize, text: String) -> SearchResult {
    SearchResult {
        id: format!("entry_{id}"),
        score: 1.0 - id as f32 * 0.01,
        text,
        tag: Tag::Planet { planet_name: "Sun".into(), source_file: "planets.json".into() },
    }
}

/// Wrapped length of one block: "[source]\n" + text + "\n".
fn block_len(text: &str) -> usize {
    "[source]\n".len() + text.len() + 1
}

/// Independently compute the longest admissible prefix length.
fn expected_prefix_len(texts: &[String], max_chars: usize) -> usize {
    let mut total = 0usize;
    let mut accepted = 0usize;
    for text in texts {
        let needed = if accepted == 0 { block_len(text) } else { 2 + block_len(text) };
        if total + needed > max_chars {
            break;
        }
        total += needed;
        accepted += 1;
    }
    accepted
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For all result sets and budgets, the assembled context never exceeds
    /// the budget and the accepted blocks are exactly the longest admissible
    /// prefix of the ranked list.
    #[test]
    fn assembled_length_bounded_and_prefix_is_longest(
        texts in proptest::collection::vec("[a-z ]{0,60}", 0..12),
        max_chars in 0usize..400,
    ) {
        let results: Vec<SearchResult> =
            texts.iter().cloned().enumerate().map(|(i, t)| result(i, t)).collect();

        let assembled = assemble(&results, max_chars);
        prop_assert!(assembled.len() <= max_chars);

        let accepted = assembled.matches("[source]\n").count();
        prop_assert_eq!(accepted, expected_prefix_len(&texts, max_chars));

        // Order is preserved: accepted texts appear in ranked order.
        let mut cursor = 0usize;
        for text in texts.iter().take(accepted).filter(|t| !t.is_empty()) {
            let found = assembled[cursor..]
                .find(text.as_str())
                .expect("accepted text missing from assembled context");
            cursor += found + text.len();
        }
    }
}
