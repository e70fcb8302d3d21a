//! Deterministic evidence packing under a character budget.

use crate::document::SearchResult;

/// Delimiter line prefixed to every evidence block. Provenance-neutral: the
/// model can tell evidence units apart without seeing internal file paths.
const BLOCK_HEADER: &str = "[source]";

/// Separator between accepted blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Render one candidate as an evidence block.
fn render_block(result: &SearchResult) -> String {
    format!("{BLOCK_HEADER}\n{}\n", result.text)
}

/// Pack ranked candidates into a single evidence string of at most
/// `max_chars` characters. The budget counts characters, not bytes, so
/// multibyte evidence is not penalized.
///
/// Walks `results` in the given best-first order and appends each rendered
/// block — separator overhead included — only while the running total stays
/// within budget. Assembly stops at the first block that would overflow; it
/// never skips ahead to a later, shorter block, so the accepted set is
/// always a prefix of the ranked list.
///
/// Returns an empty string when even the first block exceeds the budget;
/// callers still pass that to generation, whose "insufficient evidence"
/// policy handles it.
pub fn assemble(results: &[SearchResult], max_chars: usize) -> String {
    let mut assembled = String::new();
    let mut used_chars = 0usize;
    for result in results {
        let block = render_block(result);
        let block_chars = block.chars().count();
        let needed = if assembled.is_empty() {
            block_chars
        } else {
            BLOCK_SEPARATOR.len() + block_chars
        };
        if used_chars + needed > max_chars {
            break;
        }
        if !assembled.is_empty() {
            assembled.push_str(BLOCK_SEPARATOR);
        }
        assembled.push_str(&block);
        used_chars += needed;
    }
    assembled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Tag;

    fn result(id: &str, text: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            score: 0.9,
            text: text.to_string(),
            tag: Tag::Planet { planet_name: "Sun".into(), source_file: "planets.json".into() },
        }
    }

    #[test]
    fn stops_at_first_overflowing_block() {
        // Blocks render as "[source]\n{text}\n": 100 chars of text -> 109.
        // Admitting the second block would need 109 + 2 + 59 = 170 > 120.
        let results = vec![result("a", &"x".repeat(100)), result("b", &"y".repeat(50))];
        let assembled = assemble(&results, 120);
        assert!(assembled.contains(&"x".repeat(100)));
        assert!(!assembled.contains(&"y".repeat(50)));
        assert!(assembled.len() <= 120);
    }

    #[test]
    fn preserves_ranked_order() {
        let results =
            vec![result("first", "alpha"), result("second", "beta"), result("third", "gamma")];
        let assembled = assemble(&results, 1000);
        let alpha = assembled.find("alpha").unwrap();
        let beta = assembled.find("beta").unwrap();
        let gamma = assembled.find("gamma").unwrap();
        assert!(alpha < beta && beta < gamma);
    }

    #[test]
    fn empty_when_first_block_exceeds_budget() {
        let results = vec![result("a", &"x".repeat(100))];
        assert_eq!(assemble(&results, 50), "");
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        // Ten two-byte characters: 20 chars of block total, 30 bytes. A
        // 20-char budget must admit it.
        let results = vec![result("a", &"é".repeat(10))];
        let assembled = assemble(&results, 20);
        assert!(assembled.contains(&"é".repeat(10)));
        assert_eq!(assembled.chars().count(), 20);
    }

    #[test]
    fn empty_results_assemble_to_empty_string() {
        assert_eq!(assemble(&[], 1000), "");
    }
}
