//! Anchored matcher over a compiled token sequence.
//!
//! `format` needs real matching without a general regex engine. The token
//! sequence is flattened to leaves and matched against the whole input,
//! greedy-first with backtracking across variable-length class runs. All
//! positions are **character** (not byte) indices.

use super::ast::{Token, flatten, slot_count};

/// Match `input` in full against `tokens`.
///
/// On success returns one capture per mask slot, in slot order: the matched
/// character for literal and consumed class slots, `None` for the
/// unconsumed optional slots of a variable run.
pub fn match_full(tokens: &[Token], input: &str) -> Option<Vec<Option<char>>> {
    let leaves = flatten(tokens);
    let chars: Vec<char> = input.chars().collect();
    let mut captures = vec![None; slot_count(&leaves)];
    if match_from(&leaves, 0, &chars, 0, 0, &mut captures) {
        Some(captures)
    } else {
        None
    }
}

/// Match leaves `li..` against `input[pos..]`, recording captures at
/// `slot_base..`. Succeeds only if the input is consumed exactly.
fn match_from(
    leaves: &[Token],
    li: usize,
    input: &[char],
    pos: usize,
    slot_base: usize,
    captures: &mut Vec<Option<char>>,
) -> bool {
    let Some(leaf) = leaves.get(li) else {
        return pos == input.len();
    };
    match leaf {
        Token::Literal(c) => {
            if input.get(pos) != Some(c) {
                return false;
            }
            captures[slot_base] = Some(*c);
            match_from(leaves, li + 1, input, pos + 1, slot_base + 1, captures)
        }
        Token::ClassRun {
            alphabet,
            min_len,
            max_len,
        } => {
            // Longest available run of members, capped at max_len.
            let mut longest = 0;
            while longest < *max_len
                && input
                    .get(pos + longest)
                    .is_some_and(|&ch| alphabet.contains(ch))
            {
                longest += 1;
            }

            // Greedy-first: try the most characters, then back off.
            let mut n = longest;
            loop {
                if n < *min_len {
                    return false;
                }
                for i in 0..*max_len {
                    captures[slot_base + i] = if i < n { Some(input[pos + i]) } else { None };
                }
                if match_from(leaves, li + 1, input, pos + n, slot_base + max_len, captures) {
                    return true;
                }
                if n == 0 {
                    return false;
                }
                n -= 1;
            }
        }
        // flatten() leaves no groups behind.
        Token::Group(_) => unreachable!("groups are flattened before matching"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parser::compile;

    fn caps(pattern: &str, input: &str) -> Option<String> {
        let tokens = compile(pattern).unwrap();
        match_full(&tokens, input)
            .map(|caps| caps.into_iter().map(|c| c.unwrap_or('_')).collect())
    }

    // --- Exact masks ---

    #[test]
    fn fixed_mask_matches() {
        assert_eq!(caps(r"\d{3}-[A-Z]{2}", "427-XZ"), Some("427-XZ".to_string()));
    }

    #[test]
    fn fixed_mask_rejects_wrong_class() {
        assert_eq!(caps(r"\d{3}-[A-Z]{2}", "427-9Z"), None);
    }

    #[test]
    fn match_is_anchored_both_ends() {
        assert_eq!(caps(r"\d{2}", "123"), None);
        assert_eq!(caps(r"\d{2}", "1"), None);
        assert_eq!(caps(r"\d{2}", "x12"), None);
    }

    #[test]
    fn literals_must_match() {
        assert_eq!(caps(r"\d-\d", "1-2"), Some("1-2".to_string()));
        assert_eq!(caps(r"\d-\d", "1x2"), None);
    }

    // --- Variable runs ---

    #[test]
    fn variable_run_greedy() {
        assert_eq!(caps(r"\d{2,4}", "123"), Some("123_".to_string()));
        assert_eq!(caps(r"\d{2,4}", "1234"), Some("1234".to_string()));
        assert_eq!(caps(r"\d{2,4}", "1"), None);
        assert_eq!(caps(r"\d{2,4}", "12345"), None);
    }

    #[test]
    fn variable_run_backtracks_for_following_run() {
        // The first run must give one digit back so the second can match.
        assert_eq!(caps(r"\d{1,2}\d", "12"), Some("1_2".to_string()));
    }

    #[test]
    fn optional_run_may_consume_nothing() {
        assert_eq!(caps(r"\d{0,2}-", "-"), Some("__-".to_string()));
        assert_eq!(caps(r"\d{0,2}-", "7-"), Some("7_-".to_string()));
    }

    // --- Groups ---

    #[test]
    fn groups_are_transparent_to_matching() {
        assert_eq!(caps(r"(\d{2})(\d{2})", "1234"), Some("1234".to_string()));
    }

    // --- Cyrillic ---

    #[test]
    fn cyrillic_run() {
        assert_eq!(
            caps("[АБВГДЕЖЗИЙКЛМНОПРСТУФЧЦЧЭЮЯЪЬЫШ]{3}", "МИР"),
            Some("МИР".to_string())
        );
        assert_eq!(caps("[АБВГДЕЖЗИЙКЛМНОПРСТУФЧЦЧЭЮЯЪЬЫШ]{3}", "MIP"), None);
    }

    // --- Empty pattern ---

    #[test]
    fn empty_pattern_matches_only_empty_input() {
        assert_eq!(caps("", ""), Some(String::new()));
        assert_eq!(caps("", "x"), None);
    }
}
