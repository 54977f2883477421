//! Candidate token windows.
//!
//! Scoring only the first few tokens of every candidate keeps the greedy
//! merge cheap. The adaptive tables pick the window from the number of live
//! candidates and the length of the source text.

use crate::config::TokenWindow;

/// Window table: `(min candidates, [(min source tokens, window)])`.
pub type WindowTable = [(usize, &'static [(usize, usize)])];

/// Windows for sources that do not end a sentence.
pub const WINDOWS: &WindowTable = &[
    (2, &[(1, 2)]),
    (4, &[(1, 2), (40, 3)]),
    (8, &[(1, 2), (32, 3)]),
    (16, &[(1, 2), (12, 3)]),
];

/// Windows for sources that end a sentence.
pub const SENTENCE_WINDOWS: &WindowTable = &[
    (2, &[(1, 1), (2, 4), (12, 12), (48, 14)]),
    (4, &[(1, 1), (7, 3), (10, 12), (56, 14)]),
    (8, &[(1, 1), (8, 5), (16, 14)]),
    (16, &[(1, 1), (14, 14)]),
];

/// Number of candidate tokens to score for one source.
///
/// `ends_sentence` only matters for a sentence-aware adaptive window.
///
/// # Examples
///
/// ```
/// use page_order::config::TokenWindow;
/// use page_order::scoring::window_limit;
///
/// assert_eq!(window_limit(TokenWindow::Fixed(5), 10, 30, false), 5);
///
/// let adaptive = TokenWindow::Adaptive { sentence_aware: true };
/// assert_eq!(window_limit(adaptive, 4, 50, false), 3);
/// assert_eq!(window_limit(adaptive, 4, 50, true), 12);
/// ```
pub fn window_limit(
    window: TokenWindow,
    candidates: usize,
    source_tokens: usize,
    ends_sentence: bool,
) -> usize {
    let sentence_aware = match window {
        TokenWindow::Fixed(n) => return n,
        TokenWindow::Adaptive { sentence_aware } => sentence_aware,
    };

    let table = if sentence_aware && ends_sentence {
        SENTENCE_WINDOWS
    } else {
        WINDOWS
    };

    // too few candidates for any row: widest plain row
    let mut row = WINDOWS[WINDOWS.len() - 1].1;
    for &(min_candidates, entries) in table {
        if min_candidates > candidates {
            break;
        }
        row = entries;
    }

    let mut limit = row[0].1;
    for &(min_tokens, value) in row {
        if min_tokens > source_tokens {
            break;
        }
        limit = value;
    }
    limit
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TokenWindow = TokenWindow::Adaptive {
        sentence_aware: false,
    };
    const SENTENCES: TokenWindow = TokenWindow::Adaptive {
        sentence_aware: true,
    };

    #[test]
    fn test_fixed_window() {
        assert_eq!(window_limit(TokenWindow::Fixed(7), 100, 1, true), 7);
    }

    #[test]
    fn test_plain_rows() {
        assert_eq!(window_limit(PLAIN, 2, 100, false), 2);
        assert_eq!(window_limit(PLAIN, 5, 39, false), 2);
        assert_eq!(window_limit(PLAIN, 5, 40, false), 3);
        assert_eq!(window_limit(PLAIN, 100, 12, false), 3);
        // sentence endings are ignored without sentence awareness
        assert_eq!(window_limit(PLAIN, 100, 14, true), 3);
    }

    #[test]
    fn test_sentence_rows() {
        assert_eq!(window_limit(SENTENCES, 2, 1, true), 1);
        assert_eq!(window_limit(SENTENCES, 3, 12, true), 12);
        assert_eq!(window_limit(SENTENCES, 9, 16, true), 14);
        assert_eq!(window_limit(SENTENCES, 16, 13, true), 1);
    }

    #[test]
    fn test_edge_counts() {
        // one candidate left falls back to the widest plain row
        assert_eq!(window_limit(SENTENCES, 1, 20, true), 3);
        // empty source text takes the first entry
        assert_eq!(window_limit(PLAIN, 8, 0, false), 2);
    }
}
