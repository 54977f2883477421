//! Continuation scoring interfaces.
//!
//! The language-model driven strategies treat the model as an opaque
//! service: it reads a context once and then scores candidate token
//! sequences as continuations of that context. Scores may lie in any real
//! range; the strategies normalize them with [`softmax`] themselves.

mod window;

pub use window::{window_limit, SENTENCE_WINDOWS, WINDOWS};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;

lazy_static! {
    // one or two digits right before the final mark, e.g. "see page 12."
    static ref NUMBERED_END: Regex = Regex::new(r"[^\d](\d{1,2}).$").unwrap();
}

/// A model that scores continuations of a read context.
pub trait ContinuationScorer {
    /// Opaque state after reading a context.
    type State;

    /// Read `context` and return the resulting state.
    fn read(&self, context: &str) -> Result<Self::State>;

    /// State before reading anything, used for unconditional scores.
    fn read_init(&self) -> Result<Self::State>;

    /// One score per candidate token sequence; higher means more likely.
    fn estimate(&self, state: &Self::State, candidates: &[&[u32]]) -> Result<Vec<f64>>;
}

/// Text to token id conversion.
pub trait Tokenizer {
    /// Encode `text` into token ids.
    fn encode(&self, text: &str) -> Vec<u32>;
}

impl<S: ContinuationScorer + ?Sized> ContinuationScorer for &S {
    type State = S::State;

    fn read(&self, context: &str) -> Result<Self::State> {
        (**self).read(context)
    }

    fn read_init(&self) -> Result<Self::State> {
        (**self).read_init()
    }

    fn estimate(&self, state: &Self::State, candidates: &[&[u32]]) -> Result<Vec<f64>> {
        (**self).estimate(state, candidates)
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for &T {
    fn encode(&self, text: &str) -> Vec<u32> {
        (**self).encode(text)
    }
}

/// Numerically stable softmax.
///
/// # Examples
///
/// ```
/// use page_order::scoring::softmax;
///
/// let probs = softmax(&[1.0, 1.0]);
/// assert_eq!(probs, vec![0.5, 0.5]);
/// assert!(softmax(&[]).is_empty());
/// ```
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        // all -inf (or empty): fall back to uniform
        let n = values.len() as f64;
        return values.iter().map(|_| 1.0 / n).collect();
    }
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Whether `text` ends a sentence.
///
/// The trimmed text needs at least three characters and a final `.`, `!` or
/// `?`, and must not end in a one- or two-digit number before that mark.
///
/// # Examples
///
/// ```
/// use page_order::scoring::is_end_of_sentence;
///
/// assert!(is_end_of_sentence("The end."));
/// assert!(!is_end_of_sentence("see chapter 12."));
/// assert!(!is_end_of_sentence("and so"));
/// ```
pub fn is_end_of_sentence(text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() < 3 {
        return false;
    }
    if !text.ends_with(['.', '!', '?']) {
        return false;
    }
    !NUMBERED_END.is_match(text)
}
