//! Word-overlap similarity between two lines of text.
//!
//! Scoring is deliberately crude: a line is reduced to its set of words
//! and two lines score by the total length of the words they share.
//! Longer shared words weigh more, so `general_kenobi` pulls harder
//! than `{`. The score is not normalized by line length.

use std::collections::HashSet;

/// Score returned when both lines tokenize to nothing (blank lines,
/// pure punctuation). Keeps blank lines matching other blank lines
/// rather than whatever token-bearing line happens to be nearby.
const EMPTY_LINE_SCORE: i64 = 100;

/// Reduce a line to its set of words.
///
/// Comma-space pairs and newlines are dropped, brackets become word
/// breaks, and single quotes are normalized to double quotes so that
/// requoted string literals still count as the same word.
fn words(line: &[u8]) -> HashSet<Vec<u8>> {
    let mut scrubbed = Vec::with_capacity(line.len());
    let mut pos = 0;
    while pos < line.len() {
        match line[pos] {
            b',' if line.get(pos + 1) == Some(&b' ') => pos += 2,
            b'\n' => pos += 1,
            b'(' | b')' | b'[' | b']' => {
                scrubbed.push(b' ');
                pos += 1;
            }
            b'\'' => {
                scrubbed.push(b'"');
                pos += 1;
            }
            byte => {
                scrubbed.push(byte);
                pos += 1;
            }
        }
    }

    scrubbed
        .split(|byte| *byte == b' ')
        .filter(|word| !word.is_empty())
        .map(|word| word.to_vec())
        .collect()
}

/// Similarity between two lines: the summed length of the words they
/// have in common, or the fixed empty-line score when neither has any.
pub fn similarity_score(first: &[u8], second: &[u8]) -> i64 {
    let first_words = words(first);
    let second_words = words(second);

    if first_words.is_empty() && second_words.is_empty() {
        return EMPTY_LINE_SCORE;
    }

    first_words
        .intersection(&second_words)
        .map(|word| word.len() as i64)
        .sum()
}
