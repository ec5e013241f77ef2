//! Best-effort alignment of a hunk's added lines onto its removed lines.
//!
//! A diff hunk gives no correspondence between the lines it removes and
//! the lines it adds. This module reconstructs one: every new line is
//! matched to the most similar old line at or after the last match, so
//! the alignment never reorders the region. New lines that look more
//! like a line removed elsewhere in the file (a move or a reflow) are
//! matched against that removed line instead, as an external match.

use std::collections::BTreeMap;

use crate::authorship::similarity::similarity_score;

/// Score handicap for candidates taken from the pool of lines removed
/// elsewhere in the file, so a local candidate wins when scores are close.
const EXTERNAL_MATCH_PENALTY: i64 = 5;

/// A new line matched to a line removed outside the current matching
/// window, identified by its absolute index in the pre-change file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalMatch {
    /// Absolute pre-change file index of the removed line.
    pub old_index: usize,
    /// Index of the new line within the hunk's added lines.
    pub new_index: usize,
    /// Content of the new line.
    pub line: Vec<u8>,
}

/// The outcome of aligning one hunk.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LineMatching {
    /// Pairs of (old hunk-line indices, new hunk-line indices) that edit
    /// each other. Old indices are contiguous; the final group carries
    /// the whole unmatched old tail. Indices on either side may be empty,
    /// but never both.
    pub groups: Vec<(Vec<usize>, Vec<usize>)>,
    /// New lines that matched a removed line from elsewhere in the file.
    pub external: Vec<ExternalMatch>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    score: i64,
    distance: usize,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        self.score > other.score || (self.score == other.score && self.distance < other.distance)
    }
}

/// Best-scoring candidate among `candidates`, preferring the smallest
/// index distance to `new_index` on score ties, and the lowest index on
/// full ties.
fn best_candidate<'a>(
    candidates: impl Iterator<Item = (usize, &'a [u8])>,
    new_index: usize,
    new_line: &[u8],
    penalty: i64,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (index, line) in candidates {
        let candidate = Candidate {
            index,
            score: similarity_score(line, new_line) - penalty,
            distance: index.abs_diff(new_index),
        };
        if best.is_none_or(|current| candidate.beats(&current)) {
            best = Some(candidate);
        }
    }
    best
}

/// Align `new_lines` onto `old_lines`.
///
/// New lines are processed left to right against a monotonic cursor into
/// the old lines: once a new line matches old index `k`, later new lines
/// only consider old indices at or after `k`. A best local match landing
/// on old index 0 is treated as a defaulted, meaningless match, and the
/// pool of lines removed elsewhere in the file (`removed_lines`, keyed
/// by absolute pre-change index) competes for the line with a score
/// penalty. An external match does not advance the cursor.
pub fn match_lines(
    old_lines: &[Vec<u8>],
    new_lines: &[Vec<u8>],
    removed_lines: &BTreeMap<usize, Vec<u8>>,
) -> LineMatching {
    // new hunk-line index -> matched old hunk-line index
    let mut matched: BTreeMap<usize, usize> = BTreeMap::new();
    let mut external: Vec<ExternalMatch> = Vec::new();
    let mut cursor = 0;

    for (new_index, new_line) in new_lines.iter().enumerate() {
        let local = best_candidate(
            old_lines
                .iter()
                .enumerate()
                .skip(cursor)
                .map(|(index, line)| (index, line.as_slice())),
            new_index,
            new_line,
            0,
        );

        let fallback = match local {
            Some(candidate) if candidate.index != 0 => None,
            _ => best_candidate(
                removed_lines
                    .iter()
                    .map(|(index, line)| (*index, line.as_slice())),
                new_index,
                new_line,
                EXTERNAL_MATCH_PENALTY,
            ),
        };

        match (local, fallback) {
            (Some(candidate), Some(ext)) if ext.beats(&candidate) => {
                external.push(ExternalMatch {
                    old_index: ext.index,
                    new_index,
                    line: new_line.clone(),
                });
            }
            (Some(candidate), _) => {
                matched.insert(new_index, candidate.index);
                cursor = candidate.index;
            }
            (None, Some(ext)) => {
                external.push(ExternalMatch {
                    old_index: ext.index,
                    new_index,
                    line: new_line.clone(),
                });
            }
            // No old lines and nothing removed elsewhere: anchor the new
            // line to the cursor so a pure addition still forms one group.
            (None, None) => {
                matched.insert(new_index, cursor);
            }
        }
    }

    let matched_to = |old_index: usize| -> Vec<usize> {
        matched
            .iter()
            .filter(|(_, index)| **index == old_index)
            .map(|(new_index, _)| *new_index)
            .collect()
    };

    // One group per old line below the cursor, then the whole old tail
    // bundled with whatever matched the cursor last.
    let mut groups: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
    for old_index in 0..cursor {
        groups.push((vec![old_index], matched_to(old_index)));
    }
    let tail: Vec<usize> = (cursor..old_lines.len()).collect();
    let tail_matches = matched_to(cursor);
    if !tail.is_empty() || !tail_matches.is_empty() {
        groups.push((tail, tail_matches));
    }

    LineMatching { groups, external }
}
