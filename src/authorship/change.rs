//! Atomic, commit-attributed edits derived from diff hunks.
//!
//! A [`Change`] is the unit of attribution and replay: one contiguous
//! replacement, insertion, or deletion, pinned to the commit that
//! authored the pre-change content it touches.

use std::collections::{BTreeMap, HashMap};

use git2::{Oid, Repository};

use crate::authorship::match_lines::match_lines;
use crate::error::GitFaultError;
use crate::git::blame::blame_per_line;
use crate::git::workdir_diff::{FilePatch, Hunk};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub filename: String,
    /// The commit that authored the pre-change content this edit is
    /// anchored to.
    pub commit: Oid,
    /// Absolute pre-change file position of the first removed line.
    pub old_start: usize,
    pub old_lines: Vec<Vec<u8>>,
    /// Absolute post-change file position of the first added line.
    pub new_start: usize,
    /// Orders insertions that share the same `new_start`. Only
    /// meaningful when `old_lines` is empty.
    pub new_start_inner: usize,
    pub new_lines: Vec<Vec<u8>>,
    pub mode: u32,
}

impl Change {
    /// Position key used to order this change against the offsets of
    /// previously applied changes in the same file. Replacements and
    /// deletions anchor on the old side; pure insertions have no old
    /// anchor and order by their position among the added lines.
    pub fn offset_key(&self) -> (usize, usize) {
        if self.old_lines.is_empty() {
            (self.new_start, self.new_start_inner)
        } else {
            (self.old_start, self.new_start)
        }
    }
}

/// Every removed line of the whole patch, keyed by its absolute
/// pre-change file index. This is what makes a line moved across hunks
/// recognizable from the hunk it reappears in.
pub fn map_removed_lines(hunks: &[Hunk]) -> BTreeMap<usize, Vec<u8>> {
    let mut map = BTreeMap::new();
    for hunk in hunks {
        for (index, line) in hunk.old_lines.iter().enumerate() {
            map.insert(hunk.old_start + index, line.clone());
        }
    }
    map
}

fn authoring_commit(
    blame_map: &HashMap<usize, Oid>,
    filename: &str,
    line: usize,
) -> Result<Oid, GitFaultError> {
    blame_map
        .get(&line)
        .copied()
        .ok_or_else(|| GitFaultError::UnattributedLine {
            filename: filename.to_string(),
            line,
        })
}

/// Turn one hunk's alignment into a sequence of attributed changes.
fn split_hunk_to_changes(
    hunk: &Hunk,
    filename: &str,
    blame_map: &HashMap<usize, Oid>,
    removed_lines: &BTreeMap<usize, Vec<u8>>,
    mode: u32,
) -> Result<Vec<Change>, GitFaultError> {
    let matching = match_lines(&hunk.old_lines, &hunk.new_lines, removed_lines);

    let mut changes = Vec::new();
    for (old_indices, new_indices) in &matching.groups {
        // A group with no old side has no content of its own to blame;
        // fall back to the line at the hunk's old position.
        let blamed_line = match old_indices.first() {
            Some(first) => hunk.old_start + first,
            None => hunk.old_start,
        };
        let (old_start, old_lines) = match (old_indices.first(), old_indices.last()) {
            (Some(first), Some(last)) => (
                hunk.old_start + first,
                hunk.old_lines[*first..=*last].to_vec(),
            ),
            _ => (hunk.old_start, Vec::new()),
        };
        let (new_start, new_lines) = match (new_indices.first(), new_indices.last()) {
            (Some(first), Some(last)) => (
                hunk.new_start + first,
                hunk.new_lines[*first..=*last].to_vec(),
            ),
            _ => (hunk.new_start, Vec::new()),
        };
        changes.push(Change {
            filename: filename.to_string(),
            commit: authoring_commit(blame_map, filename, blamed_line)?,
            old_start,
            old_lines,
            new_start,
            new_start_inner: 0,
            new_lines,
            mode,
        });
    }

    for matched in &matching.external {
        // The removed original was already deleted by whichever hunk
        // produced it; this change only inserts the line at its new home.
        changes.push(Change {
            filename: filename.to_string(),
            commit: authoring_commit(blame_map, filename, matched.old_index)?,
            old_start: matched.old_index,
            old_lines: Vec::new(),
            new_start: hunk.new_start,
            new_start_inner: matched.new_index,
            new_lines: vec![matched.line.clone()],
            mode,
        });
    }

    Ok(changes)
}

/// Split a modified file's patch into attributed changes, blaming each
/// against the head revision of the file.
pub fn split_patch_to_changes(
    repo: &Repository,
    patch: &FilePatch,
) -> Result<Vec<Change>, GitFaultError> {
    let blame_map = blame_per_line(repo, &patch.filename)?;
    let removed_lines = map_removed_lines(&patch.hunks);

    let mut changes = Vec::new();
    for hunk in &patch.hunks {
        changes.extend(split_hunk_to_changes(
            hunk,
            &patch.filename,
            &blame_map,
            &removed_lines,
            patch.mode,
        )?);
    }
    Ok(changes)
}

/// Changes bucketed by authoring commit, iterable in the order commits
/// were first seen while scanning patches. That discovery order decides
/// the order the replacement commits are chained in.
#[derive(Debug, Default)]
pub struct GroupedChanges {
    order: Vec<Oid>,
    by_commit: HashMap<Oid, Vec<Change>>,
}

impl GroupedChanges {
    pub fn push(&mut self, change: Change) {
        if !self.by_commit.contains_key(&change.commit) {
            self.order.push(change.commit);
        }
        self.by_commit.entry(change.commit).or_default().push(change);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Oid, &[Change])> {
        self.order
            .iter()
            .map(|commit| (*commit, self.by_commit[commit].as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub fn group_changes_by_commit(changes: impl IntoIterator<Item = Change>) -> GroupedChanges {
    let mut grouped = GroupedChanges::default();
    for change in changes {
        grouped.push(change);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<Vec<u8>> {
        raw.iter().map(|line| line.as_bytes().to_vec()).collect()
    }

    fn oid(n: u8) -> Oid {
        Oid::from_bytes(&[n; 20]).unwrap()
    }

    fn blame(entries: &[(usize, Oid)]) -> HashMap<usize, Oid> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_old_sides_reassemble_the_hunk() {
        let hunk = Hunk {
            old_start: 4,
            old_lines: lines(&["fn alpha()\n", "fn beta()\n", "fn gamma()\n"]),
            new_start: 4,
            new_lines: lines(&["fn alpha()\n", "fn gamma()\n"]),
        };
        let blame_map = blame(&[(4, oid(1)), (5, oid(2)), (6, oid(3))]);
        let changes =
            split_hunk_to_changes(&hunk, "src/lib.rs", &blame_map, &BTreeMap::new(), 0o100644)
                .unwrap();

        let mut old: Vec<Vec<u8>> = Vec::new();
        for change in &changes {
            old.extend(change.old_lines.iter().cloned());
        }
        assert_eq!(old, hunk.old_lines);
    }

    #[test]
    fn test_new_sides_reassemble_the_hunk() {
        let hunk = Hunk {
            old_start: 0,
            old_lines: lines(&["one\n", "two\n"]),
            new_start: 0,
            new_lines: lines(&["one\n", "two and a half\n", "three\n"]),
        };
        let blame_map = blame(&[(0, oid(1)), (1, oid(2))]);
        let changes =
            split_hunk_to_changes(&hunk, "notes.txt", &blame_map, &BTreeMap::new(), 0o100644)
                .unwrap();

        let mut new: Vec<(usize, usize, Vec<Vec<u8>>)> = changes
            .iter()
            .filter(|change| !change.new_lines.is_empty())
            .map(|change| {
                (
                    change.new_start,
                    change.new_start_inner,
                    change.new_lines.clone(),
                )
            })
            .collect();
        new.sort();
        let new: Vec<Vec<u8>> = new.into_iter().flat_map(|(_, _, lines)| lines).collect();
        assert_eq!(new, hunk.new_lines);
    }

    #[test]
    fn test_each_change_blames_its_first_old_line() {
        let hunk = Hunk {
            old_start: 10,
            old_lines: lines(&["first line\n", "second line\n"]),
            new_start: 10,
            new_lines: lines(&["first line changed\n", "second line changed\n"]),
        };
        let blame_map = blame(&[(10, oid(1)), (11, oid(2))]);
        let changes =
            split_hunk_to_changes(&hunk, "a.txt", &blame_map, &BTreeMap::new(), 0o100644).unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].commit, oid(1));
        assert_eq!(changes[0].old_start, 10);
        assert_eq!(changes[1].commit, oid(2));
        assert_eq!(changes[1].old_start, 11);
    }

    #[test]
    fn test_pure_insertion_blames_the_hunk_position() {
        let hunk = Hunk {
            old_start: 3,
            old_lines: Vec::new(),
            new_start: 4,
            new_lines: lines(&["brand new\n"]),
        };
        let blame_map = blame(&[(3, oid(9))]);
        let changes =
            split_hunk_to_changes(&hunk, "a.txt", &blame_map, &BTreeMap::new(), 0o100644).unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].commit, oid(9));
        assert!(changes[0].old_lines.is_empty());
        assert_eq!(changes[0].offset_key(), (4, 0));
    }

    #[test]
    fn test_external_match_becomes_a_pure_insertion() {
        // "let helper = 1;" left the file in another hunk; here it comes
        // back. The change must not delete the original a second time.
        let hunk = Hunk {
            old_start: 20,
            old_lines: lines(&["unrelated\n"]),
            new_start: 18,
            new_lines: lines(&["let helper_value = 1;\n"]),
        };
        let mut removed = BTreeMap::new();
        removed.insert(2, b"let helper_value = 1;\n".to_vec());
        let blame_map = blame(&[(2, oid(5)), (20, oid(6))]);

        let changes =
            split_hunk_to_changes(&hunk, "a.txt", &blame_map, &removed, 0o100644).unwrap();

        let insertion = changes
            .iter()
            .find(|change| change.commit == oid(5))
            .unwrap();
        assert!(insertion.old_lines.is_empty());
        assert_eq!(insertion.old_start, 2);
        assert_eq!(insertion.new_start, 18);
        assert_eq!(insertion.new_start_inner, 0);
        assert_eq!(insertion.offset_key(), (18, 0));

        // The abandoned old line becomes a deletion blamed on its author.
        let deletion = changes
            .iter()
            .find(|change| change.commit == oid(6))
            .unwrap();
        assert!(deletion.new_lines.is_empty());
        assert_eq!(deletion.old_lines, lines(&["unrelated\n"]));
    }

    #[test]
    fn test_missing_blame_entry_is_fatal() {
        let hunk = Hunk {
            old_start: 0,
            old_lines: lines(&["orphan\n"]),
            new_start: 0,
            new_lines: lines(&["orphan edited\n"]),
        };
        let err = split_hunk_to_changes(&hunk, "a.txt", &HashMap::new(), &BTreeMap::new(), 0o100644)
            .unwrap_err();
        assert!(matches!(
            err,
            GitFaultError::UnattributedLine { line: 0, .. }
        ));
    }

    #[test]
    fn test_map_removed_lines_spans_all_hunks() {
        let hunks = vec![
            Hunk {
                old_start: 0,
                old_lines: lines(&["a\n", "b\n"]),
                new_start: 0,
                new_lines: Vec::new(),
            },
            Hunk {
                old_start: 9,
                old_lines: lines(&["z\n"]),
                new_start: 7,
                new_lines: lines(&["y\n"]),
            },
        ];
        let map = map_removed_lines(&hunks);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&0], b"a\n".to_vec());
        assert_eq!(map[&1], b"b\n".to_vec());
        assert_eq!(map[&9], b"z\n".to_vec());
    }

    #[test]
    fn test_grouping_preserves_discovery_order() {
        let change = |commit: Oid, old_start: usize| Change {
            filename: "a.txt".to_string(),
            commit,
            old_start,
            old_lines: lines(&["x\n"]),
            new_start: old_start,
            new_start_inner: 0,
            new_lines: lines(&["y\n"]),
            mode: 0o100644,
        };
        let grouped = group_changes_by_commit(vec![
            change(oid(3), 0),
            change(oid(1), 5),
            change(oid(3), 9),
        ]);

        let order: Vec<Oid> = grouped.iter().map(|(commit, _)| commit).collect();
        assert_eq!(order, vec![oid(3), oid(1)]);
        let (_, first_bucket) = grouped.iter().next().unwrap();
        assert_eq!(first_bucket.len(), 2);
    }
}
