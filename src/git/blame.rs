use std::collections::HashMap;
use std::path::Path;

use git2::{BlameOptions, Oid, Repository};

use crate::error::GitFaultError;
use crate::git::repository::head_commit;

/// Blame `filename` at the head revision and flatten the result into a
/// map from 0-based line index to the commit that authored the line.
/// Covers every line of the file as of head.
pub fn blame_per_line(
    repo: &Repository,
    filename: &str,
) -> Result<HashMap<usize, Oid>, GitFaultError> {
    let mut blame_opts = BlameOptions::new();
    blame_opts.newest_commit(head_commit(repo)?.id());

    let blame = repo.blame_file(Path::new(filename), Some(&mut blame_opts))?;

    let mut blame_map = HashMap::new();
    for index in 0..blame.len() {
        let hunk = blame
            .get_index(index)
            .ok_or_else(|| GitFaultError::Generic("Failed to get blame hunk".to_string()))?;

        let start = hunk.final_start_line(); // 1-indexed
        for offset in 0..hunk.lines_in_hunk() {
            // Make it 0 based
            blame_map.insert(start + offset - 1, hunk.final_commit_id());
        }
    }

    Ok(blame_map)
}
