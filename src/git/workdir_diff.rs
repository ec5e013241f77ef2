//! Extraction of the working tree's pending modifications against head.
//!
//! The diff is taken with zero context lines so hunks carry nothing but
//! the removed and added lines themselves. Only in-place modifications
//! are kept; added, deleted, and renamed files are not split.

use git2::{Delta, DiffOptions, Patch, Repository};

use crate::error::GitFaultError;
use crate::git::repository::head_commit;

/// One contiguous diff region. Starts are 0-based file positions; git
/// reports 1-based starts, and for a side with no lines it reports the
/// line before the edit, so the conversion saturates at the top of the
/// file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: Vec<Vec<u8>>,
    pub new_start: usize,
    pub new_lines: Vec<Vec<u8>>,
}

/// The full pending patch of one modified file.
#[derive(Debug)]
pub struct FilePatch {
    pub filename: String,
    pub mode: u32,
    pub hunks: Vec<Hunk>,
}

/// Diff the working tree against head and collect the patches of every
/// modified file.
pub fn modified_patches(repo: &Repository) -> Result<Vec<FilePatch>, GitFaultError> {
    let head_tree = head_commit(repo)?.tree()?;

    let mut diff_opts = DiffOptions::new();
    diff_opts.context_lines(0);
    diff_opts.ignore_submodules(true);

    let diff = repo.diff_tree_to_workdir(Some(&head_tree), Some(&mut diff_opts))?;

    let mut patches = Vec::new();
    for (index, delta) in diff.deltas().enumerate() {
        if delta.status() != Delta::Modified {
            continue;
        }

        let old_file = delta.old_file();
        let filename = old_file
            .path()
            .and_then(|path| path.to_str())
            .ok_or_else(|| GitFaultError::Generic("Unreadable path in diff delta".to_string()))?
            .to_string();
        let mode = u32::from(old_file.mode());

        let Some(patch) = Patch::from_diff(&diff, index)? else {
            // Binary or otherwise content-less delta.
            continue;
        };

        patches.push(FilePatch {
            filename,
            mode,
            hunks: collect_hunks(&patch)?,
        });
    }

    Ok(patches)
}

fn collect_hunks(patch: &Patch<'_>) -> Result<Vec<Hunk>, GitFaultError> {
    let mut hunks = Vec::new();
    for hunk_index in 0..patch.num_hunks() {
        let (header, line_count) = patch.hunk(hunk_index)?;

        let mut old_lines = Vec::new();
        let mut new_lines = Vec::new();
        for line_index in 0..line_count {
            let line = patch.line_in_hunk(hunk_index, line_index)?;
            match line.origin() {
                '-' => old_lines.push(line.content().to_vec()),
                '+' => new_lines.push(line.content().to_vec()),
                _ => {}
            }
        }

        hunks.push(Hunk {
            old_start: (header.old_start() as usize).saturating_sub(1),
            old_lines,
            new_start: (header.new_start() as usize).saturating_sub(1),
            new_lines,
        });
    }
    Ok(hunks)
}
