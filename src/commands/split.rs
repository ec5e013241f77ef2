//! Replay of the working tree's pending edits as attributed commits.
//!
//! Edits are grouped by the commit that authored the lines they touch,
//! then replayed group by group. Every group snapshots the cumulative
//! state of all touched files into one new commit, so the chain of
//! created commits ends exactly at the working tree's content.

use std::collections::HashMap;

use git2::{IndexEntry, IndexTime, Oid, Repository, Signature};

use crate::authorship::apply::{OffsetTable, apply_change_on_lines, record_offset};
use crate::authorship::change::{GroupedChanges, group_changes_by_commit, split_patch_to_changes};
use crate::config::Config;
use crate::error::GitFaultError;
use crate::git::repository::head_file_lines;
use crate::git::workdir_diff::modified_patches;
use crate::utils::debug_log;

/// Split the pending modifications of the repository's working tree
/// into one commit per original authoring commit. Returns the created
/// commit ids in the order they were chained onto head.
pub fn run(repo: &Repository) -> Result<Vec<Oid>, GitFaultError> {
    let patches = modified_patches(repo)?;

    let mut changes = Vec::new();
    for patch in &patches {
        debug_log(&format!(
            "splitting {} ({} hunk(s))",
            patch.filename,
            patch.hunks.len()
        ));
        changes.extend(split_patch_to_changes(repo, patch)?);
    }

    let grouped = group_changes_by_commit(changes);
    commit_changes(repo, &grouped)
}

fn commit_changes(repo: &Repository, grouped: &GroupedChanges) -> Result<Vec<Oid>, GitFaultError> {
    if grouped.is_empty() {
        return Ok(Vec::new());
    }

    let committer = Config::get().committer_signature()?;

    // Buffers and offset tables are per file and live across every
    // group: a later commit must see the lines earlier commits moved.
    let mut file_lines: HashMap<String, Vec<Vec<u8>>> = HashMap::new();
    let mut file_offsets: HashMap<String, OffsetTable> = HashMap::new();
    let mut file_modes: HashMap<String, u32> = HashMap::new();

    for (_, changes) in grouped.iter() {
        for change in changes {
            if !file_lines.contains_key(&change.filename) {
                file_lines.insert(
                    change.filename.clone(),
                    head_file_lines(repo, &change.filename)?,
                );
            }
            file_modes.insert(change.filename.clone(), change.mode);
        }
    }

    let mut created = Vec::new();
    for (original_commit, changes) in grouped.iter() {
        if changes.is_empty() {
            continue;
        }

        for change in changes {
            let lines = file_lines.get_mut(&change.filename).ok_or_else(|| {
                GitFaultError::Generic(format!("No line buffer for {}", change.filename))
            })?;
            let offsets = file_offsets.entry(change.filename.clone()).or_default();
            apply_change_on_lines(change, lines, offsets)?;
            record_offset(offsets, change);
        }

        let commit_id =
            create_commit_from_commit(repo, &file_lines, &file_modes, original_commit, &committer)?;
        debug_log(&format!(
            "created {} from original {}",
            commit_id, original_commit
        ));
        created.push(commit_id);
    }

    Ok(created)
}

/// Snapshot the cumulative state of every touched file into one commit
/// chained onto head, reusing the original commit's author and message.
fn create_commit_from_commit(
    repo: &Repository,
    file_lines: &HashMap<String, Vec<Vec<u8>>>,
    file_modes: &HashMap<String, u32>,
    original_commit: Oid,
    committer: &Signature<'_>,
) -> Result<Oid, GitFaultError> {
    let mut index = repo.index()?;
    for (filename, lines) in file_lines {
        let content = lines.concat();
        index.add(&blob_index_entry(
            repo,
            filename,
            &content,
            file_modes[filename],
        )?)?;
    }
    index.write()?;

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let parent = repo.head()?.peel_to_commit()?;

    let original = repo.find_commit(original_commit)?;
    let message = format!(
        "{}\n\nAutomatic commit by git-fault, original commit:\n{}",
        original.message().unwrap_or("").trim_end(),
        original_commit
    );

    repo.commit(
        Some("HEAD"),
        &original.author(),
        committer,
        &message,
        &tree,
        &[&parent],
    )
    .map_err(GitFaultError::GitError)
}

fn blob_index_entry(
    repo: &Repository,
    filename: &str,
    content: &[u8],
    mode: u32,
) -> Result<IndexEntry, GitFaultError> {
    let blob_id = repo.blob(content)?;
    Ok(IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode,
        uid: 0,
        gid: 0,
        file_size: content.len() as u32,
        id: blob_id,
        flags: 0,
        flags_extended: 0,
        path: filename.as_bytes().to_vec(),
    })
}
