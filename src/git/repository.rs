use std::path::Path;

use git2::Repository;

use crate::error::GitFaultError;
use crate::utils::split_lines;

pub fn find_repository() -> Result<Repository, GitFaultError> {
    Repository::open(".").map_err(GitFaultError::GitError)
}

pub fn head_commit(repo: &Repository) -> Result<git2::Commit<'_>, GitFaultError> {
    repo.head()?
        .peel_to_commit()
        .map_err(GitFaultError::GitError)
}

/// The lines of `filename` as committed at the head revision, before
/// any of the working tree's pending edits.
pub fn head_file_lines(repo: &Repository, filename: &str) -> Result<Vec<Vec<u8>>, GitFaultError> {
    let tree = head_commit(repo)?.tree()?;
    let entry = tree.get_path(Path::new(filename))?;
    let blob = repo.find_blob(entry.id())?;
    Ok(split_lines(blob.content()))
}
