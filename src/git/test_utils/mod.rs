//! Helpers for tests that need a real repository with known authorship.
//!
//! `TmpRepo` wraps a freshly initialized repository in a temporary
//! directory. Its main trick is committing a file one line per commit,
//! with the line's index as the commit message, so tests can read the
//! blame of a file back as a map of line index to original line index.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use git2::{IndexEntry, IndexTime, Oid, Repository, Signature};
use tempfile::TempDir;

use crate::config::Config;
use crate::error::GitFaultError;
use crate::git::blame::blame_per_line;

pub struct TmpRepo {
    dir: TempDir,
    repo: Repository,
}

impl TmpRepo {
    /// Creates a repository in a temporary directory with a configured
    /// test user and an initial empty commit.
    pub fn new() -> Result<Self, GitFaultError> {
        Config::init();

        let dir = TempDir::new()?;
        let repo = Repository::init(dir.path())?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        // Seed an initial commit so every later commit has a parent.
        {
            let signature = Signature::now("test", "test@example.com")?;
            let tree_id = repo.index()?.write_tree()?;
            let tree = repo.find_tree(tree_id)?;
            repo.commit(Some("HEAD"), &signature, &signature, "init", &tree, &[])?;
        }

        Ok(TmpRepo { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Commits `text` line by line: the first commit contains only the
    /// first line, the second commit the first two lines, and so on,
    /// each with its line index as the commit message. The working file
    /// is left at the full text afterwards.
    pub fn commit_file_by_line(
        &self,
        filename: &str,
        text: &str,
    ) -> Result<Vec<Oid>, GitFaultError> {
        let signature = Signature::now("test", "test@example.com")?;
        let split: Vec<&str> = text.split('\n').collect();

        let mut contents = String::new();
        let mut commits = Vec::new();
        for (index, line) in split.iter().enumerate() {
            contents.push_str(line);
            if index != split.len() - 1 {
                contents.push('\n');
            }

            let blob_id = self.repo.blob(contents.as_bytes())?;
            let mut repo_index = self.repo.index()?;
            repo_index.add(&index_entry(filename, blob_id, contents.len()))?;
            repo_index.write()?;
            let tree = self.repo.find_tree(repo_index.write_tree()?)?;
            let parent = self.repo.head()?.peel_to_commit()?;

            commits.push(self.repo.commit(
                Some("HEAD"),
                &signature,
                &signature,
                &index.to_string(),
                &tree,
                &[&parent],
            )?);
        }

        self.write_file(filename, text)?;
        Ok(commits)
    }

    /// Overwrites the working copy of `filename` without staging it.
    pub fn write_file(&self, filename: &str, contents: &str) -> Result<(), GitFaultError> {
        fs::write(self.path().join(filename), contents)?;
        Ok(())
    }

    /// Blames `filename` at head and resolves each line to the first
    /// line of its authoring commit's message.
    pub fn blame_messages(&self, filename: &str) -> Result<HashMap<usize, String>, GitFaultError> {
        let blame_map = blame_per_line(&self.repo, filename)?;

        let mut messages = HashMap::new();
        for (line, commit_id) in blame_map {
            let commit = self.repo.find_commit(commit_id)?;
            let subject = commit
                .message()
                .unwrap_or("")
                .lines()
                .next()
                .unwrap_or("")
                .to_string();
            messages.insert(line, subject);
        }
        Ok(messages)
    }

    /// Full messages of the commits reachable from head, newest first,
    /// stopping after `count` commits.
    pub fn head_messages(&self, count: usize) -> Result<Vec<String>, GitFaultError> {
        let mut messages = Vec::new();
        let mut commit = self.repo.head()?.peel_to_commit()?;
        while messages.len() < count {
            messages.push(commit.message().unwrap_or("").to_string());
            match commit.parent(0) {
                Ok(parent) => commit = parent,
                Err(_) => break,
            }
        }
        Ok(messages)
    }
}

fn index_entry(filename: &str, blob_id: Oid, file_size: usize) -> IndexEntry {
    IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode: 0o100644,
        uid: 0,
        gid: 0,
        file_size: file_size as u32,
        id: blob_id,
        flags: 0,
        flags_extended: 0,
        path: filename.as_bytes().to_vec(),
    }
}
