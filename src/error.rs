use std::fmt;

#[derive(Debug)]
pub enum GitFaultError {
    GitError(git2::Error),
    IoError(std::io::Error),
    /// A line of the pre-change file has no blame entry. Indicates an
    /// inconsistency between the diff and the blame of the head revision.
    UnattributedLine { filename: String, line: usize },
    /// An edit resolved to a position or length outside the current
    /// line buffer of a file.
    OutOfRangeEdit {
        filename: String,
        position: i64,
        len: usize,
    },
    Generic(String),
}

impl fmt::Display for GitFaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitFaultError::GitError(e) => write!(f, "Git error: {}", e),
            GitFaultError::IoError(e) => write!(f, "IO error: {}", e),
            GitFaultError::UnattributedLine { filename, line } => {
                write!(f, "No blame entry for {}:{}", filename, line + 1)
            }
            GitFaultError::OutOfRangeEdit {
                filename,
                position,
                len,
            } => write!(
                f,
                "Edit of {} line(s) at position {} is outside the bounds of {}",
                len, position, filename
            ),
            GitFaultError::Generic(e) => write!(f, "Generic error: {}", e),
        }
    }
}

impl std::error::Error for GitFaultError {}

impl From<git2::Error> for GitFaultError {
    fn from(err: git2::Error) -> Self {
        GitFaultError::GitError(err)
    }
}

impl From<std::io::Error> for GitFaultError {
    fn from(err: std::io::Error) -> Self {
        GitFaultError::IoError(err)
    }
}
