use std::env;
use std::sync::OnceLock;

use crate::error::GitFaultError;

const DEFAULT_COMMITTER_NAME: &str = "git-fault";
const DEFAULT_COMMITTER_EMAIL: &str = "git-fault@git-fault.dev";

/// Centralized configuration for the application
pub struct Config {
    committer_name: String,
    committer_email: String,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    /// Initialize the global configuration exactly once.
    /// Safe to call multiple times; subsequent calls are no-ops.
    pub fn init() {
        let _ = Self::get();
    }

    /// Access the global configuration, initializing it on first use.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| Config {
            committer_name: env_or("GIT_FAULT_COMMITTER_NAME", DEFAULT_COMMITTER_NAME),
            committer_email: env_or("GIT_FAULT_COMMITTER_EMAIL", DEFAULT_COMMITTER_EMAIL),
        })
    }

    /// The identity recorded as the committer of every commit this tool
    /// creates. The author of the original commit is kept as the author.
    pub fn committer_signature(&self) -> Result<git2::Signature<'static>, GitFaultError> {
        git2::Signature::now(&self.committer_name, &self.committer_email)
            .map_err(GitFaultError::GitError)
    }
}

fn env_or(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => default.to_string(),
    }
}
