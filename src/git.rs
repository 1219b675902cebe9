use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Resolves the checked-out branch for a directory
pub trait BranchLookup {
    /// Branch name, or `None` when unknown, detached, or not a repository
    async fn current_branch(&self, path: &str) -> Option<String>;
}

/// Branch lookup via `git rev-parse`
pub struct GitCli {
    git_path: String,
    timeout: Duration,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            git_path: "git".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchLookup for GitCli {
    async fn current_branch(&self, path: &str) -> Option<String> {
        let child = Command::new(&self.git_path)
            .args(["-C", path, "rev-parse", "--abbrev-ref", "HEAD"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child).await.ok()?.ok()?;
        if !output.status.success() {
            return None;
        }

        branch_name(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Normalize `rev-parse --abbrev-ref` output; "HEAD" means detached
fn branch_name(stdout: &str) -> Option<String> {
    match stdout.trim() {
        "" | "HEAD" => None,
        branch => Some(branch.to_string()),
    }
}
