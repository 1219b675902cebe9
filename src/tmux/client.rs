use anyhow::{Context, Result};
use std::time::Duration;
use tokio::process::Command;

use super::{Pane, PaneSource};

/// Tab-delimited format for `tmux list-panes -a -F`, eight fields per pane
const LIST_PANES_FORMAT: &str = "#{session_name}\t#{window_index}\t#{pane_index}\t#{pane_id}\t#{pane_active}\t#{pane_current_path}\t#{pane_pid}\t#{pane_current_command}";

const PANE_FIELDS: usize = 8;

/// Client for interacting with tmux via CLI
pub struct TmuxClient {
    /// Path to tmux binary
    tmux_path: String,
    /// Upper bound for a single tmux invocation
    timeout: Duration,
}

impl TmuxClient {
    pub fn new() -> Self {
        Self {
            tmux_path: "tmux".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Run tmux with `args`, returning stdout on success
    async fn run(&self, args: &[&str]) -> Result<String> {
        let child = Command::new(&self.tmux_path)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .with_context(|| format!("tmux {} timed out", args[0]))?
            .with_context(|| format!("Failed to execute tmux {}", args[0]))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tmux {} failed: {}", args[0], stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PaneSource for TmuxClient {
    async fn list_panes(&self) -> Result<Vec<Pane>> {
        let stdout = self
            .run(&["list-panes", "-a", "-F", LIST_PANES_FORMAT])
            .await?;
        Ok(parse_list_panes(&stdout))
    }

    async fn capture_pane(&self, pane_id: &str, lines: usize) -> Result<String> {
        let start = format!("-{}", lines);
        self.run(&["capture-pane", "-p", "-J", "-t", pane_id, "-S", &start])
            .await
    }
}

/// Parse `list-panes` output, dropping malformed lines
fn parse_list_panes(output: &str) -> Vec<Pane> {
    output.lines().filter_map(parse_pane_line).collect()
}

fn parse_pane_line(line: &str) -> Option<Pane> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() != PANE_FIELDS {
        return None;
    }

    Some(Pane {
        session_name: parts[0].to_string(),
        window_index: parts[1].to_string(),
        pane_index: parts[2].to_string(),
        pane_id: parts[3].to_string(),
        is_focused: parts[4] == "1",
        current_path: parts[5].to_string(),
        pane_pid: parts[6].trim().parse().ok(),
        current_command: parts[7].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pane_line() {
        let line = "work\t0\t1\t%4\t1\t/home/u/proj\t4242\tcursor-agent";
        let pane = parse_pane_line(line).unwrap();
        assert_eq!(pane.session_name, "work");
        assert_eq!(pane.window_index, "0");
        assert_eq!(pane.pane_index, "1");
        assert_eq!(pane.pane_id, "%4");
        assert!(pane.is_focused);
        assert_eq!(pane.current_path, "/home/u/proj");
        assert_eq!(pane.pane_pid, Some(4242));
        assert_eq!(pane.current_command, "cursor-agent");
    }

    #[test]
    fn test_parse_unfocused_pane_with_bad_pid() {
        let pane = parse_pane_line("s\t2\t0\t%9\t0\t/tmp\t?\tzsh").unwrap();
        assert!(!pane.is_focused);
        assert_eq!(pane.pane_pid, None);
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let output = "\
work\t0\t0\t%1\t1\t/a\t10\tzsh
too\tfew\tfields
work\t0\t1\t%2\t0\t/b\t11\tcursor\textra

work\t1\t0\t%3\t0\t/c\t12\tcursor-agent
";
        let panes = parse_list_panes(output);
        let ids: Vec<&str> = panes.iter().map(|p| p.pane_id.as_str()).collect();
        assert_eq!(ids, vec!["%1", "%3"]);
    }

    #[test]
    fn test_default_client() {
        let client = TmuxClient::default();
        assert_eq!(client.tmux_path, "tmux");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }
}
