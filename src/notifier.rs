use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::git::BranchLookup;
use crate::tmux::Pane;

/// Prefix of every idle notification
const IDLE_MARKER: &str = "Cursor-Agent idle in";

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] ureq::Error),

    #[error("webhook returned status {0}")]
    Status(u16),

    #[error("failed to encode webhook payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("webhook worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Delivers a message to an external endpoint
pub trait WebhookSender {
    async fn send(&self, content: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Discord-compatible webhook: POST `{"content": "..."}`
pub struct DiscordWebhook {
    url: String,
    agent: ureq::Agent,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(WEBHOOK_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            url: url.into(),
            agent,
        }
    }
}

impl WebhookSender for DiscordWebhook {
    async fn send(&self, content: &str) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(&WebhookPayload { content })?;
        let agent = self.agent.clone();
        let url = self.url.clone();

        // ureq is blocking; keep it off the runtime thread
        let status = tokio::task::spawn_blocking(move || {
            agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(&body[..])
                .map(|response| response.status())
        })
        .await??;

        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// What happened to an idle notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    DryRun,
    Failed,
}

/// Builds idle messages and hands them to the webhook
pub struct Notifier<B, W> {
    branches: B,
    sender: W,
    dry_run: bool,
}

impl<B: BranchLookup, W: WebhookSender> Notifier<B, W> {
    pub fn new(branches: B, sender: W, dry_run: bool) -> Self {
        Self {
            branches,
            sender,
            dry_run,
        }
    }

    /// Announce that `pane` went idle. Delivery errors are logged, never returned.
    pub async fn notify_idle(&self, pane: &Pane) -> DeliveryOutcome {
        let branch = self.branches.current_branch(&pane.current_path).await;
        let message = format_idle_message(pane, branch.as_deref());

        if self.dry_run {
            info!(dry_run = true, "NOTIFY: {}", message);
            return DeliveryOutcome::DryRun;
        }

        match self.sender.send(&message).await {
            Ok(()) => {
                info!("NOTIFY: {}", message);
                DeliveryOutcome::Sent
            }
            Err(e) => {
                debug!(pane = %pane.human_ref(), error = %e, "Failed to send webhook");
                DeliveryOutcome::Failed
            }
        }
    }
}

pub fn format_idle_message(pane: &Pane, branch: Option<&str>) -> String {
    let mut message = format!(
        "{} {} — {}",
        IDLE_MARKER,
        pane.human_ref(),
        pane.current_path
    );
    if let Some(branch) = branch {
        message.push_str(&format!(" (branch {})", branch));
    }
    message
}
