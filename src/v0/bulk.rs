/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Server-side bulk commands (bulk delete, bulk media info) and the poller
//! that waits for them.

use crate::v0::api::ApiClient;
use crate::v0::errors::CtmsError;
use crate::v0::hal::Link;
use crate::v0::macros::require_link;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Acknowledgement of a submitted bulk command.
#[derive(Deserialize, Debug, Clone)]
pub struct BulkCommandResponse {
    pub command: CommandInfo,

    #[serde(rename = "_links", default)]
    pub links: CommandLinks,
}

/// Status document of a bulk command, polled via its `self` link.
#[derive(Deserialize, Debug, Clone)]
pub struct BulkCommandStatus {
    pub command: CommandInfo,

    #[serde(default)]
    pub payload: CommandPayload,

    #[serde(rename = "_links", default)]
    pub links: CommandLinks,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommandInfo {
    pub id: String,

    /// Percentage 0..=100; absent until the command has been scheduled.
    #[serde(default)]
    pub progress: Option<u8>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CommandPayload {
    #[serde(rename = "command-parameters", default)]
    pub parameters: CommandParameters,

    #[serde(default)]
    pub result: Option<Vec<CommandResult>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CommandParameters {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Per-item outcome reported once a bulk command finishes.
#[derive(Deserialize, Debug, Clone)]
pub struct CommandResult {
    #[serde(default)]
    pub data: Option<String>,

    pub success: bool,

    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CommandLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,
}

/// How a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    /// The command reported 100% progress.
    Complete,
    /// The retry ceiling was hit first. Not an error: the command may still
    /// finish server-side, the caller inspects `progress` to decide.
    TimedOut,
}

/// The last status seen by the poller, with how the loop ended and how many
/// polls it took.
#[derive(Debug, Clone)]
pub struct PolledStatus {
    pub state: CommandState,
    pub status: BulkCommandStatus,
    pub polls: usize,
}

impl PolledStatus {
    pub fn is_complete(&self) -> bool {
        self.state == CommandState::Complete
    }
}

// Attempts 0..=MAX_POLLS inclusive, sleeping before every poll.
const MAX_POLLS: usize = 20;

/// Fetches the current status of a bulk command.
pub async fn get_bulk_status(
    api: &ApiClient,
    command: &BulkCommandResponse,
) -> Result<BulkCommandStatus, CtmsError> {
    let url = &require_link!(command.links.self_link, "self").href;
    api.get::<BulkCommandStatus>(url).await
}

/// Polls a bulk command until it reports 100% progress or the retry ceiling
/// is hit, with an interval scaled to the amount of work:
/// `min(item_count * 300ms, 10s)`.
///
/// A command over zero items returns `None` immediately, skipping the poll
/// cycle entirely.
pub async fn await_completion(
    api: &ApiClient,
    command: &BulkCommandResponse,
    item_count: usize,
) -> Result<Option<PolledStatus>, CtmsError> {
    if item_count == 0 {
        return Ok(None);
    }
    let interval = Duration::from_millis((item_count as u64 * 300).min(10_000));
    await_completion_with(api, command, interval).await.map(Some)
}

/// [`await_completion`] with an explicit poll interval.
pub async fn await_completion_with(
    api: &ApiClient,
    command: &BulkCommandResponse,
    interval: Duration,
) -> Result<PolledStatus, CtmsError> {
    let mut polls = 0;
    let mut state = CommandState::TimedOut;
    let status = loop {
        tokio::time::sleep(interval).await;
        let current = get_bulk_status(api, command).await?;
        polls += 1;

        let progress = current.command.progress.unwrap_or(0);
        debug!(
            action = "bulk status",
            reference = current.command.id.as_str(),
            "poll {polls} completed for: {progress}%"
        );

        if progress == 100 {
            state = CommandState::Complete;
            break current;
        }
        if polls > MAX_POLLS {
            warn!(
                action = "bulk status",
                reference = current.command.id.as_str(),
                "command not finished within {polls} poll(s) of {}ms",
                interval.as_millis()
            );
            break current;
        }
    };

    log_item_outcomes(&status);

    Ok(PolledStatus {
        state,
        status,
        polls,
    })
}

// Failure interpretation stays with the caller; the poller only surfaces
// each failed item with the server-provided message.
fn log_item_outcomes(status: &BulkCommandStatus) {
    let Some(results) = status.payload.result.as_ref() else {
        return;
    };
    let succeeded = results.iter().filter(|entry| entry.success).count();
    debug!(
        action = "bulk status",
        reference = status.command.id.as_str(),
        "succeeded item(s): {succeeded}, failed item(s): {}",
        results.len() - succeeded
    );
    for entry in results.iter().filter(|entry| !entry.success) {
        warn!(
            action = "bulk status",
            reference = entry.data.as_deref().unwrap_or("unknown"),
            "{}",
            entry.error_message.as_deref().unwrap_or("no error message")
        );
    }
}
