/// Commands the pages send to the background worker
use crate::host::{HostError, TabHost};
use crate::operations::{collapse_all_groups, expand_all_groups, remove_duplicate_tabs, ungroup_all_tabs};
use crate::policy::group_all_tabs_by_domain;
use crate::settings::{SettingsStore, load_settings_or_default};
use futures::future::{Either, select};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use thiserror::Error;

/// How long a page waits for the background worker to answer
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    GroupByDomain,
    UngroupAll,
    ExpandAll,
    CollapseAll,
    RemoveDuplicates,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::GroupByDomain,
        Command::UngroupAll,
        Command::ExpandAll,
        Command::CollapseAll,
        Command::RemoveDuplicates,
    ];

    /// Name used on the wire
    pub fn action(self) -> &'static str {
        match self {
            Command::GroupByDomain => "groupByDomain",
            Command::UngroupAll => "ungroupAll",
            Command::ExpandAll => "expandAll",
            Command::CollapseAll => "collapseAll",
            Command::RemoveDuplicates => "removeDuplicates",
        }
    }

    pub fn from_action(action: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|c| c.action() == action)
    }

    fn success_message(self) -> &'static str {
        match self {
            Command::GroupByDomain => "Tabs grouped",
            Command::UngroupAll => "Tabs ungrouped",
            Command::ExpandAll => "Groups expanded",
            Command::CollapseAll => "Groups collapsed",
            Command::RemoveDuplicates => "Duplicates removed",
        }
    }
}

/// Request as sent over the extension message channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub action: Option<String>,
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            action: Some(command.action().to_string()),
        }
    }
}

/// Reply to a `Message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(message: &str) -> ActionResult {
        ActionResult {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn failed(error: String) -> ActionResult {
        ActionResult {
            success: false,
            message: None,
            error: Some(error),
        }
    }
}

/// Parse and run a raw message. Unknown actions are reported, not raised.
pub async fn handle_message<H: TabHost, S: SettingsStore>(host: &H, store: &S, message: &Message) -> ActionResult {
    let action = message.action.as_deref().unwrap_or("none");
    match Command::from_action(action) {
        Some(command) => handle(host, store, command).await,
        None => {
            info!("Unknown action: {}", action);
            ActionResult::failed(format!("Unknown action: {}", action))
        }
    }
}

/// Run one command to completion and describe the result
pub async fn handle<H: TabHost, S: SettingsStore>(host: &H, store: &S, command: Command) -> ActionResult {
    info!("Executing {}", command.action());
    match execute(host, store, command).await {
        Ok(()) => {
            info!("{} completed", command.action());
            ActionResult::ok(command.success_message())
        }
        Err(e) => {
            error!("Error handling {}: {}", command.action(), e);
            ActionResult::failed(e.to_string())
        }
    }
}

async fn execute<H: TabHost, S: SettingsStore>(host: &H, store: &S, command: Command) -> Result<(), HostError> {
    match command {
        Command::GroupByDomain => {
            let settings = load_settings_or_default(store).await;
            group_all_tabs_by_domain(host, &settings).await?;
            collapse_all_groups(host).await?;
        }
        Command::UngroupAll => {
            ungroup_all_tabs(host).await?;
            collapse_all_groups(host).await?;
        }
        Command::ExpandAll => {
            expand_all_groups(host).await?;
        }
        Command::CollapseAll => {
            collapse_all_groups(host).await?;
        }
        Command::RemoveDuplicates => {
            remove_duplicate_tabs(host).await?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Timeout: Background service not responding")]
pub struct TimedOut;

/// Race `request` against `timer`; the timer winning fails the request
///
/// Only the caller gives up. Whatever `request` was waiting on keeps
/// running on the other side.
pub async fn with_timeout<F, T>(request: F, timer: T) -> Result<F::Output, TimedOut>
where
    F: Future,
    T: Future<Output = ()>,
{
    let request = pin!(request);
    let timer = pin!(timer);
    match select(request, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(_) => Err(TimedOut),
    }
}
