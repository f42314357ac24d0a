/// The browser's tab and tab-group API, as seen by the grouping logic
use crate::tab_data::{GroupId, GroupInfo, GroupUpdate, TabId, TabInfo, WindowId};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("tab {0} no longer exists")]
    TabNotFound(TabId),
    #[error("group {0} no longer exists")]
    GroupNotFound(GroupId),
    #[error("{0}")]
    Platform(String),
}

/// Tab and group operations provided by the browser
///
/// Every call may fail because the tab or group it refers to was closed
/// after it was listed. Callers decide whether that is worth reporting.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    async fn current_window(&self) -> Result<WindowId, HostError>;

    async fn query_tabs(&self, window_id: WindowId) -> Result<Vec<TabInfo>, HostError>;

    async fn query_groups(&self, window_id: WindowId) -> Result<Vec<GroupInfo>, HostError>;

    /// Fails with `TabNotFound` once the tab is closed
    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo, HostError>;

    /// Put tabs into `group_id`, or into a new group when `None`
    async fn group_tabs(&self, tab_ids: &[TabId], group_id: Option<GroupId>) -> Result<GroupId, HostError>;

    async fn ungroup_tab(&self, tab_id: TabId) -> Result<(), HostError>;

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError>;

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), HostError>;

    /// Pause between mutations so bulk operations don't flood the browser
    async fn sleep(&self, duration: Duration);
}
