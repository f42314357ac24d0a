/// In-memory stand-ins for the browser, used by unit tests
use crate::color::ColorTag;
use crate::host::{HostError, TabHost};
use crate::settings::{SettingsStore, StoreError};
use crate::tab_data::{GroupId, GroupInfo, GroupUpdate, TabId, TabInfo, WindowId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

pub fn web_tab(id: TabId, url: &str) -> TabInfo {
    TabInfo::new(id, url, &format!("Tab {}", id))
}

#[derive(Default)]
struct FakeState {
    tabs: Vec<TabInfo>,
    groups: Vec<GroupInfo>,
    /// Listed by `query_tabs` but already closed for every other call
    ghosts: Vec<TabInfo>,
    next_group_id: GroupId,
    fail_grouping: bool,
    fail_window: bool,
    group_updates: usize,
    ungroups: usize,
    removals: Vec<Vec<TabId>>,
    sleeps: usize,
}

impl FakeState {
    fn tab_mut(&mut self, tab_id: TabId) -> Result<&mut TabInfo, HostError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab_id)
            .ok_or(HostError::TabNotFound(tab_id))
    }

    /// Groups only exist while they have tabs
    fn prune_groups(&mut self) {
        let tabs = &self.tabs;
        self.groups
            .retain(|g| tabs.iter().any(|t| t.group_id == Some(g.id)));
    }
}

/// A single browser window held in memory
#[derive(Default)]
pub struct FakeHost {
    state: RefCell<FakeState>,
}

impl FakeHost {
    pub fn with_tabs(tabs: Vec<TabInfo>) -> FakeHost {
        let host = FakeHost::default();
        {
            let mut state = host.state.borrow_mut();
            state.tabs = tabs;
            state.next_group_id = 100;
        }
        host
    }

    /// Create a group holding the given (existing) tabs
    pub fn add_group(&self, title: &str, color: ColorTag, collapsed: bool, tab_ids: &[TabId]) -> GroupId {
        let mut state = self.state.borrow_mut();
        let id = state.next_group_id;
        state.next_group_id += 1;
        state.groups.push(GroupInfo {
            id,
            title: title.to_string(),
            color,
            collapsed,
        });
        for tab in state.tabs.iter_mut().filter(|t| tab_ids.contains(&t.id)) {
            tab.group_id = Some(id);
        }
        id
    }

    /// A tab that shows up in listings but is closed before anything else
    /// can reach it
    pub fn add_ghost(&self, tab: TabInfo) {
        self.state.borrow_mut().ghosts.push(tab);
    }

    pub fn fail_grouping(&self) {
        self.state.borrow_mut().fail_grouping = true;
    }

    pub fn fail_window(&self) {
        self.state.borrow_mut().fail_window = true;
    }

    pub fn tabs(&self) -> Vec<TabInfo> {
        self.state.borrow().tabs.clone()
    }

    pub fn tab(&self, tab_id: TabId) -> Option<TabInfo> {
        self.state.borrow().tabs.iter().find(|t| t.id == tab_id).cloned()
    }

    pub fn groups(&self) -> Vec<GroupInfo> {
        self.state.borrow().groups.clone()
    }

    pub fn group_titled(&self, title: &str) -> Option<GroupInfo> {
        self.state.borrow().groups.iter().find(|g| g.title == title).cloned()
    }

    /// Tab ids in a group, in tab order
    pub fn members(&self, group_id: GroupId) -> Vec<TabId> {
        self.state
            .borrow()
            .tabs
            .iter()
            .filter(|t| t.group_id == Some(group_id))
            .map(|t| t.id)
            .collect()
    }

    pub fn group_updates(&self) -> usize {
        self.state.borrow().group_updates
    }

    pub fn ungroups(&self) -> usize {
        self.state.borrow().ungroups
    }

    pub fn removals(&self) -> Vec<Vec<TabId>> {
        self.state.borrow().removals.clone()
    }

    pub fn sleeps(&self) -> usize {
        self.state.borrow().sleeps
    }
}

impl TabHost for FakeHost {
    async fn current_window(&self) -> Result<WindowId, HostError> {
        if self.state.borrow().fail_window {
            return Err(HostError::Platform("no current window".to_string()));
        }
        Ok(1)
    }

    async fn query_tabs(&self, _window_id: WindowId) -> Result<Vec<TabInfo>, HostError> {
        let state = self.state.borrow();
        Ok(state.tabs.iter().chain(state.ghosts.iter()).cloned().collect())
    }

    async fn query_groups(&self, _window_id: WindowId) -> Result<Vec<GroupInfo>, HostError> {
        Ok(self.state.borrow().groups.clone())
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo, HostError> {
        self.tab(tab_id).ok_or(HostError::TabNotFound(tab_id))
    }

    async fn group_tabs(&self, tab_ids: &[TabId], group_id: Option<GroupId>) -> Result<GroupId, HostError> {
        let mut state = self.state.borrow_mut();
        if state.fail_grouping {
            return Err(HostError::Platform("grouping is not allowed".to_string()));
        }
        for &tab_id in tab_ids {
            state.tab_mut(tab_id)?;
        }

        let target = match group_id {
            Some(id) => {
                if !state.groups.iter().any(|g| g.id == id) {
                    return Err(HostError::GroupNotFound(id));
                }
                id
            }
            None => {
                let id = state.next_group_id;
                state.next_group_id += 1;
                state.groups.push(GroupInfo {
                    id,
                    title: String::new(),
                    color: ColorTag::Grey,
                    collapsed: false,
                });
                id
            }
        };

        for &tab_id in tab_ids {
            state.tab_mut(tab_id)?.group_id = Some(target);
        }
        state.prune_groups();
        Ok(target)
    }

    async fn ungroup_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.tab_mut(tab_id)?.group_id = None;
        state.ungroups += 1;
        state.prune_groups();
        Ok(())
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(HostError::GroupNotFound(group_id))?;

        if let Some(title) = &update.title {
            group.title = title.clone();
        }
        if let Some(color) = update.color {
            group.color = color;
        }
        if let Some(collapsed) = update.collapsed {
            group.collapsed = collapsed;
        }
        state.group_updates += 1;
        Ok(())
    }

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if let Some(&missing) = tab_ids.iter().find(|id| !state.tabs.iter().any(|t| t.id == **id)) {
            return Err(HostError::TabNotFound(missing));
        }
        state.tabs.retain(|t| !tab_ids.contains(&t.id));
        state.removals.push(tab_ids.to_vec());
        state.prune_groups();
        Ok(())
    }

    async fn sleep(&self, _duration: Duration) {
        self.state.borrow_mut().sleeps += 1;
    }
}

/// Settings storage held in a map
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn put(&self, key: &str, value: serde_json::Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }
}

impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.put(key, value);
        Ok(())
    }
}
