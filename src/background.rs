/// Service worker entry points and the chrome.* bridge behind them
use crate::command::{Message, handle_message};
use crate::host::{HostError, TabHost};
use crate::policy::auto_group_tab;
use crate::settings::{SettingsStore, StoreError, ensure_initialized};
use crate::tab_data::{GroupId, GroupInfo, GroupUpdate, TabId, TabInfo, WindowId};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// How long a new tab gets to start loading before it is grouped
pub const NEW_TAB_SETTLE: Duration = Duration::from_millis(1000);

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getCurrentWindowId() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabs(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroups(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(tab_ids: JsValue, group_id: Option<i32>) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, update: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sleepMs(ms: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}

/// Readable text for an error thrown on the JS side
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => format!("{:?}", value),
    }
}

/// Serialize for chrome.* APIs: maps become plain objects
pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize: {}", e))
}

fn platform(e: JsValue) -> HostError {
    HostError::Platform(js_error_message(&e))
}

/// chrome.tabs / chrome.tabGroups / chrome.windows
pub struct ChromeHost;

impl TabHost for ChromeHost {
    async fn current_window(&self) -> Result<WindowId, HostError> {
        let id = getCurrentWindowId().await.map_err(platform)?;
        id.as_f64()
            .map(|id| id as WindowId)
            .ok_or_else(|| HostError::Platform("current window has no id".to_string()))
    }

    async fn query_tabs(&self, window_id: WindowId) -> Result<Vec<TabInfo>, HostError> {
        let tabs_js = queryTabs(window_id).await.map_err(platform)?;
        serde_wasm_bindgen::from_value(tabs_js)
            .map_err(|e| HostError::Platform(format!("Failed to parse tabs: {}", e)))
    }

    async fn query_groups(&self, window_id: WindowId) -> Result<Vec<GroupInfo>, HostError> {
        let groups_js = queryGroups(window_id).await.map_err(platform)?;
        serde_wasm_bindgen::from_value(groups_js)
            .map_err(|e| HostError::Platform(format!("Failed to parse groups: {}", e)))
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo, HostError> {
        let tab_js = getTab(tab_id)
            .await
            .map_err(|_| HostError::TabNotFound(tab_id))?;
        serde_wasm_bindgen::from_value(tab_js)
            .map_err(|e| HostError::Platform(format!("Failed to parse tab: {}", e)))
    }

    async fn group_tabs(&self, tab_ids: &[TabId], group_id: Option<GroupId>) -> Result<GroupId, HostError> {
        let ids_js = to_js(&tab_ids).map_err(HostError::Platform)?;
        let result = groupTabs(ids_js, group_id).await.map_err(|e| match group_id {
            Some(id) if js_error_message(&e).contains("No group with id") => HostError::GroupNotFound(id),
            _ => platform(e),
        })?;
        result
            .as_f64()
            .map(|id| id as GroupId)
            .ok_or_else(|| HostError::Platform("grouping returned no group id".to_string()))
    }

    async fn ungroup_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        ungroupTab(tab_id).await.map_err(platform)
    }

    async fn update_group(&self, group_id: GroupId, update: &GroupUpdate) -> Result<(), HostError> {
        let update_js = to_js(update).map_err(HostError::Platform)?;
        updateGroup(group_id, update_js).await.map_err(|e| {
            if js_error_message(&e).contains("No group with id") {
                HostError::GroupNotFound(group_id)
            } else {
                platform(e)
            }
        })
    }

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), HostError> {
        let ids_js = to_js(&tab_ids).map_err(HostError::Platform)?;
        removeTabs(ids_js).await.map_err(platform)
    }

    async fn sleep(&self, duration: Duration) {
        if let Err(e) = sleepMs(duration.as_millis() as u32).await {
            warn!("Timer failed: {}", js_error_message(&e));
        }
    }
}

/// chrome.storage.sync
pub struct SyncStorage;

impl SettingsStore for SyncStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let value_js = getStorage(key)
            .await
            .map_err(|e| StoreError::Unavailable(js_error_message(&e)))?;

        if value_js.is_null() || value_js.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value_js)
            .map(Some)
            .map_err(|e| StoreError::Unavailable(format!("Failed to parse storage: {}", e)))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let value_js = to_js(&value).map_err(StoreError::Unavailable)?;
        setStorage(key, value_js)
            .await
            .map_err(|e| StoreError::Unavailable(js_error_message(&e)))
    }
}

fn parse_tab(tab: JsValue) -> Result<TabInfo, JsValue> {
    serde_wasm_bindgen::from_value(tab).map_err(|e| JsValue::from_str(&format!("Failed to parse tab: {}", e)))
}

/// Store default settings on first run
#[wasm_bindgen]
pub async fn initialize_background() -> Result<(), JsValue> {
    match ensure_initialized(&SyncStorage).await {
        Ok(true) => info!("Tab Forge installed with default settings"),
        Ok(false) => info!("Tab Forge service worker started"),
        Err(e) => error!("Could not initialize settings: {}", e),
    }
    Ok(())
}

/// chrome.tabs.onCreated
#[wasm_bindgen]
pub async fn on_tab_created(tab: JsValue) -> Result<(), JsValue> {
    let tab = parse_tab(tab)?;
    let outcome = auto_group_tab(&ChromeHost, &SyncStorage, &tab, Some(NEW_TAB_SETTLE)).await;
    debug!("New tab {}: {:?}", tab.id, outcome);
    Ok(())
}

/// chrome.tabs.onUpdated, called only when the URL changed
#[wasm_bindgen]
pub async fn on_tab_updated(tab: JsValue) -> Result<(), JsValue> {
    let tab = parse_tab(tab)?;
    let outcome = auto_group_tab(&ChromeHost, &SyncStorage, &tab, None).await;
    debug!("Updated tab {}: {:?}", tab.id, outcome);
    Ok(())
}

/// chrome.runtime.onMessage
#[wasm_bindgen]
pub async fn handle_runtime_message(message: JsValue) -> Result<JsValue, JsValue> {
    let message: Message = serde_wasm_bindgen::from_value(message).unwrap_or_else(|e| {
        warn!("Unreadable message: {}", e);
        Message::default()
    });

    let result = handle_message(&ChromeHost, &SyncStorage, &message).await;
    to_js(&result).map_err(|e| JsValue::from_str(&e))
}
