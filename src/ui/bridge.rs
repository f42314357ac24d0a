/// chrome.* calls made from the extension pages
use crate::background::{js_error_message, to_js};
use crate::command::{ActionResult, Command, Message, REQUEST_TIMEOUT, with_timeout};
use crate::settings::{SettingsStore, StoreError};
use std::time::Duration;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/ui.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sleepMs(ms: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn countAllTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn openOptionsPage() -> Result<(), JsValue>;
}

pub async fn sleep(duration: Duration) {
    if let Err(e) = sleepMs(duration.as_millis() as u32).await {
        log::warn!("Timer failed: {}", js_error_message(&e));
    }
}

/// Send a command to the background worker and wait for its answer
///
/// Gives up after `REQUEST_TIMEOUT`. The worker may still finish the
/// command; only this page stops waiting.
pub async fn send_command(command: Command) -> Result<ActionResult, String> {
    let message = to_js(&Message::from(command))?;

    let response = with_timeout(sendMessage(message), sleep(REQUEST_TIMEOUT))
        .await
        .map_err(|e| e.to_string())?;
    read_response(response)
}

/// Send a command and wait for however long the worker needs
///
/// For multi-step work where giving up half way would leave the window in
/// an intermediate state.
pub async fn send_command_untimed(command: Command) -> Result<ActionResult, String> {
    let message = to_js(&Message::from(command))?;
    read_response(sendMessage(message).await)
}

fn read_response(response: Result<JsValue, JsValue>) -> Result<ActionResult, String> {
    let response = response.map_err(|e| format!("Error: {}", js_error_message(&e)))?;

    if response.is_null() || response.is_undefined() {
        return Err("No response from background service".to_string());
    }

    serde_wasm_bindgen::from_value(response).map_err(|e| format!("Failed to parse response: {}", e))
}

pub async fn count_all_tabs() -> Result<usize, String> {
    let count = countAllTabs()
        .await
        .map_err(|e| format!("Failed to count tabs: {}", js_error_message(&e)))?;
    tab_count(count.as_f64())
}

fn tab_count(value: Option<f64>) -> Result<usize, String> {
    match value {
        Some(count) if count.is_finite() && count >= 0.0 => Ok(count as usize),
        Some(count) => Err(format!("Failed to count tabs: invalid count {}", count)),
        None => Err("Failed to count tabs: browser returned no number".to_string()),
    }
}

pub async fn open_options_page() {
    if let Err(e) = openOptionsPage().await {
        log::error!("Could not open options: {}", js_error_message(&e));
    }
}

/// chrome.storage.sync, as seen from a page
pub struct PageStorage;

impl SettingsStore for PageStorage {
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
