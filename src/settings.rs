//! Persisted settings and the storage they live in
//!
//! Settings are read once at the start of each operation and handed to it
//! by reference. An operation that overlaps a save keeps using the copy it
//! loaded; the next operation sees the new values.
use crate::color::ColorTag;
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Storage key of the settings record
pub const SETTINGS_KEY: &str = "tabGroupSettings";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("malformed settings: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Key-value storage for extension settings
///
/// There is no compare-and-swap: callers load, modify and save the whole
/// record, and the last write wins.
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
}

/// Extension settings
///
/// Missing fields in a stored record take their default values, so older
/// records load without migration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Group new and navigated tabs automatically
    pub auto_group: bool,
    /// Fall back to grouping by domain when no rule matches
    pub group_by_domain: bool,
    pub custom_rules: Vec<Rule>,
    /// Domain (or group title) → color name
    pub colors: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        let colors = [
            ("github.com", ColorTag::Purple),
            ("google.com", ColorTag::Blue),
            ("notion.so", ColorTag::Red),
            ("stackoverflow.com", ColorTag::Orange),
            ("youtube.com", ColorTag::Pink),
            ("twitter.com", ColorTag::Cyan),
            ("facebook.com", ColorTag::Blue),
            ("linkedin.com", ColorTag::Blue),
            ("reddit.com", ColorTag::Orange),
        ]
        .into_iter()
        .map(|(domain, color)| (domain.to_string(), color.name().to_string()))
        .collect();

        Settings {
            auto_group: true,
            group_by_domain: true,
            custom_rules: Vec::new(),
            colors,
        }
    }
}

impl Settings {
    /// Merge a stored record onto the defaults
    pub fn from_stored(value: serde_json::Value) -> Result<Settings, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Explicit color for a domain key, if one is set and is a known color
    pub fn color_for(&self, key: &str) -> Option<ColorTag> {
        self.colors.get(key).and_then(|name| ColorTag::from_name(name))
    }

    pub fn set_domain_color(&mut self, domain: &str, color: ColorTag) {
        self.colors.insert(domain.to_string(), color.name().to_string());
    }

    pub fn remove_domain_color(&mut self, domain: &str) -> bool {
        self.colors.remove(domain).is_some()
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.custom_rules.push(rule);
    }

    pub fn update_rule(&mut self, index: usize, rule: Rule) -> bool {
        self.custom_rules
            .get_mut(index)
            .map(|existing| {
                *existing = rule;
            })
            .is_some()
    }

    pub fn remove_rule(&mut self, index: usize) -> bool {
        if index < self.custom_rules.len() {
            self.custom_rules.remove(index);
            true
        } else {
            false
        }
    }
}

/// Load settings, merged onto defaults. An absent record gives the defaults.
pub async fn load_settings<S: SettingsStore>(store: &S) -> Result<Settings, StoreError> {
    match store.get(SETTINGS_KEY).await? {
        Some(serde_json::Value::Null) | None => Ok(Settings::default()),
        Some(value) => Settings::from_stored(value),
    }
}

/// Load settings, falling back to defaults when storage fails
pub async fn load_settings_or_default<S: SettingsStore>(store: &S) -> Settings {
    match load_settings(store).await {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Using default settings: {}", e);
            Settings::default()
        }
    }
}

/// Overwrite the stored record with `settings`
pub async fn save_settings<S: SettingsStore>(store: &S, settings: &Settings) -> Result<(), StoreError> {
    let value = serde_json::to_value(settings)?;
    store.set(SETTINGS_KEY, value).await
}

/// Write the defaults on first run. Returns true if it did.
pub async fn ensure_initialized<S: SettingsStore>(store: &S) -> Result<bool, StoreError> {
    match store.get(SETTINGS_KEY).await? {
        Some(value) if !value.is_null() => Ok(false),
        _ => {
            save_settings(store, &Settings::default()).await?;
            log::info!("Stored default settings");
            Ok(true)
        }
    }
}
