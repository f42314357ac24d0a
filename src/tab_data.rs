/// Data structures for Tab Forge
use crate::color::ColorTag;
use serde::{Deserialize, Serialize};

pub type TabId = i32;
pub type GroupId = i32;
pub type WindowId = i32;

/// Snapshot of a browser tab
///
/// The browser owns tabs; this is a copy taken when the tabs were listed and
/// may already be stale by the time it is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl TabInfo {
    pub fn new(id: TabId, url: &str, title: &str) -> TabInfo {
        TabInfo {
            id,
            url: Some(url.to_string()),
            title: Some(title.to_string()),
            group_id: None,
        }
    }

    pub fn url_str(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }
}

/// Snapshot of a tab group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: GroupId,
    #[serde(default)]
    pub title: String,
    pub color: ColorTag,
    #[serde(default)]
    pub collapsed: bool,
}

/// Properties to change on a tab group; `None` leaves a property as is
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

impl GroupUpdate {
    pub fn titled(title: &str, color: Option<ColorTag>) -> GroupUpdate {
        GroupUpdate {
            title: Some(title.to_string()),
            color,
            collapsed: None,
        }
    }

    pub fn collapsed(collapsed: bool) -> GroupUpdate {
        GroupUpdate {
            collapsed: Some(collapsed),
            ..GroupUpdate::default()
        }
    }
}
