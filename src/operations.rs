/// Bulk tab operations: ungroup, expand, collapse, remove duplicates
///
/// Each operation lists the window once and then works through that
/// snapshot. Tabs and groups that disappear part way through are logged
/// and skipped; one failing item never stops the rest of the pass.
use crate::host::{HostError, TabHost};
use crate::tab_data::{GroupUpdate, TabId, TabInfo};
use log::{debug, warn};
use std::collections::HashSet;
use std::time::Duration;

/// Pause after each browser mutation in a bulk pass
pub const MUTATION_PAUSE: Duration = Duration::from_millis(50);

/// Take every tab in the current window out of its group
///
/// Returns the number of tabs ungrouped.
pub async fn ungroup_all_tabs<H: TabHost>(host: &H) -> Result<usize, HostError> {
    let window_id = host.current_window().await?;
    let tabs = host.query_tabs(window_id).await?;
    let mut ungrouped = 0;

    for tab in tabs.iter().filter(|t| t.is_grouped()) {
        if let Err(e) = host.get_tab(tab.id).await {
            warn!("Tab {} no longer exists, skipping ungrouping: {}", tab.id, e);
            continue;
        }

        match host.ungroup_tab(tab.id).await {
            Ok(()) => ungrouped += 1,
            Err(e) => warn!("Could not ungroup tab {}: {}", tab.id, e),
        }
        host.sleep(MUTATION_PAUSE).await;
    }

    debug!("Ungrouped {} tabs", ungrouped);
    Ok(ungrouped)
}

pub async fn expand_all_groups<H: TabHost>(host: &H) -> Result<usize, HostError> {
    set_all_collapsed(host, false).await
}

pub async fn collapse_all_groups<H: TabHost>(host: &H) -> Result<usize, HostError> {
    set_all_collapsed(host, true).await
}

/// Bring every group in the current window to the given collapsed state
///
/// Groups already in that state are not touched, so running this twice
/// changes nothing the second time. Returns the number of groups updated.
pub async fn set_all_collapsed<H: TabHost>(host: &H, collapsed: bool) -> Result<usize, HostError> {
    let window_id = host.current_window().await?;
    let groups = host.query_groups(window_id).await?;
    let update = GroupUpdate::collapsed(collapsed);
    let mut changed = 0;

    for group in groups.iter().filter(|g| g.collapsed != collapsed) {
        match host.update_group(group.id, &update).await {
            Ok(()) => changed += 1,
            Err(e) => warn!("Could not update group {}: {}", group.id, e),
        }
        host.sleep(MUTATION_PAUSE).await;
    }

    Ok(changed)
}

/// Ids of tabs whose URL repeats an earlier tab
///
/// The first tab with a given URL is kept. Tabs without a URL are always
/// kept: a missing URL is not considered equal to anything.
pub fn duplicate_tab_ids(tabs: &[TabInfo]) -> Vec<TabId> {
    let mut seen_urls = HashSet::new();
    let mut remove_ids = Vec::new();

    for tab in tabs {
        match tab.url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) if !seen_urls.insert(url) => remove_ids.push(tab.id),
            _ => {}
        }
    }

    remove_ids
}

/// Close later tabs whose URL repeats an earlier tab in the window
///
/// Duplicates are closed in a single call. Returns how many were closed.
pub async fn remove_duplicate_tabs<H: TabHost>(host: &H) -> Result<usize, HostError> {
    let window_id = host.current_window().await?;
    let listed = host.query_tabs(window_id).await?;

    let mut tabs = Vec::with_capacity(listed.len());
    for tab in listed {
        match host.get_tab(tab.id).await {
            Ok(_) => tabs.push(tab),
            Err(e) => warn!("Tab {} no longer exists, skipping duplicate check: {}", tab.id, e),
        }
    }

    let remove_ids = duplicate_tab_ids(&tabs);
    if !remove_ids.is_empty() {
        host.remove_tabs(&remove_ids).await?;
    }

    debug!("Removed {} duplicate tabs", remove_ids.len());
    Ok(remove_ids.len())
}
