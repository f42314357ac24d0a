//! Deciding which group a tab belongs in, and putting it there
//!
//! A domain only gets a group once at least two eligible tabs share it. A
//! lone tab stays ungrouped until a sibling shows up; the sibling's own
//! grouping pass then gathers both.
//!
//! Settings are passed in already loaded. If they are saved while a pass is
//! suspended on a browser call, the pass finishes with the values it started
//! with.

use crate::color::ColorTag;
use crate::domain::{group_label, is_groupable_url, site_hostname};
use crate::host::{HostError, TabHost};
use crate::operations::{MUTATION_PAUSE, ungroup_all_tabs};
use crate::rules::find_matching_rule;
use crate::settings::{Settings, SettingsStore, load_settings_or_default};
use crate::tab_data::{GroupId, GroupUpdate, TabId, TabInfo};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::time::Duration;

/// Title and color of the group a tab should join
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTarget {
    pub title: String,
    /// `None` lets the browser choose (rule with an unrecognized color)
    pub color: Option<ColorTag>,
}

/// What happened to a tab handed to `group_tab`
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    /// Automatic grouping is switched off in settings
    AutoGroupOff,
    /// Missing or non-web URL
    Ineligible,
    /// No rule matched and domain grouping is off
    NoTarget,
    /// Closed before it could be grouped
    TabGone,
    JoinedExisting(GroupId),
    Created { group_id: GroupId, tab_ids: Vec<TabId> },
    /// No other tab shares the target yet
    LeftUngrouped,
    /// The browser refused; logged and otherwise ignored
    Failed(HostError),
}

/// Tabs sharing one domain label, in the order they were listed
#[derive(Debug, Clone, PartialEq)]
pub struct DomainBucket {
    pub label: String,
    pub tab_ids: Vec<TabId>,
    /// URL of the first tab, used to look up the domain color
    pub first_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingReport {
    pub groups_created: usize,
    pub tabs_grouped: usize,
}

/// Color for a domain group
///
/// The settings map is consulted by hostname (without "www.") and then by
/// group title. With no usable entry a palette color is picked at random,
/// so an unmapped domain may change color between regroups.
pub fn domain_color(settings: &Settings, url: &str, label: &str) -> ColorTag {
    site_hostname(url)
        .and_then(|hostname| settings.color_for(&hostname))
        .or_else(|| settings.color_for(label))
        .unwrap_or_else(ColorTag::random)
}

/// Where a tab should go: the first matching rule, else its domain
pub fn resolve_target(tab: &TabInfo, settings: &Settings) -> Option<GroupTarget> {
    let url = tab.url.as_deref().filter(|url| is_groupable_url(url))?;

    if let Some(rule) = find_matching_rule(tab, &settings.custom_rules) {
        if rule.color_tag().is_none() {
            warn!("Rule for '{}' has unknown color '{}'", rule.group_name, rule.color);
        }
        return Some(GroupTarget {
            title: rule.group_name.clone(),
            color: rule.color_tag(),
        });
    }

    if settings.group_by_domain {
        let label = group_label(url);
        let color = domain_color(settings, url, &label);
        return Some(GroupTarget {
            title: label,
            color: Some(color),
        });
    }

    None
}

/// Group a single tab according to the rules and domain settings
pub async fn group_tab<H: TabHost>(host: &H, settings: &Settings, tab: &TabInfo) -> GroupOutcome {
    if !is_groupable_url(tab.url_str()) {
        return GroupOutcome::Ineligible;
    }

    match resolve_target(tab, settings) {
        Some(target) => create_or_add_to_group(host, tab, &target).await,
        None => GroupOutcome::NoTarget,
    }
}

/// Group a tab the browser just reported as created or navigated
///
/// Does nothing unless `autoGroup` is on. With a `settle` delay the tab is
/// fetched again after waiting, since a new tab usually has no URL until it
/// starts loading.
pub async fn auto_group_tab<H: TabHost, S: SettingsStore>(
    host: &H,
    store: &S,
    tab: &TabInfo,
    settle: Option<Duration>,
) -> GroupOutcome {
    let settings = load_settings_or_default(store).await;
    if !settings.auto_group {
        return GroupOutcome::AutoGroupOff;
    }

    let Some(delay) = settle else {
        return group_tab(host, &settings, tab).await;
    };

    host.sleep(delay).await;
    match host.get_tab(tab.id).await {
        Ok(current) => group_tab(host, &settings, &current).await,
        Err(e) => {
            warn!("Tab {} closed before it could be grouped: {}", tab.id, e);
            GroupOutcome::TabGone
        }
    }
}

/// Put a tab into the group named by `target`
///
/// An existing group with that title in the current window is joined. If
/// there is none, a new group is made only when other ungrouped tabs in the
/// window have the target title as their domain label; they are all placed
/// in it together with `tab`. Browser failures are logged, never returned.
pub async fn create_or_add_to_group<H: TabHost>(host: &H, tab: &TabInfo, target: &GroupTarget) -> GroupOutcome {
    if let Err(e) = host.get_tab(tab.id).await {
        warn!("Tab {} no longer exists, skipping grouping: {}", tab.id, e);
        return GroupOutcome::TabGone;
    }

    match place_tab(host, tab, target).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Error grouping tab {} into '{}': {}", tab.id, target.title, e);
            GroupOutcome::Failed(e)
        }
    }
}

async fn place_tab<H: TabHost>(host: &H, tab: &TabInfo, target: &GroupTarget) -> Result<GroupOutcome, HostError> {
    let window_id = host.current_window().await?;

    let groups = host.query_groups(window_id).await?;
    if let Some(existing) = groups.iter().find(|g| g.title == target.title) {
        host.group_tabs(&[tab.id], Some(existing.id)).await?;
        debug!("Tab {} joined group '{}'", tab.id, target.title);
        return Ok(GroupOutcome::JoinedExisting(existing.id));
    }

    let window_tabs = host.query_tabs(window_id).await?;
    let siblings = ungrouped_siblings(&window_tabs, tab.id, &target.title);
    if siblings.is_empty() {
        debug!("Tab {} is alone under '{}', leaving it ungrouped", tab.id, target.title);
        return Ok(GroupOutcome::LeftUngrouped);
    }

    let mut tab_ids = Vec::with_capacity(siblings.len() + 1);
    tab_ids.push(tab.id);
    tab_ids.extend(siblings);

    let group_id = host.group_tabs(&tab_ids, None).await?;
    host.update_group(group_id, &GroupUpdate::titled(&target.title, target.color))
        .await?;
    info!("Created group '{}' with {} tabs", target.title, tab_ids.len());

    Ok(GroupOutcome::Created { group_id, tab_ids })
}

/// Other ungrouped web tabs whose domain label equals `title`
fn ungrouped_siblings(tabs: &[TabInfo], tab_id: TabId, title: &str) -> Vec<TabId> {
    tabs.iter()
        .filter(|t| t.id != tab_id && !t.is_grouped())
        .filter(|t| is_groupable_url(t.url_str()))
        .filter(|t| group_label(t.url_str()) == title)
        .map(|t| t.id)
        .collect()
}

/// Bucket web tabs by domain label, keeping first-seen order
pub fn bucket_by_domain(tabs: &[TabInfo]) -> Vec<DomainBucket> {
    let mut buckets: Vec<DomainBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tab in tabs.iter().filter(|t| is_groupable_url(t.url_str())) {
        let url = tab.url_str();
        let label = group_label(url);
        match index.get(&label) {
            Some(&i) => buckets[i].tab_ids.push(tab.id),
            None => {
                index.insert(label.clone(), buckets.len());
                buckets.push(DomainBucket {
                    label,
                    tab_ids: vec![tab.id],
                    first_url: url.to_string(),
                });
            }
        }
    }

    buckets
}

/// Regroup the whole window by domain
///
/// Every tab is ungrouped first so no stale or duplicate group titles
/// survive. Then each domain with two or more web tabs gets one new group.
/// Custom rules are not consulted here.
pub async fn group_all_tabs_by_domain<H: TabHost>(host: &H, settings: &Settings) -> Result<GroupingReport, HostError> {
    let window_id = host.current_window().await?;
    let listed = host.query_tabs(window_id).await?;

    ungroup_all_tabs(host).await?;

    let mut tabs = Vec::with_capacity(listed.len());
    for tab in listed {
        match host.get_tab(tab.id).await {
            Ok(_) => tabs.push(tab),
            Err(e) => warn!("Tab {} no longer exists, skipping: {}", tab.id, e),
        }
    }

    let mut report = GroupingReport::default();
    for bucket in bucket_by_domain(&tabs).into_iter().filter(|b| b.tab_ids.len() >= 2) {
        let color = domain_color(settings, &bucket.first_url, &bucket.label);
        match create_domain_group(host, &bucket, color).await {
            Ok(_) => {
                report.groups_created += 1;
                report.tabs_grouped += bucket.tab_ids.len();
            }
            Err(e) => warn!("Error grouping tabs for domain '{}': {}", bucket.label, e),
        }
        host.sleep(MUTATION_PAUSE).await;
    }

    info!(
        "Grouped {} tabs into {} domain groups",
        report.tabs_grouped, report.groups_created
    );
    Ok(report)
}

async fn create_domain_group<H: TabHost>(host: &H, bucket: &DomainBucket, color: ColorTag) -> Result<GroupId, HostError> {
    let group_id = host.group_tabs(&bucket.tab_ids, None).await?;
    host.update_group(group_id, &GroupUpdate::titled(&bucket.label, Some(color)))
        .await?;
    Ok(group_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, RuleCondition};
    use crate::settings::SETTINGS_KEY;
    use crate::testing::{FakeHost, MemoryStore, web_tab};
    use futures::executor::block_on;

    fn domain_only() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_resolve_target_prefers_rules() {
        let mut settings = domain_only();
        settings.add_rule(Rule::new(RuleCondition::Hostname, "github.com", "Code", ColorTag::Green));

        let target = resolve_target(&web_tab(1, "https://github.com/rust-lang"), &settings).unwrap();

        assert_eq!(target, GroupTarget { title: "Code".to_string(), color: Some(ColorTag::Green) });
    }

    #[test]
    fn test_resolve_target_by_domain_uses_mapped_color() {
        let settings = domain_only();

        let target = resolve_target(&web_tab(1, "https://www.github.com/rust-lang"), &settings).unwrap();

        assert_eq!(target.title, "GitHub");
        assert_eq!(target.color, Some(ColorTag::Purple));
    }

    #[test]
    fn test_resolve_target_color_by_label() {
        let mut settings = domain_only();
        settings.colors.clear();
        settings.set_domain_color("Docs", ColorTag::Yellow);

        let target = resolve_target(&web_tab(1, "https://docs.rs/serde"), &settings).unwrap();

        assert_eq!(target.color, Some(ColorTag::Yellow));
    }

    #[test]
    fn test_resolve_target_without_domain_grouping() {
        let mut settings = domain_only();
        settings.group_by_domain = false;

        assert_eq!(resolve_target(&web_tab(1, "https://github.com"), &settings), None);
    }

    #[test]
    fn test_resolve_target_skips_internal_pages() {
        let settings = domain_only();
        assert_eq!(resolve_target(&web_tab(1, "chrome://settings"), &settings), None);

        let mut blank = web_tab(2, "");
        blank.url = None;
        assert_eq!(resolve_target(&blank, &settings), None);
    }

    #[test]
    fn test_rule_with_unknown_color_leaves_color_to_browser() {
        let mut settings = domain_only();
        let mut rule = Rule::new(RuleCondition::Url, "example", "Example", ColorTag::Red);
        rule.color = "magenta".to_string();
        settings.add_rule(rule);

        let target = resolve_target(&web_tab(1, "https://example.com"), &settings).unwrap();
        assert_eq!(target.color, None);
    }

    #[test]
    fn test_lone_tab_stays_ungrouped() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://docs.rs"),
        ]);

        let outcome = block_on(group_tab(&host, &domain_only(), &web_tab(1, "https://github.com/a")));

        assert_eq!(outcome, GroupOutcome::LeftUngrouped);
        assert!(host.groups().is_empty());
    }

    #[test]
    fn test_second_tab_creates_group_with_sibling() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://docs.rs"),
            web_tab(3, "https://www.github.com/b"),
        ]);

        let outcome = block_on(group_tab(&host, &domain_only(), &web_tab(3, "https://www.github.com/b")));

        let group = host.group_titled("GitHub").unwrap();
        assert_eq!(outcome, GroupOutcome::Created { group_id: group.id, tab_ids: vec![3, 1] });
        assert_eq!(group.color, ColorTag::Purple);
        assert_eq!(host.members(group.id), vec![1, 3]);
        assert_eq!(host.tab(2).unwrap().group_id, None);
    }

    #[test]
    fn test_third_tab_joins_existing_group() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://github.com/b"),
            web_tab(3, "https://github.com/c"),
        ]);
        let group_id = host.add_group("GitHub", ColorTag::Purple, false, &[1, 2]);

        let outcome = block_on(group_tab(&host, &domain_only(), &web_tab(3, "https://github.com/c")));

        assert_eq!(outcome, GroupOutcome::JoinedExisting(group_id));
        assert_eq!(host.members(group_id), vec![1, 2, 3]);
    }

    #[test]
    fn test_siblings_already_grouped_do_not_count() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://github.com/b"),
        ]);
        host.add_group("Work", ColorTag::Red, false, &[1]);

        let outcome = block_on(group_tab(&host, &domain_only(), &web_tab(2, "https://github.com/b")));

        assert_eq!(outcome, GroupOutcome::LeftUngrouped);
    }

    #[test]
    fn test_internal_pages_never_join_a_group() {
        // The rule's group name is also the internal page's domain label
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://example.com/settings"),
            web_tab(2, "chrome://settings"),
        ]);
        let mut settings = domain_only();
        settings.add_rule(Rule::new(RuleCondition::Url, "settings", "Settings", ColorTag::Grey));

        let internal = block_on(group_tab(&host, &settings, &web_tab(2, "chrome://settings")));
        let web = block_on(group_tab(&host, &settings, &web_tab(1, "https://example.com/settings")));

        assert_eq!(internal, GroupOutcome::Ineligible);
        assert_eq!(web, GroupOutcome::LeftUngrouped);
        assert!(host.groups().is_empty());
    }

    #[test]
    fn test_closed_tab_is_a_no_op() {
        let host = FakeHost::with_tabs(vec![web_tab(1, "https://github.com/a")]);

        let outcome = block_on(group_tab(&host, &domain_only(), &web_tab(2, "https://github.com/b")));

        assert_eq!(outcome, GroupOutcome::TabGone);
    }

    #[test]
    fn test_browser_failure_is_swallowed() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://github.com/b"),
        ]);
        host.fail_grouping();

        let outcome = block_on(group_tab(&host, &domain_only(), &web_tab(2, "https://github.com/b")));

        assert!(matches!(outcome, GroupOutcome::Failed(HostError::Platform(_))));
        assert!(host.groups().is_empty());
    }

    #[test]
    fn test_no_target_when_nothing_applies() {
        let host = FakeHost::with_tabs(vec![web_tab(1, "https://github.com/a")]);
        let mut settings = domain_only();
        settings.group_by_domain = false;

        let outcome = block_on(group_tab(&host, &settings, &web_tab(1, "https://github.com/a")));

        assert_eq!(outcome, GroupOutcome::NoTarget);
    }

    #[test]
    fn test_bucket_by_domain() {
        let tabs = vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://docs.rs"),
            web_tab(3, "chrome://newtab"),
            web_tab(4, "https://www.github.com/b"),
            web_tab(5, "https://my-site.io"),
        ];

        let buckets = bucket_by_domain(&tabs);

        let summary: Vec<(&str, Vec<TabId>)> = buckets
            .iter()
            .map(|b| (b.label.as_str(), b.tab_ids.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![("GitHub", vec![1, 4]), ("Docs", vec![2]), ("My Site", vec![5])]
        );
        assert_eq!(buckets[0].first_url, "https://github.com/a");
    }

    #[test]
    fn test_group_all_tabs_by_domain() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://reddit.com/r/rust"),
            web_tab(3, "https://github.com/b"),
            web_tab(4, "https://docs.rs"),
            web_tab(5, "https://www.reddit.com/r/programming"),
            web_tab(6, "chrome://extensions"),
            web_tab(7, "chrome://settings"),
        ]);
        // A stale group is cleared before regrouping
        host.add_group("Old", ColorTag::Cyan, true, &[1, 4]);

        let report = block_on(group_all_tabs_by_domain(&host, &domain_only())).unwrap();

        assert_eq!(report, GroupingReport { groups_created: 2, tabs_grouped: 4 });
        assert!(host.group_titled("Old").is_none());

        let github = host.group_titled("GitHub").unwrap();
        assert_eq!(host.members(github.id), vec![1, 3]);
        assert_eq!(github.color, ColorTag::Purple);

        let reddit = host.group_titled("Reddit").unwrap();
        assert_eq!(host.members(reddit.id), vec![2, 5]);
        assert_eq!(reddit.color, ColorTag::Orange);

        for lone in [4, 6, 7] {
            assert_eq!(host.tab(lone).unwrap().group_id, None);
        }
    }

    #[test]
    fn test_group_all_never_creates_single_tab_groups() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://a.com"),
            web_tab(2, "https://b.com"),
            web_tab(3, "https://c.com"),
        ]);

        let report = block_on(group_all_tabs_by_domain(&host, &domain_only())).unwrap();

        assert_eq!(report, GroupingReport::default());
        assert!(host.groups().is_empty());
    }

    #[test]
    fn test_group_all_skips_closed_tabs() {
        let host = FakeHost::with_tabs(vec![web_tab(1, "https://github.com/a")]);
        host.add_ghost(web_tab(2, "https://github.com/b"));

        let report = block_on(group_all_tabs_by_domain(&host, &domain_only())).unwrap();

        assert_eq!(report.groups_created, 0);
        assert!(host.groups().is_empty());
    }

    #[test]
    fn test_group_all_continues_after_failure() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://github.com/b"),
        ]);
        host.fail_grouping();

        let report = block_on(group_all_tabs_by_domain(&host, &domain_only())).unwrap();

        assert_eq!(report, GroupingReport::default());
        assert_eq!(host.sleeps(), 1);
    }

    #[test]
    fn test_auto_group_off_leaves_tabs_alone() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://github.com/b"),
        ]);
        let store = MemoryStore::default();
        store.put(SETTINGS_KEY, serde_json::json!({"autoGroup": false}));

        let created = block_on(auto_group_tab(&host, &store, &web_tab(2, ""), Some(Duration::from_secs(1))));
        let updated = block_on(auto_group_tab(&host, &store, &web_tab(2, "https://github.com/b"), None));

        assert_eq!(created, GroupOutcome::AutoGroupOff);
        assert_eq!(updated, GroupOutcome::AutoGroupOff);
        assert!(host.groups().is_empty());
        assert_eq!(host.sleeps(), 0);
    }

    #[test]
    fn test_new_tab_is_grouped_by_its_loaded_url() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://github.com/a"),
            web_tab(2, "https://github.com/b"),
        ]);
        let store = MemoryStore::default();

        // Reported at creation with no URL yet
        let outcome = block_on(auto_group_tab(&host, &store, &web_tab(2, ""), Some(Duration::from_secs(1))));

        let group = host.group_titled("GitHub").unwrap();
        assert_eq!(outcome, GroupOutcome::Created { group_id: group.id, tab_ids: vec![2, 1] });
        assert_eq!(host.sleeps(), 1);
    }

    #[test]
    fn test_new_tab_closed_while_settling_is_a_no_op() {
        let host = FakeHost::with_tabs(vec![web_tab(1, "https://github.com/a")]);
        let store = MemoryStore::default();

        let outcome = block_on(auto_group_tab(
            &host,
            &store,
            &web_tab(9, "https://github.com/b"),
            Some(Duration::from_secs(1)),
        ));

        assert_eq!(outcome, GroupOutcome::TabGone);
        assert!(host.groups().is_empty());
    }

    #[test]
    fn test_navigated_tab_is_grouped_without_waiting() {
        let host = FakeHost::with_tabs(vec![
            web_tab(1, "https://reddit.com/r/rust"),
            web_tab(2, "https://www.reddit.com/r/programming"),
        ]);
        let store = MemoryStore::default();

        let outcome = block_on(auto_group_tab(&host, &store, &web_tab(2, "https://www.reddit.com/r/programming"), None));

        assert!(matches!(outcome, GroupOutcome::Created { .. }));
        assert_eq!(host.sleeps(), 0);
        assert_eq!(host.group_titled("Reddit").unwrap().color, ColorTag::Orange);
    }
}
