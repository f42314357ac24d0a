/// User-defined grouping rules
use crate::color::ColorTag;
use crate::domain::parse_hostname;
use crate::tab_data::TabInfo;
use serde::{Deserialize, Serialize};

/// What part of a tab a rule looks at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleCondition {
    /// Full URL contains the value
    #[serde(alias = "url-contains")]
    Url,
    /// URL hostname contains the value
    #[serde(alias = "hostname-contains")]
    Hostname,
    /// Tab title contains the value
    #[serde(alias = "title-contains")]
    Title,
}

impl RuleCondition {
    pub const ALL: [RuleCondition; 3] = [RuleCondition::Url, RuleCondition::Hostname, RuleCondition::Title];

    pub fn key(self) -> &'static str {
        match self {
            RuleCondition::Url => "url",
            RuleCondition::Hostname => "hostname",
            RuleCondition::Title => "title",
        }
    }

    pub fn from_key(key: &str) -> Option<RuleCondition> {
        RuleCondition::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            RuleCondition::Url => "URL contains",
            RuleCondition::Hostname => "Hostname contains",
            RuleCondition::Title => "Title contains",
        }
    }
}

/// A user rule: tabs matching `condition`/`value` go to `group_name`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub enabled: bool,
    pub condition: RuleCondition,
    pub value: String,
    pub group_name: String,
    /// Stored as written; see `ColorTag::from_name`
    pub color: String,
}

impl Rule {
    pub fn new(condition: RuleCondition, value: &str, group_name: &str, color: ColorTag) -> Rule {
        Rule {
            enabled: true,
            condition,
            value: value.to_string(),
            group_name: group_name.to_string(),
            color: color.name().to_string(),
        }
    }

    /// Rule as shown when the user clicks "Add rule"
    pub fn blank() -> Rule {
        Rule::new(RuleCondition::Hostname, "", "New Group", ColorTag::Blue)
    }

    pub fn color_tag(&self) -> Option<ColorTag> {
        ColorTag::from_name(&self.color)
    }

    /// Whether the tab satisfies this rule's condition, ignoring `enabled`
    pub fn matches(&self, tab: &TabInfo) -> bool {
        match self.condition {
            RuleCondition::Url => tab
                .url
                .as_deref()
                .is_some_and(|url| url.contains(&self.value)),
            RuleCondition::Hostname => tab
                .url
                .as_deref()
                .and_then(parse_hostname)
                .is_some_and(|hostname| hostname.contains(&self.value)),
            RuleCondition::Title => tab
                .title
                .as_deref()
                .is_some_and(|title| title.contains(&self.value)),
        }
    }
}

/// First enabled rule that matches the tab, in list order
pub fn find_matching_rule<'a>(tab: &TabInfo, rules: &'a [Rule]) -> Option<&'a Rule> {
    rules.iter().filter(|rule| rule.enabled).find(|rule| rule.matches(tab))
}
