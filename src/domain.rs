/// Domain label extraction for Tab Forge
use url::Url;

/// Label used when a URL has no usable hostname
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Hostnames with a preferred display name
const FRIENDLY_NAMES: &[(&str, &str)] = &[
    ("chatgpt.com", "ChatGPT"),
    ("openai.com", "OpenAI"),
    ("github.com", "GitHub"),
    ("google.com", "Google"),
    ("youtube.com", "YouTube"),
    ("facebook.com", "Facebook"),
    ("instagram.com", "Instagram"),
    ("twitter.com", "Twitter"),
    ("linkedin.com", "LinkedIn"),
    ("reddit.com", "Reddit"),
    ("stackoverflow.com", "Stack Overflow"),
    ("gmail.com", "Gmail"),
    ("outlook.com", "Outlook"),
    ("notion.so", "Notion"),
    ("figma.com", "Figma"),
    ("slack.com", "Slack"),
    ("discord.com", "Discord"),
    ("zoom.us", "Zoom"),
    ("microsoft.com", "Microsoft"),
    ("amazon.com", "Amazon"),
    ("netflix.com", "Netflix"),
    ("spotify.com", "Spotify"),
];

/// Turn a URL into the title of the group it belongs to
///
/// Algorithm:
/// 1. Parse URL and take its hostname
/// 2. Strip a leading "www."
/// 3. If the hostname has a friendly name, return it
/// 4. Else take the part before the first ".", split on "-",
///    capitalize each word and join with spaces
///
/// Examples:
/// - https://www.github.com/rust-lang → GitHub
/// - https://my-cool-site.io/about → My Cool Site
/// - https://docs.rs/serde → Docs
/// - not a url → Unknown
pub fn group_label(url: &str) -> String {
    match site_hostname(url) {
        Some(hostname) => label_for_hostname(&hostname),
        None => UNKNOWN_LABEL.to_string(),
    }
}

/// Hostname of a URL exactly as the URL parser reports it
pub fn parse_hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Hostname with any leading "www." removed
///
/// This is the key used for the domain → color mapping in settings.
pub fn site_hostname(url: &str) -> Option<String> {
    parse_hostname(url).map(|hostname| match hostname.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => hostname,
    })
}

/// Whether a tab with this URL may take part in grouping at all
///
/// Only web pages are grouped. Browser pages (chrome://, about:),
/// extension pages and local files are left alone.
pub fn is_groupable_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

fn label_for_hostname(hostname: &str) -> String {
    if let Some(name) = friendly_name(hostname) {
        return name.to_string();
    }

    let first_segment = hostname.split('.').next().unwrap_or(hostname);
    first_segment
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn friendly_name(hostname: &str) -> Option<&'static str> {
    FRIENDLY_NAMES
        .iter()
        .find(|(host, _)| *host == hostname)
        .map(|(_, name)| *name)
}

/// Uppercase the first character, lowercase the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
