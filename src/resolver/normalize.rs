//! Normalization rules shared by every page kind.

use crate::store::model::{Brand, RobotsSetting};
use serde::Serialize;

pub const TITLE_LIMIT: usize = 60;
pub const DESCRIPTION_LIMIT: usize = 155;
const ELLIPSIS: char = '…';

/// Shorten `text` to at most `max` characters, cutting at the last whole
/// word and appending an ellipsis.
pub fn clamp(text: &str, max: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max {
        return text;
    }
    if max == 0 {
        return String::new();
    }

    let budget: String = text.chars().take(max - 1).collect();
    // A cut that lands exactly before a space keeps the last word whole.
    let next_is_break = text.chars().nth(max - 1).is_some_and(char::is_whitespace);
    let cut = if next_is_break {
        budget.as_str()
    } else {
        match budget.rfind(' ') {
            Some(space) if space > 0 => &budget[..space],
            _ => budget.as_str(),
        }
    };
    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || ",;:-–|&".contains(c));
    format!("{cut}{ELLIPSIS}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
}

impl Default for Robots {
    fn default() -> Self {
        Self {
            index: true,
            follow: true,
        }
    }
}

impl Robots {
    pub fn content(&self) -> String {
        format!(
            "{}, {}",
            if self.index { "index" } else { "noindex" },
            if self.follow { "follow" } else { "nofollow" }
        )
    }
}

/// `{index, follow}` flags default to true; text is matched by substring
/// with `noindex`/`nofollow`/`none` winning.
pub fn parse_robots(setting: Option<&RobotsSetting>) -> Robots {
    match setting {
        None => Robots::default(),
        Some(RobotsSetting::Flags { index, follow }) => Robots {
            index: index.unwrap_or(true),
            follow: follow.unwrap_or(true),
        },
        Some(RobotsSetting::Text(text)) => {
            let text = text.to_ascii_lowercase();
            if text.split(',').any(|part| part.trim() == "none") {
                return Robots {
                    index: false,
                    follow: false,
                };
            }
            Robots {
                index: !text.contains("noindex"),
                follow: !text.contains("nofollow"),
            }
        }
    }
}

/// Leading and trailing slash, except for the root.
pub fn route_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}

pub fn is_absolute(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

/// Resolve a path or protocol-relative URL against the site URL.
pub fn absolute_url(site_url: &str, target: &str) -> String {
    let target = target.trim();
    if is_absolute(target) {
        return target.to_owned();
    }
    if let Some(rest) = target.strip_prefix("//") {
        return format!("https://{rest}");
    }
    let base = site_url.trim().trim_end_matches('/');
    if target.starts_with('/') {
        format!("{base}{target}")
    } else {
        format!("{base}/{target}")
    }
}

/// Apply the brand prefix and suffix. The suffix is skipped when the title
/// already ends with it or with the site name; the prefix when it is
/// already there.
pub fn decorate_title(title: &str, brand: &Brand) -> String {
    let mut out = title.trim().to_owned();

    let prefix = brand.title_prefix.trim();
    if !prefix.is_empty() && !starts_with_ignore_case(&out, prefix) {
        out = format!("{}{out}", brand.title_prefix);
    }

    let suffix = brand.title_suffix.trim();
    let site = brand.site_name.trim();
    let duplicate = ends_with_ignore_case(&out, suffix)
        || (!site.is_empty() && ends_with_ignore_case(&out, site));
    if !suffix.is_empty() && !duplicate {
        out.push_str(&brand.title_suffix);
    }
    out
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.to_lowercase().starts_with(&prefix.to_lowercase())
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    text.to_lowercase().ends_with(&suffix.to_lowercase())
}
