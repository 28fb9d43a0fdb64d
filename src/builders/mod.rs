//! Domain builders: turn a route identity plus (optional) live entity data
//! into a draft entry for the resolver.

pub mod league;
pub mod match_page;
pub mod player;

use crate::store::model::{Breadcrumb, Domain, EntryPatch, SeoStore};
use sports_api::Sport;
use std::collections::BTreeMap;
use std::time::Duration;

pub use league::build_league;
pub use match_page::build_match;
pub use player::build_player;

/// A builder's output, before resolver normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub domain: Domain,
    /// Normalized sport key the draft was built for.
    pub sport: String,
    pub entry: EntryPatch,
    pub canonical_path: String,
    pub revalidate_secs: u64,
    /// Whether live entity data was found.
    pub enriched: bool,
}

/// Sport key plus its fetchable variant, when the fetcher knows it.
pub(crate) fn sport_of(raw: &str) -> (String, Option<Sport>) {
    let key = sports_api::normalize_sport_key(raw);
    let sport = Sport::from_key(&key);
    (key, sport)
}

pub(crate) fn fetch_timeout(store: &SeoStore, domain: Domain) -> Duration {
    Duration::from_millis(store.template(domain).timeout_ms)
}

/// Same id, same pattern: the first character's code point modulo the
/// number of patterns. An empty id picks the first pattern.
pub fn pick_pattern<'a>(patterns: &'a [String], id: &str) -> Option<&'a str> {
    if patterns.is_empty() {
        return None;
    }
    let index = id
        .chars()
        .next()
        .map(|c| c as usize % patterns.len())
        .unwrap_or(0);
    Some(patterns[index].as_str())
}

/// Placeholder values for pattern substitution.
#[derive(Debug, Clone, Default)]
pub struct Placeholders(BTreeMap<&'static str, String>);

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.0.insert(name, value.into());
        self
    }

    /// Substitute `{name}` tokens. Unknown or empty placeholders vanish along
    /// with the separator or bracket pair they leave dangling. Literal text
    /// elsewhere in the pattern is kept as written.
    pub fn fill(&self, pattern: &str) -> String {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) if is_placeholder_name(&after[..close]) => {
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(match self.0.get(&after[..close]) {
                        Some(value) if !value.trim().is_empty() => Piece::Value(value.clone()),
                        _ => Piece::Gap,
                    });
                    rest = &after[close + 1..];
                }
                _ => {
                    literal.push('{');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        close_gaps(pieces)
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

const SEPARATORS: &[char] = &['-', '|', ':', ',', '&', '·', '–'];

#[derive(Debug)]
enum Piece {
    Literal(String),
    Value(String),
    /// An unknown or empty placeholder.
    Gap,
}

impl Piece {
    fn has_content(&self) -> bool {
        match self {
            Piece::Literal(s) | Piece::Value(s) => !s.trim().is_empty(),
            Piece::Gap => false,
        }
    }

    fn literal_mut(&mut self) -> Option<&mut String> {
        match self {
            Piece::Literal(s) => Some(s),
            _ => None,
        }
    }
}

fn close_gaps(mut pieces: Vec<Piece>) -> String {
    for i in 0..pieces.len() {
        if !matches!(pieces[i], Piece::Gap) {
            continue;
        }
        let content_before = pieces[..i].iter().any(Piece::has_content);
        let (left, right) = pieces.split_at_mut(i);
        let before = left.last_mut().and_then(Piece::literal_mut);
        let after = right.get_mut(1).and_then(Piece::literal_mut);

        match (before, after) {
            (Some(b), Some(a)) if b.trim_end().ends_with('(') && a.trim_start().starts_with(')') => {
                strip_end(b, &['(']);
                strip_start(a, &[')']);
            }
            (Some(b), _) if content_before => strip_end(b, SEPARATORS),
            (_, Some(a)) if !content_before => strip_start(a, SEPARATORS),
            _ => {}
        }
    }
    join_pieces(pieces)
}

/// Remove one of `chars` from the end, ignoring trailing whitespace.
fn strip_end(s: &mut String, chars: &[char]) {
    let trimmed = s.trim_end();
    if let Some(c) = trimmed.chars().last().filter(|c| chars.contains(c)) {
        let cut = trimmed.len() - c.len_utf8();
        s.truncate(cut);
    }
}

fn strip_start(s: &mut String, chars: &[char]) {
    let trimmed = s.trim_start();
    if let Some(c) = trimmed.chars().next().filter(|c| chars.contains(c)) {
        *s = trimmed[c.len_utf8()..].to_owned();
    }
}

fn join_pieces(pieces: Vec<Piece>) -> String {
    let mut out = String::new();
    let mut after_gap = false;
    for piece in pieces {
        match piece {
            Piece::Gap => after_gap = true,
            Piece::Literal(text) | Piece::Value(text) if after_gap => {
                join_across_gap(&mut out, &text);
                after_gap = false;
            }
            Piece::Literal(text) | Piece::Value(text) => out.push_str(&text),
        }
    }
    out.trim().to_owned()
}

/// At most one space where a gap was, and none before closing punctuation.
fn join_across_gap(out: &mut String, text: &str) {
    let next = text.trim_start();
    let spaced = out.ends_with(char::is_whitespace) || next.len() < text.len();
    out.truncate(out.trim_end().len());
    if spaced && !out.is_empty() && !next.starts_with([',', '.', ':', ';', ')']) {
        out.push(' ');
    }
    out.push_str(next);
}

/// Fill every keyword pattern, dropping blanks and duplicates.
pub(crate) fn fill_keywords(patterns: &[String], values: &Placeholders) -> Option<Vec<String>> {
    let mut keywords: Vec<String> = Vec::new();
    for pattern in patterns {
        let keyword = values.fill(pattern);
        if !keyword.is_empty() && !keywords.iter().any(|k| k.eq_ignore_ascii_case(&keyword)) {
            keywords.push(keyword);
        }
    }
    (!keywords.is_empty()).then_some(keywords)
}

/// Most specific override key first.
pub fn override_keys(domain: Domain, sport: &str, id: &str, tab: Option<&str>) -> Vec<String> {
    let base = format!("{}:{sport}:{id}", domain.key());
    match tab.filter(|t| !t.is_empty()) {
        Some(tab) => vec![format!("{base}:{tab}"), base],
        None => vec![base],
    }
}

/// Merge the first matching override on top of a draft entry.
pub(crate) fn apply_override(store: &SeoStore, entry: &mut EntryPatch, keys: &[String]) {
    if let Some(patch) = store.override_for(keys) {
        *entry = entry.merged_with(patch);
    }
}

pub(crate) fn crumb(name: impl Into<String>, path: impl Into<String>) -> Breadcrumb {
    Breadcrumb {
        name: name.into(),
        path: path.into(),
    }
}

/// `https://site` + `/path/`
pub(crate) fn absolute(site_url: &str, path: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), path)
}
