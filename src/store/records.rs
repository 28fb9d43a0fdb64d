//! Database layer contract: keyed JSON records plus per-slug page overrides.

use super::model::{Domain, EntryPatch, StorePatch};
use super::merge::deep_merge;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// One configuration row: `{ key, data, updatedAt }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoRecord {
    pub key: String,
    #[serde(default)]
    pub data: Value,
    /// Milliseconds since the epoch; feeds the cache signature.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_record(&self, key: &str) -> StoreResult<Option<SeoRecord>>;

    /// Raw page-override payload for one slug.
    async fn fetch_page(&self, slug: &str) -> StoreResult<Option<Value>>;
}

/// Which record feeds which part of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Global,
    Domain(Domain),
}

impl RecordKind {
    /// Merge order of the database layer.
    pub const ORDER: [RecordKind; 4] = [
        RecordKind::Global,
        RecordKind::Domain(Domain::Match),
        RecordKind::Domain(Domain::League),
        RecordKind::Domain(Domain::Player),
    ];
}

/// Preferred key plus legacy fallbacks for each record, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    pub global: Vec<String>,
    pub match_keys: Vec<String>,
    pub league: Vec<String>,
    pub player: Vec<String>,
}

impl Default for RecordKeys {
    fn default() -> Self {
        let keys = |items: &[&str]| items.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();
        Self {
            global: keys(&["seo:global", "seo_global", "seo-settings", "global"]),
            match_keys: keys(&["seo:match", "seo_match", "match-seo"]),
            league: keys(&["seo:league", "seo_league", "league-seo"]),
            player: keys(&["seo:player", "seo_player", "player-seo"]),
        }
    }
}

impl RecordKeys {
    pub fn for_kind(&self, kind: RecordKind) -> &[String] {
        match kind {
            RecordKind::Global => &self.global,
            RecordKind::Domain(Domain::Match) => &self.match_keys,
            RecordKind::Domain(Domain::League) => &self.league,
            RecordKind::Domain(Domain::Player) => &self.player,
        }
    }

    /// Put an explicitly configured key in front of the built-in list.
    pub fn prefer(&mut self, kind: RecordKind, key: &str) {
        let list = match kind {
            RecordKind::Global => &mut self.global,
            RecordKind::Domain(Domain::Match) => &mut self.match_keys,
            RecordKind::Domain(Domain::League) => &mut self.league,
            RecordKind::Domain(Domain::Player) => &mut self.player,
        };
        list.retain(|k| k != key);
        list.insert(0, key.to_owned());
    }
}

/// First key that yields a record wins.
pub async fn lookup_record(
    source: &dyn RecordSource,
    keys: &[String],
) -> StoreResult<Option<SeoRecord>> {
    for key in keys {
        if let Some(record) = source.fetch_record(key).await? {
            return Ok(Some(record));
        }
    }
    Ok(None)
}

/// `(key, updatedAt)` of each record in merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSignature(pub Vec<Option<(String, Option<i64>)>>);

impl DbSignature {
    pub fn of(records: &[Option<SeoRecord>]) -> Self {
        DbSignature(
            records
                .iter()
                .map(|r| r.as_ref().map(|r| (r.key.clone(), r.updated_at)))
                .collect(),
        )
    }

    /// Marker stored when the source failed; matches no real signature.
    pub fn failed() -> Self {
        DbSignature(Vec::new())
    }
}

/// Combine the records (in `RecordKind::ORDER`) into one store patch.
/// The global record is root-shaped; a domain record holds that domain's
/// template, bare or already wrapped in its domain key.
pub fn build_db_patch(records: &[Option<SeoRecord>]) -> Option<StorePatch> {
    let mut acc = Value::Object(Map::new());
    let mut found = false;

    for (kind, record) in RecordKind::ORDER.iter().zip(records) {
        let Some(record) = record else {
            continue;
        };
        let data = match &record.data {
            Value::Object(map) if !map.is_empty() => record.data.clone(),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(parsed) if parsed.is_object() => parsed,
                Ok(_) => continue,
                Err(e) => {
                    log::warn!("{}", StoreError::json(record.key.clone(), e));
                    continue;
                }
            },
            _ => continue,
        };
        let layer = match kind {
            RecordKind::Global => data,
            RecordKind::Domain(domain) => {
                let key = domain.key();
                if data.get(key).is_some_and(Value::is_object) {
                    data
                } else {
                    let mut wrapped = Map::new();
                    wrapped.insert(key.to_owned(), data);
                    Value::Object(wrapped)
                }
            }
        };
        if let Err(e) = serde_json::from_value::<StorePatch>(layer.clone()) {
            log::warn!("ignoring record {}: {e}", record.key);
            continue;
        }
        deep_merge(&mut acc, layer);
        found = true;
    }

    if !found {
        return None;
    }
    let mut patch: StorePatch = serde_json::from_value(acc).ok()?;
    normalize_patch_assets(&mut patch);
    Some(patch)
}

/// Slugs a static page may be stored under, preferred first.
pub fn page_slugs(key: &str) -> Vec<String> {
    let aliases: &[&str] = match key {
        "contact" => &["contact-us"],
        "privacy" => &["privacy-policy"],
        "terms" => &["terms-of-service", "terms-and-conditions"],
        _ => &[],
    };
    std::iter::once(key)
        .chain(aliases.iter().copied())
        .map(str::to_owned)
        .collect()
}

/// Accepts `{seo: …}`, `{data: {seo: …}}`, `{data: …}` or a flat entry.
pub fn extract_page_entry(payload: Value) -> Option<EntryPatch> {
    let payload = match payload {
        Value::String(raw) => serde_json::from_str(&raw).ok()?,
        other => other,
    };
    let candidate = payload
        .get("seo")
        .or_else(|| payload.get("data").and_then(|d| d.get("seo")))
        .or_else(|| payload.get("data").filter(|d| d.is_object()))
        .unwrap_or(&payload)
        .clone();
    let mut entry: EntryPatch = serde_json::from_value(candidate).ok()?;
    if entry.is_empty() {
        return None;
    }
    if let Some(image) = &entry.og_image {
        entry.og_image = Some(normalize_asset_path(image));
    }
    Some(entry)
}

fn is_absolute_url(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
}

/// Ensure a leading slash on site-relative asset paths; absolute URLs pass through.
pub fn normalize_asset_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() || is_absolute_url(trimmed) || trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn normalize_opt(value: &mut Option<String>) {
    if let Some(path) = value {
        *path = normalize_asset_path(path);
    }
}

fn normalize_entry(entry: &mut EntryPatch) {
    normalize_opt(&mut entry.og_image);
}

/// Keys under `header`/`footer` that hold image paths.
const BANNER_KEYS: [&str; 4] = ["banner", "bannerImage", "logo", "image"];

fn normalize_banner_paths(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, item) in map.iter_mut() {
        match item {
            Value::String(path) if BANNER_KEYS.contains(&key.as_str()) => {
                *path = normalize_asset_path(path);
            }
            Value::Object(_) => normalize_banner_paths(item),
            _ => {}
        }
    }
}

/// Leading-slash normalization for every asset path a database patch can carry.
pub fn normalize_patch_assets(patch: &mut StorePatch) {
    if let Some(brand) = &mut patch.brand {
        normalize_opt(&mut brand.logo);
        normalize_opt(&mut brand.default_image);
        normalize_opt(&mut brand.favicon);
    }
    if let Some(home) = &mut patch.home {
        normalize_entry(home);
    }
    for map in [&mut patch.pages, &mut patch.overrides].into_iter().flatten() {
        map.values_mut().for_each(normalize_entry);
    }
    for domain in Domain::ALL {
        if let Some(template) = patch.template_mut(domain)
            && let Some(og) = &mut template.open_graph
        {
            normalize_opt(&mut og.image);
        }
    }
    for value in [&mut patch.header, &mut patch.footer].into_iter().flatten() {
        normalize_banner_paths(value);
    }
}

/// In-process record source. Backs tests and the CLI's `--records` file.
#[derive(Debug, Default)]
pub struct MemoryRecords {
    records: RwLock<BTreeMap<String, SeoRecord>>,
    pages: RwLock<BTreeMap<String, Value>>,
    failing: AtomicBool,
    reads: AtomicUsize,
}

/// On-disk form accepted by [`MemoryRecords::from_json`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordsFile {
    records: Vec<SeoRecord>,
    pages: BTreeMap<String, Value>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"records": [{key, data, updatedAt}], "pages": {slug: payload}}`
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        let file: RecordsFile =
            serde_json::from_str(raw).map_err(|e| StoreError::json("records file", e))?;
        let source = Self::new();
        for record in file.records {
            source.put(record);
        }
        for (slug, payload) in file.pages {
            source.put_page(&slug, payload);
        }
        Ok(source)
    }

    pub fn put(&self, record: SeoRecord) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(record.key.clone(), record);
    }

    pub fn put_page(&self, slug: &str, payload: Value) {
        let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
        pages.insert(slug.to_owned(), payload);
    }

    /// Make every read fail, as an unreachable database would.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `fetch_record` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory records marked failing".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordSource for MemoryRecords {
    async fn fetch_record(&self, key: &str) -> StoreResult<Option<SeoRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    async fn fetch_page(&self, slug: &str) -> StoreResult<Option<Value>> {
        self.check()?;
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        Ok(pages.get(slug).cloned())
    }
}
