//! Layered configuration store.
//!
//! Precedence, lowest to highest: compiled defaults, disk files, the
//! environment blob, legal page files, database records. A runtime store,
//! when installed, replaces the whole stack.

pub mod cache;
pub mod defaults;
pub mod disk;
pub mod merge;
pub mod model;
pub mod records;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::error::StoreError;
use crate::settings::Settings;
use cache::{Clock, SignatureCache, SystemClock};
use disk::{DiskLayers, DiskSignature};
use futures_util::future::join4;
use log::{debug, error, warn};
use merge::Layered;
use model::{EntryPatch, SeoStore, StorePatch};
use records::{DbSignature, RecordKind, RecordSource, build_db_patch, lookup_record, page_slugs};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Owns every layer source and their caches. Share it behind an `Arc`.
pub struct ConfigProvider {
    settings: Settings,
    env_layer: Option<StorePatch>,
    records: Option<Arc<dyn RecordSource>>,
    clock: Arc<dyn Clock>,
    runtime: RwLock<Option<Arc<SeoStore>>>,
    disk_cache: SignatureCache<DiskSignature, Arc<SeoStore>>,
    db_cache: SignatureCache<DbSignature, Option<Arc<StorePatch>>>,
    merged_cache: SignatureCache<MergedFrom, Arc<SeoStore>>,
}

/// Identity of the two inputs a full snapshot was merged from.
struct MergedFrom {
    base: Arc<SeoStore>,
    patch: Arc<StorePatch>,
}

impl PartialEq for MergedFrom {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.base, &other.base) && Arc::ptr_eq(&self.patch, &other.patch)
    }
}

impl std::fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("config_dir", &self.config_dir())
            .field("edge", &self.settings.edge)
            .field("has_records", &self.records.is_some())
            .finish_non_exhaustive()
    }
}

impl ConfigProvider {
    pub fn new(settings: Settings) -> Self {
        let env_layer = settings.config_json.as_deref().and_then(parse_env_layer);
        Self {
            settings,
            env_layer,
            records: None,
            clock: Arc::new(SystemClock),
            runtime: RwLock::new(None),
            disk_cache: SignatureCache::default(),
            db_cache: SignatureCache::default(),
            merged_cache: SignatureCache::default(),
        }
    }

    pub fn with_records(mut self, records: Arc<dyn RecordSource>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The directory the disk layer currently reads from. Resolved on each
    /// call, so a directory created after startup is picked up.
    pub fn config_dir(&self) -> PathBuf {
        disk::resolve_config_dir(self.settings.config_dir.as_deref(), &self.settings.project_root)
    }

    /// Install (or remove, with `None`) a store that short-circuits every other layer.
    pub fn swap_runtime(&self, store: Option<SeoStore>) {
        let mut runtime = self.runtime.write().unwrap_or_else(PoisonError::into_inner);
        *runtime = store.map(Arc::new);
    }

    fn runtime_store(&self) -> Option<Arc<SeoStore>> {
        self.runtime
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Defaults, disk and environment; never touches the network.
    pub fn sync_snapshot(&self) -> Arc<SeoStore> {
        if let Some(store) = self.runtime_store() {
            return store;
        }
        if self.settings.edge {
            return Arc::new(self.build_store(DiskLayers::default()));
        }

        let now = self.clock.now();
        if let Some(store) = self.disk_cache.fresh(now, self.settings.disk_cache_window) {
            return store;
        }
        let dir = self.config_dir();
        let signature = disk::disk_signature(&dir);
        if let Some(store) = self.disk_cache.matching(&signature, now) {
            debug!("disk layer unchanged in {}", dir.display());
            return store;
        }

        debug!("rebuilding disk layer from {}", dir.display());
        let store = Arc::new(self.build_store(disk::load_disk_layers(&dir)));
        self.disk_cache.store(signature, store.clone(), now);
        store
    }

    /// [`sync_snapshot`](Self::sync_snapshot) plus the database records.
    pub async fn snapshot(&self) -> Arc<SeoStore> {
        if let Some(store) = self.runtime_store() {
            return store;
        }
        let base = self.sync_snapshot();
        let Some(patch) = self.db_patch().await else {
            return base;
        };

        let key = MergedFrom { base, patch };
        let now = self.clock.now();
        if let Some(store) = self.merged_cache.matching(&key, now) {
            return store;
        }
        let mut store = (*key.base).clone();
        store.apply((*key.patch).clone());
        let store = Arc::new(store);
        self.merged_cache.store(key, store.clone(), now);
        store
    }

    /// Per-slug page override from the record source, trying alias slugs.
    pub async fn page_override(&self, key: &str) -> Option<EntryPatch> {
        if self.settings.edge {
            return None;
        }
        let source = self.records.as_ref()?;
        for slug in page_slugs(key) {
            match source.fetch_page(&slug).await {
                Ok(Some(payload)) => {
                    if let Some(entry) = records::extract_page_entry(payload) {
                        return Some(entry);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!("page override lookup for {slug} failed: {e}");
                    return None;
                }
            }
        }
        None
    }

    /// Drop both caches; the next snapshot rebuilds from the sources.
    pub fn clear_caches(&self) {
        self.disk_cache.clear();
        self.db_cache.clear();
        self.merged_cache.clear();
    }

    /// Defaults, disk files, environment blob, then legal pages.
    fn build_store(&self, disk: DiskLayers) -> SeoStore {
        let mut store = SeoStore::default();
        let layers = [disk.files, self.env_layer.clone(), disk.legal_pages];
        for layer in layers.into_iter().flatten() {
            store.apply(layer);
        }
        store
    }

    async fn db_patch(&self) -> Option<Arc<StorePatch>> {
        if self.settings.edge {
            return None;
        }
        let source = self.records.as_deref()?;
        let ttl = self.settings.db_cache_ttl;
        let caching = !ttl.is_zero();
        let now = self.clock.now();

        if caching && let Some(patch) = self.db_cache.fresh(now, ttl) {
            return patch;
        }

        let fetched = match fetch_records(source, &self.settings.record_keys).await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!("database layer unavailable: {e}");
                if caching {
                    self.db_cache.store(DbSignature::failed(), None, now);
                }
                return None;
            }
        };

        let signature = DbSignature::of(&fetched);
        if caching && let Some(patch) = self.db_cache.matching(&signature, now) {
            debug!("database records unchanged");
            return patch;
        }

        let patch = build_db_patch(&fetched).map(Arc::new);
        if caching {
            self.db_cache.store(signature, patch.clone(), now);
        }
        patch
    }
}

/// The four records in merge order. Lookups run concurrently.
async fn fetch_records(
    source: &dyn RecordSource,
    keys: &records::RecordKeys,
) -> Result<Vec<Option<records::SeoRecord>>, StoreError> {
    let [global_keys, match_keys, league_keys, player_keys] =
        RecordKind::ORDER.map(|kind| keys.for_kind(kind));
    let (global, match_record, league, player) = join4(
        lookup_record(source, global_keys),
        lookup_record(source, match_keys),
        lookup_record(source, league_keys),
        lookup_record(source, player_keys),
    )
    .await;
    Ok(vec![global?, match_record?, league?, player?])
}

fn parse_env_layer(raw: &str) -> Option<StorePatch> {
    match serde_json::from_str::<StorePatch>(raw) {
        Ok(patch) => Some(patch),
        Err(e) => {
            warn!("{}", StoreError::json("SPORTSEO_CONFIG_JSON", e));
            None
        }
    }
}
