//! The public entry point: page identity in, finished metadata out.
//!
//! Every operation succeeds. Missing configuration falls back to compiled
//! defaults and missing entity data to generic names.

pub mod metadata;
pub mod normalize;

use crate::builders::{self, Draft};
use crate::entity::EntitySource;
use crate::store::ConfigProvider;
use crate::store::merge::Layered;
use crate::store::model::{Breadcrumb, EntryPatch, RobotsSetting, SeoStore, title_case};
use metadata::{Metadata, RenderContext};
use normalize::{DESCRIPTION_LIMIT, TITLE_LIMIT, clamp, route_path};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const HOME_REVALIDATE_SECS: u64 = 60;
const LISTING_REVALIDATE_SECS: u64 = 60;
const STATIC_REVALIDATE_SECS: u64 = 3600;

/// A complete entry. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoEntry {
    pub title: String,
    pub description: String,
    pub h1: String,
    pub canonical: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots: Option<RobotsSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Value>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub image_alt: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved {
    pub entry: SeoEntry,
    pub metadata: Metadata,
    pub canonical_path: String,
    pub revalidate_secs: u64,
}

pub struct MetadataResolver {
    config: Arc<ConfigProvider>,
    entities: Arc<dyn EntitySource>,
}

impl MetadataResolver {
    pub fn new(config: Arc<ConfigProvider>, entities: Arc<dyn EntitySource>) -> Self {
        Self { config, entities }
    }

    pub fn config(&self) -> &Arc<ConfigProvider> {
        &self.config
    }

    pub async fn resolve_home(&self) -> Resolved {
        let store = self.config.snapshot().await;
        let mut entry = store.home.clone();
        apply_override(&store, &mut entry, &["home".to_owned()]);
        finish(&store, entry, "/", HOME_REVALIDATE_SECS, &RenderContext::default())
    }

    /// `key` selects the configured page; `path` is the route it renders at.
    pub async fn resolve_static_page(&self, key: &str, path: &str) -> Resolved {
        let store = self.config.snapshot().await;
        let mut entry = store.pages.get(key).cloned().unwrap_or_else(|| {
            let name = title_case(key);
            EntryPatch {
                h1: Some(name.clone()),
                title: Some(name),
                ..Default::default()
            }
        });
        apply_override(&store, &mut entry, &[format!("page:{key}")]);
        if let Some(db_entry) = self.config.page_override(key).await {
            entry.apply(db_entry);
        }
        finish(&store, entry, path, STATIC_REVALIDATE_SECS, &RenderContext::default())
    }

    pub async fn resolve_sport_tab(&self, sport: &str, tab: &str) -> Resolved {
        let store = self.config.snapshot().await;
        let sport_key = sports_api::normalize_sport_key(sport);
        let mut entry = sport_tab_entry(&store, &sport_key, tab);
        apply_override(&store, &mut entry, &[format!("sports:{sport_key}:{tab}")]);
        let path = format!("/sports/{}/{tab}/", sport.trim());
        finish(&store, entry, &path, LISTING_REVALIDATE_SECS, &RenderContext::default())
    }

    pub async fn resolve_league(&self, sport: &str, tab: &str, league_id: &str) -> Resolved {
        let store = self.config.snapshot().await;
        let draft =
            builders::build_league(&store, self.entities.as_ref(), sport, tab, league_id).await;
        let path = builders::league::league_path(sport.trim(), tab, league_id);
        finish_draft(&store, draft, &path)
    }

    pub async fn resolve_match(&self, sport: &str, id: &str, tab: Option<&str>) -> Resolved {
        let store = self.config.snapshot().await;
        let draft = builders::build_match(&store, self.entities.as_ref(), sport, id, tab).await;
        let path = builders::match_page::match_path(sport.trim(), id, tab);
        finish_draft(&store, draft, &path)
    }

    pub async fn resolve_player(&self, sport: &str, id: &str) -> Resolved {
        let store = self.config.snapshot().await;
        let draft = builders::build_player(&store, self.entities.as_ref(), sport, id).await;
        let path = builders::player::player_path(sport.trim(), id);
        finish_draft(&store, draft, &path)
    }
}

fn apply_override(store: &SeoStore, entry: &mut EntryPatch, keys: &[String]) {
    if let Some(patch) = store.override_for(keys) {
        entry.apply(patch.clone());
    }
}

fn sport_tab_entry(store: &SeoStore, sport: &str, tab: &str) -> EntryPatch {
    let sport_label = store.sport_label(sport);
    let tab_label = store.tab_label(tab);
    let title = format!("{sport_label} {tab_label}");
    EntryPatch {
        description: Some(format!(
            "{sport_label} {}: live scores, fixtures, results and standings on {}.",
            tab_label.to_lowercase(),
            store.brand.site_name
        )),
        h1: Some(title.clone()),
        title: Some(title),
        breadcrumbs: Some(vec![
            Breadcrumb { name: "Home".into(), path: "/".into() },
            Breadcrumb { name: sport_label, path: format!("/sports/{sport}/") },
            Breadcrumb { name: tab_label, path: format!("/sports/{sport}/{tab}/") },
        ]),
        ..Default::default()
    }
}

fn finish_draft(store: &SeoStore, draft: Draft, path: &str) -> Resolved {
    let ctx = RenderContext {
        open_graph: Some(&store.template(draft.domain).open_graph),
    };
    finish(store, draft.entry, path, draft.revalidate_secs, &ctx)
}

/// Force the canonical, complete and clamp the entry, then render it.
fn finish(
    store: &SeoStore,
    patch: EntryPatch,
    path: &str,
    revalidate_secs: u64,
    ctx: &RenderContext<'_>,
) -> Resolved {
    let canonical_path = route_path(path);
    let entry = complete(store, patch, &canonical_path);
    let metadata = metadata::render(store, &entry, ctx);
    Resolved {
        entry,
        metadata,
        canonical_path,
        revalidate_secs,
    }
}

fn complete(store: &SeoStore, patch: EntryPatch, canonical_path: &str) -> SeoEntry {
    let non_empty = |s: Option<String>| s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());

    let title = non_empty(patch.title).unwrap_or_else(|| store.brand.site_name.clone());
    let description =
        non_empty(patch.description).unwrap_or_else(|| store.brand.default_description.clone());
    let h1 = non_empty(patch.h1).unwrap_or_else(|| title.clone());

    SeoEntry {
        title: clamp(&title, TITLE_LIMIT),
        description: clamp(&description, DESCRIPTION_LIMIT),
        h1,
        canonical: canonical_path.to_owned(),
        keywords: patch.keywords.unwrap_or_default(),
        og_title: non_empty(patch.og_title),
        og_description: non_empty(patch.og_description),
        og_image: non_empty(patch.og_image),
        robots: patch.robots,
        structured_data: patch.structured_data,
        breadcrumbs: patch.breadcrumbs.unwrap_or_default(),
        image_alt: patch.image_alt.unwrap_or_default(),
    }
}
