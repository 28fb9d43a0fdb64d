//! The canonical configuration shape and its partial (layer) forms.

use super::merge::{Layered, deep_merge, layered};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Robots directive as configuration carries it: a flag object or free text
/// such as `"noindex, follow"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RobotsSetting {
    Flags {
        #[serde(default)]
        index: Option<bool>,
        #[serde(default)]
        follow: Option<bool>,
    },
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// A partial page entry. Layers, overrides and builder drafts all speak this
/// shape; the resolver turns it into a complete `SeoEntry`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breadcrumbs: Option<Vec<Breadcrumb>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<BTreeMap<String, String>>,
}

impl Layered for EntryPatch {
    type Patch = EntryPatch;

    fn apply(&mut self, patch: EntryPatch) {
        macro_rules! take {
            ($target:ident, $source:ident; $($field:ident),*) => {
                $(
                    if $source.$field.is_some() {
                        $target.$field = $source.$field;
                    }
                )*
            };
        }
        let target = &mut *self;
        take!(
            target, patch;
            title,
            description,
            h1,
            canonical,
            keywords,
            og_title,
            og_description,
            og_image,
            robots,
            breadcrumbs
        );

        if let Some(data) = patch.structured_data {
            match &mut self.structured_data {
                Some(base) => deep_merge(base, data),
                None => self.structured_data = Some(data),
            }
        }
        if let Some(alts) = patch.image_alt {
            self.image_alt.get_or_insert_with(BTreeMap::new).extend(alts);
        }
    }
}

impl EntryPatch {
    /// Merge without consuming `self`.
    pub fn merged_with(&self, patch: &EntryPatch) -> EntryPatch {
        let mut out = self.clone();
        out.apply(patch.clone());
        out
    }

    pub fn is_empty(&self) -> bool {
        self == &EntryPatch::default()
    }
}

layered! {
    /// Site identity shared by every page.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Brand / BrandPatch {
        pub site_name: String,
        pub site_url: String,
        pub domain: String,
        pub locale: String,
        pub logo: String,
        pub title_prefix: String,
        pub title_suffix: String,
        pub default_description: String,
        pub default_image: String,
        pub favicon: Option<String>,
        pub theme_color: Option<String>,
        pub twitter_handle: Option<String>,
    }
}

layered! {
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Labels / LabelsPatch {
        pub sports: BTreeMap<String, String>,
        pub tabs: BTreeMap<String, String>,
    }
}

layered! {
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct OpenGraphConfig / OpenGraphPatch {
        /// Domain-level fallback image, used when an entry has none.
        pub image: Option<String>,
        pub image_alt: Option<String>,
        /// `og:type`
        pub kind: String,
        /// Prefer the entity's own artwork (league logo, player photo).
        pub use_entity_image: bool,
    }
}

layered! {
    /// Templates for one dynamic page family (match, league or player).
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct DomainTemplate / DomainTemplatePatch {
        pub revalidate_secs: u64,
        /// Budget for one provider attempt.
        pub timeout_ms: u64,
        pub title_patterns: Vec<String>,
        pub description_pattern: String,
        pub h1_pattern: String,
        pub keywords: Vec<String>,
        pub open_graph: OpenGraphConfig,
        pub structured_data: bool,
    }
}

layered! {
    /// The fully merged configuration snapshot.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct SeoStore / StorePatch {
        pub brand: Brand,
        pub home: EntryPatch,
        pub pages: BTreeMap<String, EntryPatch>,
        /// Fine-grained entry patches keyed `domain:sport:id[:tab]`.
        pub overrides: BTreeMap<String, EntryPatch>,
        pub labels: Labels,
        #[serde(rename = "match")]
        pub match_template: DomainTemplate,
        #[serde(rename = "league")]
        pub league_template: DomainTemplate,
        #[serde(rename = "player")]
        pub player_template: DomainTemplate,
        pub header: Option<Value>,
        pub footer: Option<Value>,
        pub directives: Option<Value>,
    }
}

/// The three dynamic page families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Match,
    League,
    Player,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Match, Domain::League, Domain::Player];

    pub fn key(&self) -> &'static str {
        match self {
            Domain::Match => "match",
            Domain::League => "league",
            Domain::Player => "player",
        }
    }
}

impl SeoStore {
    pub fn template(&self, domain: Domain) -> &DomainTemplate {
        match domain {
            Domain::Match => &self.match_template,
            Domain::League => &self.league_template,
            Domain::Player => &self.player_template,
        }
    }

    pub fn sport_label(&self, sport: &str) -> String {
        self.labels
            .sports
            .get(sport)
            .cloned()
            .unwrap_or_else(|| title_case(sport))
    }

    pub fn tab_label(&self, tab: &str) -> String {
        self.labels
            .tabs
            .get(tab)
            .cloned()
            .unwrap_or_else(|| title_case(tab))
    }

    /// Most specific key first; the first key present wins.
    pub fn override_for(&self, keys: &[String]) -> Option<&EntryPatch> {
        keys.iter().find_map(|key| self.overrides.get(key))
    }
}

impl StorePatch {
    pub fn is_empty(&self) -> bool {
        self == &StorePatch::default()
    }

    pub fn template_mut(&mut self, domain: Domain) -> &mut Option<DomainTemplatePatch> {
        match domain {
            Domain::Match => &mut self.match_template,
            Domain::League => &mut self.league_template,
            Domain::Player => &mut self.player_template,
        }
    }
}

/// "ice-hockey" → "Ice Hockey"
pub fn title_case(raw: &str) -> String {
    raw.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_patch_fields_replace_and_alts_union() {
        let mut base = EntryPatch {
            title: Some("Base".into()),
            keywords: Some(vec!["a".into(), "b".into()]),
            image_alt: Some([("/a.png".to_owned(), "A".to_owned())].into()),
            ..Default::default()
        };
        base.apply(EntryPatch {
            keywords: Some(vec!["x".into()]),
            image_alt: Some([("/b.png".to_owned(), "B".to_owned())].into()),
            ..Default::default()
        });
        assert_eq!(base.title.as_deref(), Some("Base"));
        assert_eq!(base.keywords, Some(vec!["x".to_owned()]));
        assert_eq!(base.image_alt.as_ref().map(|m| m.len()), Some(2));
    }

    #[test]
    fn store_patch_deserializes_camel_case_and_domain_keys() {
        let patch: StorePatch = serde_json::from_value(json!({
            "brand": { "siteName": "Acme", "titleSuffix": " | Acme" },
            "match": { "titlePatterns": ["{home} v {away}"], "structuredData": false },
            "overrides": { "match:football:1": { "title": "Custom" } }
        }))
        .unwrap();
        let brand = patch.brand.as_ref().unwrap();
        assert_eq!(brand.site_name.as_deref(), Some("Acme"));
        let tpl = patch.match_template.as_ref().unwrap();
        assert_eq!(tpl.title_patterns, Some(vec!["{home} v {away}".to_owned()]));
        assert_eq!(tpl.structured_data, Some(false));
        assert!(patch.league_template.is_none());
    }

    #[test]
    fn applying_store_patch_keeps_untouched_fields() {
        let mut store = SeoStore::default();
        let before_locale = store.brand.locale.clone();
        let patch: StorePatch =
            serde_json::from_value(json!({ "brand": { "siteName": "Acme" } })).unwrap();
        store.apply(patch);
        assert_eq!(store.brand.site_name, "Acme");
        assert_eq!(store.brand.locale, before_locale);
    }

    #[test]
    fn override_lookup_prefers_specific_then_falls_back() {
        let mut store = SeoStore::default();
        store.overrides.insert(
            "match:football:1".into(),
            EntryPatch { title: Some("Coarse".into()), ..Default::default() },
        );
        store.overrides.insert(
            "match:football:1:stats".into(),
            EntryPatch { title: Some("Specific".into()), ..Default::default() },
        );
        let keys = |tab: &str| vec![format!("match:football:1:{tab}"), "match:football:1".to_owned()];
        let found = store.override_for(&keys("stats")).unwrap();
        assert_eq!(found.title.as_deref(), Some("Specific"));
        let found = store.override_for(&keys("lineups")).unwrap();
        assert_eq!(found.title.as_deref(), Some("Coarse"));
        assert!(store.override_for(&["nope".to_owned()]).is_none());
    }

    #[test]
    fn labels_fall_back_to_title_case() {
        let store = SeoStore::default();
        assert_eq!(store.tab_label("head-to-head-extra"), "Head To Head Extra");
        assert_eq!(title_case("ice_hockey"), "Ice Hockey");
    }
}
