use super::{
    Draft, Placeholders, absolute, apply_override, crumb, fetch_timeout, fill_keywords,
    override_keys, pick_pattern, sport_of,
};
use crate::entity::EntitySource;
use crate::store::model::{Domain, EntryPatch, SeoStore};
use log::debug;
use serde_json::{Value, json};
use sports_api::LeagueData;

const DEFAULT_TITLE: &str = "{name} {tab}";
const FALLBACK_NAME: &str = "League";

pub fn league_path(sport: &str, tab: &str, id: &str) -> String {
    format!("/sports/{sport}/{tab}/league/{id}/")
}

pub async fn build_league(
    store: &SeoStore,
    entities: &dyn EntitySource,
    sport: &str,
    tab: &str,
    id: &str,
) -> Draft {
    let (sport_key, fetchable) = sport_of(sport);
    let template = store.template(Domain::League);
    let data = match fetchable {
        Some(sport) => {
            entities
                .league_data(sport, id, fetch_timeout(store, Domain::League))
                .await
        }
        None => None,
    };
    if data.is_none() {
        debug!("no live data for league {sport_key}/{id}, using fallbacks");
    }

    let name = data
        .as_ref()
        .map(|l| l.name.trim().to_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_owned());
    let sport_label = store.sport_label(&sport_key);
    let tab_label = store.tab_label(tab);

    let mut values = Placeholders::new();
    values
        .set("name", name.clone())
        .set("league", name.clone())
        .set("brand", store.brand.site_name.clone())
        .set("sport", sport_label.clone())
        .set("tab", tab_label.clone());
    if let Some(data) = &data {
        values
            .set("country", data.country.clone().unwrap_or_default())
            .set("season", data.season.clone().unwrap_or_default());
    }

    let canonical_path = league_path(&sport_key, tab, id);
    let title = values.fill(pick_pattern(&template.title_patterns, id).unwrap_or(DEFAULT_TITLE));
    let description = Some(values.fill(&template.description_pattern)).filter(|d| !d.is_empty());
    let h1 = Some(values.fill(&template.h1_pattern)).filter(|h| !h.is_empty());

    let og_image = data
        .as_ref()
        .filter(|_| template.open_graph.use_entity_image)
        .and_then(|l| l.logo.clone());
    let image_alt = og_image
        .as_ref()
        .map(|logo| [(logo.clone(), format!("{name} logo"))].into());

    let breadcrumbs = vec![
        crumb("Home", "/"),
        crumb(sport_label, format!("/sports/{sport_key}/")),
        crumb(tab_label, format!("/sports/{sport_key}/{tab}/")),
        crumb(name, canonical_path.clone()),
    ];

    let structured_data = data
        .as_ref()
        .filter(|_| template.structured_data)
        .map(|l| sports_organization(store, l, &sport_key, &canonical_path));

    let mut entry = EntryPatch {
        h1: h1.or_else(|| Some(title.clone())),
        title: Some(title),
        description,
        canonical: Some(canonical_path.clone()),
        keywords: fill_keywords(&template.keywords, &values),
        og_image,
        structured_data,
        breadcrumbs: Some(breadcrumbs),
        image_alt,
        ..Default::default()
    };
    apply_override(store, &mut entry, &override_keys(Domain::League, &sport_key, id, Some(tab)));

    Draft {
        domain: Domain::League,
        sport: sport_key,
        entry,
        canonical_path,
        revalidate_secs: template.revalidate_secs,
        enriched: data.is_some(),
    }
}

fn sports_organization(store: &SeoStore, data: &LeagueData, sport: &str, path: &str) -> Value {
    let mut org = json!({
        "@context": "https://schema.org",
        "@type": "SportsOrganization",
        "name": data.name,
        "sport": store.sport_label(sport),
        "url": absolute(&store.brand.site_url, path),
    });
    if let Value::Object(map) = &mut org {
        if let Some(logo) = &data.logo {
            map.insert("logo".into(), logo.clone().into());
        }
        if let Some(country) = &data.country {
            map.insert("areaServed".into(), json!({ "@type": "Country", "name": country }));
        }
    }
    org
}
