use super::{
    Draft, Placeholders, absolute, apply_override, crumb, fetch_timeout, fill_keywords,
    override_keys, pick_pattern, sport_of,
};
use crate::entity::EntitySource;
use crate::store::model::{Domain, EntryPatch, SeoStore};
use log::debug;
use serde_json::{Map, Value, json};
use sports_api::{MatchData, TeamRef};

const DEFAULT_TITLE: &str = "{home} vs {away}";
const FALLBACK_HOME: &str = "Home";
const FALLBACK_AWAY: &str = "Away";
const DEFAULT_TAB: &str = "overview";

/// The closed vocabulary structured data may carry for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Scheduled,
    Postponed,
    Cancelled,
}

impl EventStatus {
    /// Unknown codes map to `Scheduled`.
    pub fn from_short(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
            Some("PST") => EventStatus::Postponed,
            Some("CANC" | "ABD") => EventStatus::Cancelled,
            _ => EventStatus::Scheduled,
        }
    }

    pub fn schema_url(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "https://schema.org/EventScheduled",
            EventStatus::Postponed => "https://schema.org/EventPostponed",
            EventStatus::Cancelled => "https://schema.org/EventCancelled",
        }
    }
}

pub fn match_path(sport: &str, id: &str, tab: Option<&str>) -> String {
    match tab.filter(|t| !t.is_empty()) {
        Some(tab) => format!("/match/{sport}/{id}/{tab}/"),
        None => format!("/match/{sport}/{id}/"),
    }
}

pub async fn build_match(
    store: &SeoStore,
    entities: &dyn EntitySource,
    sport: &str,
    id: &str,
    tab: Option<&str>,
) -> Draft {
    let (sport_key, fetchable) = sport_of(sport);
    let template = store.template(Domain::Match);
    let data = match fetchable {
        Some(sport) => {
            entities
                .match_data(sport, id, fetch_timeout(store, Domain::Match))
                .await
        }
        None => None,
    };
    if data.is_none() {
        debug!("no live data for match {sport_key}/{id}, using fallbacks");
    }

    let home = team_name(data.as_ref().map(|m| &m.home), FALLBACK_HOME);
    let away = team_name(data.as_ref().map(|m| &m.away), FALLBACK_AWAY);
    let sport_label = store.sport_label(&sport_key);
    let tab_label = store.tab_label(tab.unwrap_or(DEFAULT_TAB));

    let mut values = Placeholders::new();
    values
        .set("home", home.clone())
        .set("away", away.clone())
        .set("name", format!("{home} vs {away}"))
        .set("brand", store.brand.site_name.clone())
        .set("sport", sport_label.clone())
        .set("tab", tab_label);
    if let Some(data) = &data {
        values
            .set("league", data.league.clone().unwrap_or_default())
            .set("country", data.country.clone().unwrap_or_default())
            .set("season", data.season.clone().unwrap_or_default())
            .set(
                "date",
                data.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            );
    }

    let canonical_path = match_path(&sport_key, id, tab);
    let title = values.fill(pick_pattern(&template.title_patterns, id).unwrap_or(DEFAULT_TITLE));
    let description = Some(values.fill(&template.description_pattern)).filter(|d| !d.is_empty());
    let h1 = Some(values.fill(&template.h1_pattern)).filter(|h| !h.is_empty());

    let og_image = data
        .as_ref()
        .filter(|_| template.open_graph.use_entity_image)
        .and_then(|m| m.league_logo.clone().or_else(|| m.home.logo.clone()));
    let image_alt = og_image
        .as_ref()
        .map(|image| [(image.clone(), format!("{home} vs {away}"))].into());

    let mut breadcrumbs = vec![
        crumb("Home", "/"),
        crumb(sport_label, format!("/sports/{sport_key}/")),
    ];
    breadcrumbs.push(crumb(format!("{home} vs {away}"), canonical_path.clone()));

    let structured_data = data
        .as_ref()
        .filter(|_| template.structured_data)
        .map(|m| sports_event(store, m, &sport_key, &canonical_path));

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
    apply_override(store, &mut entry, &override_keys(Domain::Match, &sport_key, id, tab));

    Draft {
        domain: Domain::Match,
        sport: sport_key,
        entry,
        canonical_path,
        revalidate_secs: template.revalidate_secs,
        enriched: data.is_some(),
    }
}

fn team_name(team: Option<&TeamRef>, fallback: &str) -> String {
    team.map(|t| t.name.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(fallback)
        .to_owned()
}

fn team_json(team: &TeamRef) -> Value {
    let mut map = Map::new();
    map.insert("@type".into(), "SportsTeam".into());
    map.insert("name".into(), team.name.clone().into());
    if let Some(logo) = &team.logo {
        map.insert("logo".into(), logo.clone().into());
    }
    Value::Object(map)
}

fn sports_event(store: &SeoStore, data: &MatchData, sport: &str, path: &str) -> Value {
    let mut event = json!({
        "@context": "https://schema.org",
        "@type": "SportsEvent",
        "name": format!("{} vs {}", data.home.name, data.away.name),
        "sport": store.sport_label(sport),
        "url": absolute(&store.brand.site_url, path),
        "eventStatus": EventStatus::from_short(data.status_short.as_deref()).schema_url(),
        "homeTeam": team_json(&data.home),
        "awayTeam": team_json(&data.away),
        "competitor": [team_json(&data.home), team_json(&data.away)],
    });
    if let Value::Object(map) = &mut event {
        if let Some(date) = data.date {
            map.insert("startDate".into(), date.to_rfc3339().into());
        }
        if let Some(venue) = &data.venue {
            map.insert("location".into(), json!({ "@type": "Place", "name": venue }));
        }
        if let Some(league) = &data.league {
            map.insert(
                "superEvent".into(),
                json!({ "@type": "SportsEvent", "name": league }),
            );
        }
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoEntities;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use sports_api::{LeagueData, PlayerData, Sport};
    use std::time::Duration;

    struct OneMatch(MatchData);

    #[async_trait]
    impl EntitySource for OneMatch {
        async fn match_data(&self, _: Sport, _: &str, _: Duration) -> Option<MatchData> {
            Some(self.0.clone())
        }
        async fn league_data(&self, _: Sport, _: &str, _: Duration) -> Option<LeagueData> {
            None
        }
        async fn player_data(&self, _: Sport, _: &str, _: Duration) -> Option<PlayerData> {
            None
        }
    }

    fn derby() -> MatchData {
        MatchData {
            id: "123".into(),
            sport: Sport::Football,
            home: TeamRef {
                id: Some("42".into()),
                name: "Arsenal".into(),
                logo: Some("https://media.example/42.png".into()),
            },
            away: TeamRef {
                id: Some("49".into()),
                name: "Chelsea".into(),
                logo: None,
            },
            home_score: Some(2),
            away_score: Some(1),
            status_short: Some("PST".into()),
            status_long: None,
            date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap()),
            league: Some("Premier League".into()),
            league_logo: None,
            country: Some("England".into()),
            venue: Some("Emirates Stadium".into()),
            season: Some("2024".into()),
        }
    }

    #[test]
    fn status_codes_map_to_a_closed_set() {
        assert_eq!(EventStatus::from_short(Some("PST")), EventStatus::Postponed);
        assert_eq!(EventStatus::from_short(Some("canc")), EventStatus::Cancelled);
        assert_eq!(EventStatus::from_short(Some("ABD")), EventStatus::Cancelled);
        assert_eq!(EventStatus::from_short(Some("FT")), EventStatus::Scheduled);
        assert_eq!(EventStatus::from_short(None), EventStatus::Scheduled);
    }

    #[tokio::test]
    async fn live_data_fills_the_templates() {
        let store = SeoStore::default();
        let draft = build_match(&store, &OneMatch(derby()), "soccer", "123", Some("stats")).await;
        assert!(draft.enriched);
        assert_eq!(draft.sport, "football");
        assert_eq!(draft.canonical_path, "/match/football/123/stats/");
        let title = draft.entry.title.unwrap();
        assert!(title.contains("Arsenal") && title.contains("Chelsea"), "{title}");
        assert!(draft.entry.description.unwrap().contains("Premier League"));

        let data = draft.entry.structured_data.unwrap();
        assert_eq!(data["@type"], "SportsEvent");
        assert_eq!(data["eventStatus"], "https://schema.org/EventPostponed");
        assert_eq!(data["location"]["name"], "Emirates Stadium");
        assert_eq!(data["startDate"], "2025-03-01T15:00:00+00:00");
    }

    #[tokio::test]
    async fn missing_data_falls_back_to_generic_names() {
        let store = SeoStore::default();
        let draft = build_match(&store, &NoEntities, "football", "777", None).await;
        assert!(!draft.enriched);
        assert_eq!(draft.canonical_path, "/match/football/777/");
        let title = draft.entry.title.unwrap();
        assert!(title.contains("Home") && title.contains("Away"), "{title}");
        assert!(draft.entry.structured_data.is_none());
    }

    #[tokio::test]
    async fn same_id_same_title() {
        let store = SeoStore::default();
        let a = build_match(&store, &NoEntities, "football", "555", None).await;
        let b = build_match(&store, &NoEntities, "football", "5", None).await;
        assert_eq!(a.entry.title, b.entry.title);
    }

    #[tokio::test]
    async fn structured_data_respects_the_toggle() {
        let mut store = SeoStore::default();
        store.match_template.structured_data = false;
        let draft = build_match(&store, &OneMatch(derby()), "football", "123", None).await;
        assert!(draft.entry.structured_data.is_none());
    }

    #[tokio::test]
    async fn tab_override_beats_match_override() {
        let mut store = SeoStore::default();
        store.overrides.insert(
            "match:football:123".into(),
            EntryPatch { title: Some("Match".into()), ..Default::default() },
        );
        store.overrides.insert(
            "match:football:123:lineups".into(),
            EntryPatch { title: Some("Lineups".into()), ..Default::default() },
        );
        let lineups = build_match(&store, &NoEntities, "soccer", "123", Some("lineups")).await;
        assert_eq!(lineups.entry.title.as_deref(), Some("Lineups"));
        let overview = build_match(&store, &NoEntities, "soccer", "123", None).await;
        assert_eq!(overview.entry.title.as_deref(), Some("Match"));
    }
}
