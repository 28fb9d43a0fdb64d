use super::{
    Draft, Placeholders, absolute, apply_override, crumb, fetch_timeout, fill_keywords,
    override_keys, pick_pattern, sport_of,
};
use crate::entity::EntitySource;
use crate::store::model::{Domain, EntryPatch, SeoStore};
use log::debug;
use serde_json::{Value, json};
use sports_api::PlayerData;

const DEFAULT_TITLE: &str = "{name}";
const FALLBACK_NAME: &str = "Player Profile";

pub fn player_path(sport: &str, id: &str) -> String {
    format!("/player/{sport}/{id}/")
}

pub async fn build_player(
    store: &SeoStore,
    entities: &dyn EntitySource,
    sport: &str,
    id: &str,
) -> Draft {
    let (sport_key, fetchable) = sport_of(sport);
    let template = store.template(Domain::Player);
    let data = match fetchable {
        Some(sport) => {
            entities
                .player_data(sport, id, fetch_timeout(store, Domain::Player))
                .await
        }
        None => None,
    };
    let canonical_path = player_path(&sport_key, id);
    let sport_label = store.sport_label(&sport_key);

    let mut entry = match &data {
        Some(player) => enriched_entry(store, player, &sport_key, id, &canonical_path),
        None => {
            debug!("no live data for player {sport_key}/{id}, using fallbacks");
            EntryPatch {
                title: Some(FALLBACK_NAME.into()),
                h1: Some(FALLBACK_NAME.into()),
                canonical: Some(canonical_path.clone()),
                ..Default::default()
            }
        }
    };
    let display_name = data
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| FALLBACK_NAME.to_owned());
    entry.breadcrumbs = Some(vec![
        crumb("Home", "/"),
        crumb(sport_label, format!("/sports/{sport_key}/")),
        crumb(display_name, canonical_path.clone()),
    ]);
    apply_override(store, &mut entry, &override_keys(Domain::Player, &sport_key, id, None));

    Draft {
        domain: Domain::Player,
        sport: sport_key,
        entry,
        canonical_path,
        revalidate_secs: template.revalidate_secs,
        enriched: data.is_some(),
    }
}

fn enriched_entry(
    store: &SeoStore,
    player: &PlayerData,
    sport: &str,
    id: &str,
    canonical_path: &str,
) -> EntryPatch {
    let template = store.template(Domain::Player);
    let team = player.team.as_ref().map(|t| t.name.clone()).unwrap_or_default();

    let mut values = Placeholders::new();
    values
        .set("name", player.name.clone())
        .set("team", team)
        .set("brand", store.brand.site_name.clone())
        .set("sport", store.sport_label(sport))
        .set("country", player.nationality.clone().unwrap_or_default())
        .set("season", player.season.clone().unwrap_or_default());

    let title = values.fill(pick_pattern(&template.title_patterns, id).unwrap_or(DEFAULT_TITLE));
    let description = Some(values.fill(&template.description_pattern)).filter(|d| !d.is_empty());
    let h1 = Some(values.fill(&template.h1_pattern)).filter(|h| !h.is_empty());

    let og_image = player
        .photo
        .clone()
        .filter(|_| template.open_graph.use_entity_image);
    let image_alt = og_image
        .as_ref()
        .map(|photo| [(photo.clone(), player.name.clone())].into());

    EntryPatch {
        h1: h1.or_else(|| Some(title.clone())),
        title: Some(title),
        description,
        canonical: Some(canonical_path.to_owned()),
        keywords: fill_keywords(&template.keywords, &values),
        og_image,
        structured_data: template
            .structured_data
            .then(|| athlete(store, player, sport, canonical_path)),
        image_alt,
        ..Default::default()
    }
}

fn athlete(store: &SeoStore, player: &PlayerData, sport: &str, path: &str) -> Value {
    let mut person = json!({
        "@context": "https://schema.org",
        "@type": "Person",
        "name": player.name,
        "url": absolute(&store.brand.site_url, path),
        "jobTitle": format!("{} player", store.sport_label(sport)),
    });
    if let Value::Object(map) = &mut person {
        if let Some(first) = &player.firstname {
            map.insert("givenName".into(), first.clone().into());
        }
        if let Some(last) = &player.lastname {
            map.insert("familyName".into(), last.clone().into());
        }
        if let Some(photo) = &player.photo {
            map.insert("image".into(), photo.clone().into());
        }
        if let Some(nationality) = &player.nationality {
            map.insert(
                "nationality".into(),
                json!({ "@type": "Country", "name": nationality }),
            );
        }
        if let Some(team) = &player.team {
            map.insert(
                "memberOf".into(),
                json!({ "@type": "SportsTeam", "name": team.name }),
            );
        }
    }
    person
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoEntities;
    use async_trait::async_trait;
    use sports_api::{LeagueData, MatchData, Sport, TeamRef};
    use std::time::Duration;

    struct OnePlayer;

    #[async_trait]
    impl EntitySource for OnePlayer {
        async fn match_data(&self, _: Sport, _: &str, _: Duration) -> Option<MatchData> {
            None
        }
        async fn league_data(&self, _: Sport, _: &str, _: Duration) -> Option<LeagueData> {
            None
        }
        async fn player_data(&self, sport: Sport, id: &str, _: Duration) -> Option<PlayerData> {
            Some(PlayerData {
                id: id.into(),
                sport,
                name: "Lionel Messi".into(),
                firstname: Some("Lionel".into()),
                lastname: Some("Messi".into()),
                photo: Some("https://media.example/p/154.png".into()),
                nationality: Some("Argentina".into()),
                age: Some(37),
                position: Some("Attacker".into()),
                team: Some(TeamRef {
                    id: Some("9568".into()),
                    name: "Inter Miami".into(),
                    logo: None,
                }),
                season: Some("2024".into()),
            })
        }
    }

    #[tokio::test]
    async fn builds_an_athlete_profile() {
        let store = SeoStore::default();
        let draft = build_player(&store, &OnePlayer, "soccer", "154").await;
        assert_eq!(draft.canonical_path, "/player/football/154/");
        assert_eq!(draft.entry.h1.as_deref(), Some("Lionel Messi"));
        assert!(draft.entry.description.unwrap().contains("Inter Miami"));
        let person = draft.entry.structured_data.unwrap();
        assert_eq!(person["@type"], "Person");
        assert_eq!(person["memberOf"]["name"], "Inter Miami");
        assert_eq!(person["nationality"]["name"], "Argentina");
    }

    #[tokio::test]
    async fn missing_player_gets_the_profile_fallback() {
        let store = SeoStore::default();
        let draft = build_player(&store, &NoEntities, "football", "1").await;
        assert!(!draft.enriched);
        assert_eq!(draft.entry.title.as_deref(), Some("Player Profile"));
        assert_eq!(draft.entry.canonical.as_deref(), Some("/player/football/1/"));
    }

    #[tokio::test]
    async fn override_applies_to_the_player() {
        let mut store = SeoStore::default();
        store.overrides.insert(
            "player:football:1".into(),
            EntryPatch { description: Some("Hand-written bio".into()), ..Default::default() },
        );
        let draft = build_player(&store, &NoEntities, "soccer", "1").await;
        assert_eq!(draft.entry.description.as_deref(), Some("Hand-written bio"));
    }
}
