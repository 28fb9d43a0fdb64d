//! Compiled defaults: the lowest layer. Every field is populated here so a
//! merged store is complete even when no other layer exists.

use super::model::{Brand, DomainTemplate, EntryPatch, Labels, OpenGraphConfig, SeoStore};
use std::collections::BTreeMap;

const SITE_NAME: &str = "LiveScores";
const SITE_URL: &str = "https://www.example-livescores.com";

impl Default for Brand {
    fn default() -> Self {
        Self {
            site_name: SITE_NAME.into(),
            site_url: SITE_URL.into(),
            domain: "example-livescores.com".into(),
            locale: "en_US".into(),
            logo: "/images/logo.png".into(),
            title_prefix: String::new(),
            title_suffix: format!(" | {SITE_NAME}"),
            default_description:
                "Live scores, fixtures, results and standings for football, basketball, hockey and more."
                    .into(),
            default_image: "/images/og-default.png".into(),
            favicon: Some("/favicon.ico".into()),
            theme_color: None,
            twitter_handle: None,
        }
    }
}

impl Default for OpenGraphConfig {
    fn default() -> Self {
        Self {
            image: None,
            image_alt: None,
            kind: "website".into(),
            use_entity_image: false,
        }
    }
}

impl Default for DomainTemplate {
    fn default() -> Self {
        Self {
            revalidate_secs: 60,
            timeout_ms: 2500,
            title_patterns: vec!["{brand}".into()],
            description_pattern: String::new(),
            h1_pattern: String::new(),
            keywords: Vec::new(),
            open_graph: OpenGraphConfig::default(),
            structured_data: true,
        }
    }
}

impl Default for SeoStore {
    fn default() -> Self {
        Self {
            brand: Brand::default(),
            home: EntryPatch {
                title: Some("Live Scores, Fixtures & Results".into()),
                description: Some(
                    "Follow live scores, fixtures, results and standings across every major sport."
                        .into(),
                ),
                h1: Some("Live Scores".into()),
                keywords: Some(vec!["live scores".into(), "fixtures".into(), "results".into()]),
                ..Default::default()
            },
            pages: default_pages(),
            overrides: BTreeMap::new(),
            labels: default_labels(),
            match_template: match_template(),
            league_template: league_template(),
            player_template: player_template(),
            header: None,
            footer: None,
            directives: None,
        }
    }
}

fn page(title: &str, description: &str, h1: &str) -> EntryPatch {
    EntryPatch {
        title: Some(title.into()),
        description: Some(description.into()),
        h1: Some(h1.into()),
        ..Default::default()
    }
}

fn default_pages() -> BTreeMap<String, EntryPatch> {
    BTreeMap::from([
        (
            "contact".to_owned(),
            page("Contact Us", "Get in touch with the team behind the site.", "Contact Us"),
        ),
        (
            "privacy".to_owned(),
            page("Privacy Policy", "How we collect, use and protect your data.", "Privacy Policy"),
        ),
        (
            "terms".to_owned(),
            page(
                "Terms of Service",
                "The terms that govern your use of this site.",
                "Terms of Service",
            ),
        ),
    ])
}

fn default_labels() -> Labels {
    let pairs = |items: &[(&str, &str)]| {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>()
    };
    Labels {
        sports: pairs(&[
            ("football", "Football"),
            ("basketball", "Basketball"),
            ("hockey", "Ice Hockey"),
            ("nfl", "American Football"),
            ("baseball", "Baseball"),
            ("rugby", "Rugby"),
            ("handball", "Handball"),
            ("volleyball", "Volleyball"),
        ]),
        tabs: pairs(&[
            ("overview", "Overview"),
            ("live", "Live"),
            ("fixtures", "Fixtures"),
            ("results", "Results"),
            ("standings", "Standings"),
            ("stats", "Stats"),
            ("lineups", "Lineups"),
            ("h2h", "Head to Head"),
            ("odds", "Odds"),
        ]),
    }
}

fn match_template() -> DomainTemplate {
    DomainTemplate {
        revalidate_secs: 30,
        timeout_ms: 2500,
        title_patterns: vec![
            "{home} vs {away} Live Score".into(),
            "{home} vs {away}: {tab} & Result".into(),
            "{home} - {away} {sport} {tab}".into(),
        ],
        description_pattern:
            "{home} vs {away} {tab}: live score, result, lineups and stats from {league}. Follow it on {brand}."
                .into(),
        h1_pattern: "{home} vs {away}".into(),
        keywords: vec!["{home}".into(), "{away}".into(), "{home} vs {away}".into(), "{sport}".into()],
        open_graph: OpenGraphConfig {
            kind: "article".into(),
            ..OpenGraphConfig::default()
        },
        structured_data: true,
    }
}

fn league_template() -> DomainTemplate {
    DomainTemplate {
        revalidate_secs: 300,
        timeout_ms: 2500,
        title_patterns: vec![
            "{name} {tab} {season}".into(),
            "{name} {season} {tab} & Live Scores".into(),
        ],
        description_pattern:
            "{name} {season} {tab}: fixtures, results and standings for {country} {sport} on {brand}."
                .into(),
        h1_pattern: "{name} {tab}".into(),
        keywords: vec!["{name}".into(), "{name} {season}".into(), "{country} {sport}".into()],
        open_graph: OpenGraphConfig {
            use_entity_image: true,
            ..OpenGraphConfig::default()
        },
        structured_data: true,
    }
}

fn player_template() -> DomainTemplate {
    DomainTemplate {
        revalidate_secs: 3600,
        timeout_ms: 2500,
        title_patterns: vec![
            "{name} Profile, Stats & Career".into(),
            "{name} ({team}) {sport} Player Profile".into(),
        ],
        description_pattern:
            "{name}: {country} {sport} player at {team}. Season {season} stats, matches and profile on {brand}."
                .into(),
        h1_pattern: "{name}".into(),
        keywords: vec!["{name}".into(), "{name} stats".into(), "{team}".into()],
        open_graph: OpenGraphConfig {
            kind: "profile".into(),
            use_entity_image: true,
            ..OpenGraphConfig::default()
        },
        structured_data: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fully_populated() {
        let store = SeoStore::default();
        assert!(!store.brand.site_name.is_empty());
        assert!(store.brand.site_url.starts_with("https://"));
        assert!(store.home.title.is_some());
        for key in ["contact", "privacy", "terms"] {
            assert!(store.pages.contains_key(key), "missing default page {key}");
        }
        for tpl in [&store.match_template, &store.league_template, &store.player_template] {
            assert!(!tpl.title_patterns.is_empty());
            assert!(!tpl.h1_pattern.is_empty());
            assert!(tpl.timeout_ms > 0);
        }
    }

    #[test]
    fn default_suffix_names_the_site() {
        let brand = Brand::default();
        assert!(brand.title_suffix.ends_with(&brand.site_name));
    }
}
