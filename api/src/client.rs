use crate::providers::{API_KEY_HEADER, provider_for};
use crate::wire::{
    WireCountryField, WireDate, WireLeagueItem, WireMatch, WirePlayerItem, WireStatus, WireTeam,
};
use crate::{LeagueData, MatchData, PlayerData, Sport, TeamRef};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// Added to the first attempt's timeout for the single retry.
pub const RETRY_INCREMENT: Duration = Duration::from_millis(1500);
/// Upper bound for the retry timeout.
pub const RETRY_CAP: Duration = Duration::from_millis(8000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Where the fetcher may look for a sport's data.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// Provider key, sent as a header on direct calls only.
    pub api_key: Option<String>,
    /// Zero-auth CDN mirrors, tried before the provider.
    pub cdn_bases: BTreeMap<Sport, String>,
    /// Replaces the built-in provider host (self-hosted proxies, tests).
    pub direct_bases: BTreeMap<Sport, String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `SPORTSEO_API_KEY` (or `APISPORTS_KEY`), `SPORTSEO_CDN_<SPORT>`
    /// and `SPORTSEO_API_BASE_<SPORT>` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("SPORTSEO_API_KEY").or_else(|| non_empty("APISPORTS_KEY"));
        let mut cdn_bases = BTreeMap::new();
        let mut direct_bases = BTreeMap::new();
        for sport in Sport::ALL {
            let suffix = sport.env_suffix();
            if let Some(base) = non_empty(&format!("SPORTSEO_CDN_{suffix}")) {
                cdn_bases.insert(sport, base.trim().to_owned());
            }
            if let Some(base) = non_empty(&format!("SPORTSEO_API_BASE_{suffix}")) {
                direct_bases.insert(sport, base.trim().to_owned());
            }
        }

        Self { api_key, cdn_bases, direct_bases }
    }
}

/// Outcome of one walk down the source chain.
#[derive(Debug)]
enum Fetched {
    Item(Value),
    /// At least one source answered, with nothing in it.
    Empty,
    /// Every source failed or timed out.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Source {
    label: &'static str,
    base: String,
    authenticated: bool,
}

/// Sports-data client: CDN mirror first, provider API second, one retry each.
#[derive(Debug, Clone)]
pub struct SportsApi {
    client: Client,
    config: ApiConfig,
}

impl Default for SportsApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl SportsApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("sportseo/0.1 (metadata resolver)")
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch one fixture by numeric id. `None` means no source produced data.
    pub async fn fetch_match(&self, sport: Sport, id: &str, timeout: Duration) -> Option<MatchData> {
        if !is_numeric_id(id) {
            debug!("skipping {sport} match lookup for non-numeric id {id:?}");
            return None;
        }
        let path = provider_for(sport).match_query(id);
        match self.fetch_item(sport, &path, timeout).await {
            Fetched::Item(item) => map_match(item, sport, id),
            Fetched::Empty | Fetched::Unavailable => None,
        }
    }

    /// Fetch a league, walking the season candidates until one yields data.
    pub async fn fetch_league(
        &self,
        sport: Sport,
        id: &str,
        timeout: Duration,
        now: DateTime<Utc>,
    ) -> Option<LeagueData> {
        if !is_numeric_id(id) {
            debug!("skipping {sport} league lookup for non-numeric id {id:?}");
            return None;
        }
        let provider = provider_for(sport);
        for season in season_candidates(sport, now) {
            let path = provider.league_query(id, &season);
            match self.fetch_item(sport, &path, timeout).await {
                Fetched::Item(item) => {
                    if let Some(league) = map_league(item, sport, id, &season) {
                        return Some(league);
                    }
                }
                Fetched::Empty => {}
                Fetched::Unavailable => {
                    warn!("{sport} league {id}: no source answered, giving up on season walk");
                    return None;
                }
            }
        }
        None
    }

    /// Fetch a player, walking the season candidates until one yields data.
    pub async fn fetch_player(
        &self,
        sport: Sport,
        id: &str,
        timeout: Duration,
        now: DateTime<Utc>,
    ) -> Option<PlayerData> {
        if !is_numeric_id(id) {
            debug!("skipping {sport} player lookup for non-numeric id {id:?}");
            return None;
        }
        let provider = provider_for(sport);
        for season in season_candidates(sport, now) {
            let path = provider.player_query(id, &season);
            match self.fetch_item(sport, &path, timeout).await {
                Fetched::Item(item) => {
                    if let Some(player) = map_player(item, sport, id, &season) {
                        return Some(player);
                    }
                }
                Fetched::Empty => {}
                Fetched::Unavailable => {
                    warn!("{sport} player {id}: no source answered, giving up on season walk");
                    return None;
                }
            }
        }
        None
    }

    fn sources(&self, sport: Sport) -> Vec<Source> {
        let mut sources = Vec::with_capacity(2);
        if let Some(base) = self.config.cdn_bases.get(&sport) {
            sources.push(Source {
                label: "cdn",
                base: base.clone(),
                authenticated: false,
            });
        }
        if self.config.api_key.is_some() {
            let base = self
                .config
                .direct_bases
                .get(&sport)
                .cloned()
                .unwrap_or_else(|| provider_for(sport).host.to_owned());
            sources.push(Source {
                label: "direct",
                base,
                authenticated: true,
            });
        } else {
            debug!("no provider key configured; direct {sport} source disabled");
        }
        sources
    }

    /// Fallback chain: each source gets one attempt plus one retry at a longer
    /// timeout. An empty (but successful) answer moves on to the next source.
    async fn fetch_item(&self, sport: Sport, path: &str, timeout: Duration) -> Fetched {
        let mut answered = false;
        for source in self.sources(sport) {
            for attempt_timeout in [timeout, retry_timeout(timeout)] {
                match self.get_json(&source, path, attempt_timeout).await {
                    Ok(body) => match first_item(body) {
                        Ok(Some(item)) => return Fetched::Item(item),
                        Ok(None) => {
                            debug!("{} source returned no {sport} data for {path}", source.label);
                            answered = true;
                            break;
                        }
                        Err(e) => warn!("{} source rejected {path}: {e}", source.label),
                    },
                    Err(e) => warn!(
                        "{} attempt for {path} failed ({}ms): {e}",
                        source.label,
                        attempt_timeout.as_millis()
                    ),
                }
            }
        }
        if answered { Fetched::Empty } else { Fetched::Unavailable }
    }

    async fn get_json(&self, source: &Source, path: &str, timeout: Duration) -> ApiResult<Value> {
        let url = format!("{}{path}", source.base.trim_end_matches('/'));
        let mut request = self.client.get(&url).timeout(timeout);
        if source.authenticated
            && let Some(key) = &self.config.api_key
        {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<Value>()
                .await
                .map_err(|e| ApiError::Parsing(e, url)),
            Err(e) => Err(ApiError::Api(e, url)),
        }
    }
}

/// Timeout for the single retry: a fixed increment on top, capped.
pub fn retry_timeout(timeout: Duration) -> Duration {
    (timeout + RETRY_INCREMENT).min(RETRY_CAP.max(timeout))
}

fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Unwrap the provider envelope. Accepts `{"response": [...]}`, `{"response": {...}}`
/// or a bare item (CDN mirrors). Provider-level `errors` count as a failure.
fn first_item(body: Value) -> ApiResult<Option<Value>> {
    if let Some(errors) = body.get("errors") {
        let has_errors = match errors {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
            _ => true,
        };
        if has_errors {
            return Err(ApiError::Other(format!("provider errors: {errors}")));
        }
    }

    let payload = match body {
        Value::Object(mut map) if map.contains_key("response") => {
            map.remove("response").unwrap_or(Value::Null)
        }
        other => other,
    };

    let item = match payload {
        Value::Array(items) => items.into_iter().find(|v| v.is_object()),
        Value::Object(map) if !map.is_empty() => Some(Value::Object(map)),
        _ => None,
    };
    Ok(item)
}

// ---------------------------------------------------------------------------
// Season discovery
// ---------------------------------------------------------------------------

/// Seasons to try, most likely first. Providers scope league and player data by
/// season and offer no way to ask which one is current.
pub fn season_candidates(sport: Sport, now: DateTime<Utc>) -> Vec<String> {
    let year = now.year();
    match sport {
        Sport::Football => vec![year, year - 1, year - 2]
            .into_iter()
            .map(|y| y.to_string())
            .collect(),
        Sport::Basketball => {
            let start = if now.month() >= 8 { year } else { year - 1 };
            vec![
                format!("{start}-{}", start + 1),
                format!("{}-{start}", start - 1),
                start.to_string(),
            ]
        }
        Sport::Nfl | Sport::Baseball => {
            let start = if now.month() >= 3 { year } else { year - 1 };
            vec![start.to_string(), (start - 1).to_string()]
        }
        Sport::Hockey | Sport::Rugby | Sport::Handball | Sport::Volleyball => {
            let start = if now.month() >= 8 { year } else { year - 1 };
            vec![start.to_string(), (start - 1).to_string(), year.to_string()]
                .into_iter()
                .fold(Vec::new(), |mut acc, s| {
                    if !acc.contains(&s) {
                        acc.push(s);
                    }
                    acc
                })
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: provider wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_match(item: Value, sport: Sport, requested_id: &str) -> Option<MatchData> {
    let raw: WireMatch = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("unparsable {sport} match {requested_id}: {e}");
            return None;
        }
    };
    let header = raw.header();

    let teams = raw.teams.clone().unwrap_or_default();
    let home = teams.home.as_ref().map(map_team).unwrap_or_default();
    let away = teams
        .away
        .as_ref()
        .or(teams.visitors.as_ref())
        .map(map_team)
        .unwrap_or_default();

    let scores = raw
        .goals
        .as_ref()
        .filter(|g| g.home_value().is_some() || g.away_value().is_some())
        .or(raw.scores.as_ref())
        .or(raw.score.as_ref());

    let (status_short, status_long) = match header.status.as_ref().or(raw.status.as_ref()) {
        Some(WireStatus::Text(s)) => (Some(s.clone()), None),
        Some(WireStatus::Detailed { short, long }) => (short.clone(), long.clone()),
        None => (None, None),
    };

    let date = header
        .date
        .as_ref()
        .or(raw.date.as_ref())
        .and_then(parse_wire_date)
        .or_else(|| {
            header
                .timestamp
                .or(raw.timestamp)
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        });

    let league = raw.league.as_ref();
    let country = raw
        .country
        .as_ref()
        .and_then(WireCountryField::name)
        .or_else(|| league.and_then(|l| l.country.as_ref()).and_then(WireCountryField::name));

    Some(MatchData {
        id: header
            .id
            .as_ref()
            .map(|id| id.as_string())
            .unwrap_or_else(|| requested_id.to_owned()),
        sport,
        home,
        away,
        home_score: scores.and_then(|s| s.home_value()),
        away_score: scores.and_then(|s| s.away_value()),
        status_short,
        status_long,
        date,
        league: league.and_then(|l| l.name.clone()),
        league_logo: league.and_then(|l| l.logo.clone()),
        country,
        venue: header
            .venue
            .as_ref()
            .or(raw.venue.as_ref())
            .and_then(|v| v.name.clone()),
        season: league.and_then(|l| l.season.as_ref()).map(|s| s.as_string()),
    })
}

fn map_team(team: &WireTeam) -> TeamRef {
    TeamRef {
        id: team.id.as_ref().map(|id| id.as_string()),
        name: team
            .name
            .clone()
            .or_else(|| team.nickname.clone())
            .unwrap_or_default(),
        logo: team.logo.clone(),
    }
}

fn parse_wire_date(date: &WireDate) -> Option<DateTime<Utc>> {
    match date {
        WireDate::Text(s) => parse_date_text(s),
        WireDate::Parts { date, time, timestamp } => timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| {
                let day = NaiveDate::parse_from_str(date.as_deref()?, "%Y-%m-%d").ok()?;
                let (h, m) = time
                    .as_deref()
                    .and_then(|t| t.split_once(':'))
                    .and_then(|(h, m)| Some((h.parse().ok()?, m.parse().ok()?)))
                    .unwrap_or((0, 0));
                Some(Utc.from_utc_datetime(&day.and_hms_opt(h, m, 0)?))
            }),
    }
}

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt))
        })
}

fn map_league(item: Value, sport: Sport, requested_id: &str, season: &str) -> Option<LeagueData> {
    let raw: WireLeagueItem = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("unparsable {sport} league {requested_id}: {e}");
            return None;
        }
    };
    let league = raw.league.as_ref().unwrap_or(&raw.flat);
    // Football keeps the country next to the league object; flat hosts put it on the league itself.
    let country = raw
        .flat
        .country
        .as_ref()
        .or(league.country.as_ref());

    let current_season = raw
        .seasons
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|s| s.current == Some(true))
        .and_then(|s| s.season.as_ref().or(s.year.as_ref()))
        .map(|s| s.as_string());

    let name = league.name.clone().unwrap_or_default();
    if name.is_empty() && league.id.is_none() {
        return None;
    }

    Some(LeagueData {
        id: league
            .id
            .as_ref()
            .map(|id| id.as_string())
            .unwrap_or_else(|| requested_id.to_owned()),
        sport,
        name,
        logo: league.logo.clone(),
        kind: league.kind.clone(),
        country: country.and_then(WireCountryField::name),
        country_flag: country.and_then(WireCountryField::flag).or_else(|| league.flag.clone()),
        season: current_season.or_else(|| Some(season.to_owned())),
    })
}

fn map_player(item: Value, sport: Sport, requested_id: &str, season: &str) -> Option<PlayerData> {
    let raw: WirePlayerItem = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("unparsable {sport} player {requested_id}: {e}");
            return None;
        }
    };
    let player = raw.player.as_ref().unwrap_or(&raw.flat);
    let stats = raw.statistics.as_deref().unwrap_or_default().first();

    let firstname = player.firstname.clone().filter(|s| !s.is_empty());
    let lastname = player.lastname.clone().filter(|s| !s.is_empty());
    let name = player
        .name
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| match (&firstname, &lastname) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(n), None) | (None, Some(n)) => Some(n.clone()),
            (None, None) => None,
        })?;

    let nationality = player
        .nationality
        .clone()
        .or_else(|| player.country.as_ref().and_then(WireCountryField::name))
        .or_else(|| player.birth.as_ref().and_then(|b| b.country.clone()));

    let team = stats
        .and_then(|s| s.team.as_ref())
        .or(player.team.as_ref())
        .map(map_team)
        .filter(|t| !t.name.is_empty());

    Some(PlayerData {
        id: player
            .id
            .as_ref()
            .map(|id| id.as_string())
            .unwrap_or_else(|| requested_id.to_owned()),
        sport,
        name,
        firstname,
        lastname,
        photo: player.photo.clone().or_else(|| player.image.clone()),
        nationality,
        age: player.age.as_ref().and_then(|a| a.as_u32()),
        position: stats
            .and_then(|s| s.games.as_ref())
            .and_then(|g| g.position.clone())
            .or_else(|| player.position.clone()),
        team,
        season: Some(season.to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::net::TcpListener;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn config_with(cdn: Option<String>, direct: Option<String>) -> ApiConfig {
        let mut config = ApiConfig::default();
        if let Some(cdn) = cdn {
            config.cdn_bases.insert(Sport::Football, cdn);
        }
        if let Some(direct) = direct {
            config.api_key = Some("secret".into());
            config.direct_bases.insert(Sport::Football, direct);
        }
        config
    }

    /// A listener that accepts connections but never answers.
    fn silent_server() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    #[test]
    fn retry_timeout_adds_increment_and_caps() {
        assert_eq!(retry_timeout(Duration::from_millis(1000)), Duration::from_millis(2500));
        assert_eq!(retry_timeout(Duration::from_millis(7000)), RETRY_CAP);
        assert_eq!(retry_timeout(Duration::from_millis(9000)), Duration::from_millis(9000));
    }

    #[test]
    fn football_seasons_are_current_then_prior_years() {
        assert_eq!(season_candidates(Sport::Football, at(2026, 2, 1)), vec!["2026", "2025", "2024"]);
    }

    #[test]
    fn basketball_seasons_roll_over_in_august() {
        assert_eq!(
            season_candidates(Sport::Basketball, at(2026, 2, 1)),
            vec!["2025-2026", "2024-2025", "2025"]
        );
        assert_eq!(season_candidates(Sport::Basketball, at(2026, 9, 1))[0], "2026-2027");
    }

    #[test]
    fn nfl_seasons_roll_over_in_march() {
        assert_eq!(season_candidates(Sport::Nfl, at(2026, 1, 15)), vec!["2025", "2024"]);
        assert_eq!(season_candidates(Sport::Nfl, at(2026, 4, 1)), vec!["2026", "2025"]);
    }

    #[test]
    fn hockey_seasons_are_deduplicated() {
        assert_eq!(season_candidates(Sport::Hockey, at(2026, 10, 1)), vec!["2026", "2025"]);
        assert_eq!(
            season_candidates(Sport::Hockey, at(2026, 3, 1)),
            vec!["2025", "2024", "2026"]
        );
    }

    #[test]
    fn envelope_unwrapping() {
        assert!(first_item(json!({ "response": [] })).unwrap().is_none());
        assert!(first_item(json!({ "response": [{ "id": 1 }] })).unwrap().is_some());
        assert!(first_item(json!({ "id": 1 })).unwrap().is_some());
        assert!(first_item(json!({ "errors": { "token": "bad key" }, "response": [] })).is_err());
        assert!(first_item(json!({ "errors": [], "response": [{ "id": 1 }] })).unwrap().is_some());
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert!(is_numeric_id("123"));
        assert!(!is_numeric_id(""));
        assert!(!is_numeric_id("12a"));
        assert!(!is_numeric_id("1&season=x"));
    }

    #[test]
    fn football_fixture_maps_teams_goals_and_status() {
        let item = json!({
            "fixture": {
                "id": 1035,
                "date": "2024-08-16T19:00:00+00:00",
                "status": { "short": "FT", "long": "Match Finished" },
                "venue": { "name": "Old Trafford", "city": "Manchester" }
            },
            "league": { "id": 39, "name": "Premier League", "country": "England", "season": 2024 },
            "teams": {
                "home": { "id": 33, "name": "Manchester United", "logo": "https://m/33.png" },
                "away": { "id": 36, "name": "Fulham", "logo": "https://m/36.png" }
            },
            "goals": { "home": 1, "away": 0 }
        });
        let m = map_match(item, Sport::Football, "1035").unwrap();
        assert_eq!(m.id, "1035");
        assert_eq!(m.home.name, "Manchester United");
        assert_eq!(m.away.name, "Fulham");
        assert_eq!(m.score_line().as_deref(), Some("1-0"));
        assert_eq!(m.status_short.as_deref(), Some("FT"));
        assert_eq!(m.country.as_deref(), Some("England"));
        assert_eq!(m.venue.as_deref(), Some("Old Trafford"));
        assert_eq!(m.season.as_deref(), Some("2024"));
        assert_eq!(m.date, Some(Utc.with_ymd_and_hms(2024, 8, 16, 19, 0, 0).unwrap()));
    }

    #[test]
    fn nfl_game_wrapper_with_date_parts() {
        let item = json!({
            "game": {
                "id": 7532,
                "date": { "date": "2023-09-08", "time": "00:20" },
                "status": { "short": "FT" }
            },
            "teams": { "home": { "name": "Chiefs" }, "away": { "name": "Lions" } },
            "scores": { "home": { "total": 20 }, "away": { "total": 21 } }
        });
        let m = map_match(item, Sport::Nfl, "7532").unwrap();
        assert_eq!(m.id, "7532");
        assert_eq!(m.score_line().as_deref(), Some("20-21"));
        assert_eq!(m.date, Some(Utc.with_ymd_and_hms(2023, 9, 8, 0, 20, 0).unwrap()));
    }

    #[test]
    fn sparse_match_still_maps() {
        let m = map_match(json!({ "teams": {} }), Sport::Hockey, "5").unwrap();
        assert_eq!(m.id, "5");
        assert!(m.home.name.is_empty());
        assert_eq!(m.score_line(), None);
    }

    #[test]
    fn league_maps_nested_and_flat_dialects() {
        let nested = json!({
            "league": { "id": 39, "name": "Premier League", "type": "League", "logo": "https://m/39.png" },
            "country": { "name": "England", "flag": "https://m/gb.svg" },
            "seasons": [{ "year": 2023, "current": false }, { "year": 2024, "current": true }]
        });
        let l = map_league(nested, Sport::Football, "39", "2026").unwrap();
        assert_eq!(l.name, "Premier League");
        assert_eq!(l.country.as_deref(), Some("England"));
        assert_eq!(l.country_flag.as_deref(), Some("https://m/gb.svg"));
        assert_eq!(l.season.as_deref(), Some("2024"));

        let flat = json!({ "id": 12, "name": "NBA", "country": { "name": "USA" } });
        let l = map_league(flat, Sport::Basketball, "12", "2025-2026").unwrap();
        assert_eq!(l.name, "NBA");
        assert_eq!(l.country.as_deref(), Some("USA"));
        assert_eq!(l.season.as_deref(), Some("2025-2026"));
    }

    #[test]
    fn player_maps_nested_statistics() {
        let item = json!({
            "player": {
                "id": 276, "name": "Neymar", "firstname": "Neymar", "lastname": "da Silva Santos Júnior",
                "age": 32, "nationality": "Brazil", "photo": "https://m/276.png"
            },
            "statistics": [{ "team": { "name": "Al-Hilal" }, "games": { "position": "Attacker" } }]
        });
        let p = map_player(item, Sport::Football, "276", "2024").unwrap();
        assert_eq!(p.name, "Neymar");
        assert_eq!(p.age, Some(32));
        assert_eq!(p.nationality.as_deref(), Some("Brazil"));
        assert_eq!(p.team.map(|t| t.name).as_deref(), Some("Al-Hilal"));
        assert_eq!(p.position.as_deref(), Some("Attacker"));
    }

    #[test]
    fn flat_player_builds_name_from_parts() {
        let item = json!({
            "id": 265, "firstname": "LeBron", "lastname": "James", "birth": { "country": "USA" }
        });
        let p = map_player(item, Sport::Basketball, "265", "2025").unwrap();
        assert_eq!(p.name, "LeBron James");
        assert_eq!(p.nationality.as_deref(), Some("USA"));
    }

    #[test]
    fn nameless_player_is_no_data() {
        assert!(map_player(json!({ "id": 1 }), Sport::Football, "1", "2024").is_none());
    }

    #[tokio::test]
    async fn cdn_is_preferred_and_sends_no_key() {
        let mut cdn = mockito::Server::new_async().await;
        let hit = cdn
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("id".into(), "10".into()))
            .match_header(API_KEY_HEADER, Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"response":[{"teams":{"home":{"name":"A"},"away":{"name":"B"}}}]}"#)
            .create_async()
            .await;

        let api = SportsApi::new(config_with(Some(cdn.url()), Some("http://127.0.0.1:9".into())));
        let m = api
            .fetch_match(Sport::Football, "10", Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(m.home.name, "A");
        hit.assert_async().await;
    }

    #[tokio::test]
    async fn failing_cdn_is_retried_once_then_direct_is_used() {
        let mut cdn = mockito::Server::new_async().await;
        let failing = cdn
            .mock("GET", "/fixtures")
            .match_query(Matcher::Any)
            .with_status(502)
            .expect(2)
            .create_async()
            .await;

        let mut direct = mockito::Server::new_async().await;
        let ok = direct
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("id".into(), "11".into()))
            .match_header(API_KEY_HEADER, "secret")
            .with_status(200)
            .with_body(r#"{"response":[{"teams":{"home":{"name":"H"},"visitors":{"name":"V"}}}]}"#)
            .create_async()
            .await;

        let api = SportsApi::new(config_with(Some(cdn.url()), Some(direct.url())));
        let m = api
            .fetch_match(Sport::Football, "11", Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(m.away.name, "V");
        failing.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn hanging_sources_degrade_to_no_data() {
        let (_cdn_listener, cdn_url) = silent_server();
        let (_direct_listener, direct_url) = silent_server();
        let api = SportsApi::new(config_with(Some(cdn_url), Some(direct_url)));

        let started = std::time::Instant::now();
        let m = api
            .fetch_match(Sport::Football, "12", Duration::from_millis(50))
            .await;
        assert!(m.is_none());
        // Two sources, two attempts each, every attempt bounded.
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn league_walks_seasons_until_data() {
        let mut direct = mockito::Server::new_async().await;
        let empty = direct
            .mock("GET", "/leagues")
            .match_query(Matcher::UrlEncoded("season".into(), "2026".into()))
            .with_status(200)
            .with_body(r#"{"response":[]}"#)
            .create_async()
            .await;
        let found = direct
            .mock("GET", "/leagues")
            .match_query(Matcher::UrlEncoded("season".into(), "2025".into()))
            .with_status(200)
            .with_body(r#"{"response":[{"league":{"id":39,"name":"Premier League"}}]}"#)
            .create_async()
            .await;

        let api = SportsApi::new(config_with(None, Some(direct.url())));
        let league = api
            .fetch_league(Sport::Football, "39", Duration::from_millis(500), at(2026, 2, 1))
            .await
            .unwrap();
        assert_eq!(league.name, "Premier League");
        empty.assert_async().await;
        found.assert_async().await;
    }

    #[tokio::test]
    async fn league_outage_stops_after_one_source_chain() {
        let (_cdn_listener, cdn_url) = silent_server();
        let (_direct_listener, direct_url) = silent_server();
        let api = SportsApi::new(config_with(Some(cdn_url), Some(direct_url)));
        let timeout = Duration::from_millis(50);

        let started = std::time::Instant::now();
        assert!(api.fetch_match(Sport::Football, "12", timeout).await.is_none());
        let match_elapsed = started.elapsed();

        let started = std::time::Instant::now();
        let league = api
            .fetch_league(Sport::Football, "39", timeout, at(2026, 2, 1))
            .await;
        let league_elapsed = started.elapsed();

        assert!(league.is_none());
        // Three football seasons would triple the cost if the walk went on.
        let one_chain = 2 * (timeout + retry_timeout(timeout));
        assert!(league_elapsed < match_elapsed + one_chain, "{league_elapsed:?} vs {match_elapsed:?}");
    }

    #[tokio::test]
    async fn player_walk_ends_when_no_source_answers() {
        let mut direct = mockito::Server::new_async().await;
        let failing = direct
            .mock("GET", "/players")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let api = SportsApi::new(config_with(None, Some(direct.url())));
        let player = api
            .fetch_player(Sport::Football, "276", Duration::from_millis(500), at(2026, 2, 1))
            .await;
        assert!(player.is_none());
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn without_key_or_cdn_nothing_is_fetched() {
        let api = SportsApi::default();
        assert!(
            api.fetch_match(Sport::Football, "1", Duration::from_millis(50))
                .await
                .is_none()
        );
    }

    #[test]
    fn config_reads_env_style_lookup() {
        let config = ApiConfig::from_lookup(|key| match key {
            "APISPORTS_KEY" => Some("k".into()),
            "SPORTSEO_CDN_FOOTBALL" => Some(" https://cdn.example/football ".into()),
            "SPORTSEO_CDN_HOCKEY" => Some("".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(
            config.cdn_bases.get(&Sport::Football).map(String::as_str),
            Some("https://cdn.example/football")
        );
        assert!(!config.cdn_bases.contains_key(&Sport::Hockey));
    }
}
