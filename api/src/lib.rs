pub mod client;
pub mod providers;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the provider wire formats
// ---------------------------------------------------------------------------

/// Canonical sport keys. Every alias a route may carry collapses into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Sport {
    Football,
    Basketball,
    Hockey,
    Nfl,
    Baseball,
    Rugby,
    Handball,
    Volleyball,
}

impl Sport {
    pub const ALL: [Sport; 8] = [
        Sport::Football,
        Sport::Basketball,
        Sport::Hockey,
        Sport::Nfl,
        Sport::Baseball,
        Sport::Rugby,
        Sport::Handball,
        Sport::Volleyball,
    ];

    /// Parse a route segment, accepting the common aliases.
    pub fn from_key(raw: &str) -> Option<Sport> {
        let key = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "football" | "soccer" => Some(Sport::Football),
            "basketball" => Some(Sport::Basketball),
            "hockey" | "ice-hockey" | "icehockey" => Some(Sport::Hockey),
            "nfl" | "american-football" | "americanfootball" => Some(Sport::Nfl),
            "baseball" | "mlb" => Some(Sport::Baseball),
            "rugby" | "rugby-union" => Some(Sport::Rugby),
            "handball" => Some(Sport::Handball),
            "volleyball" => Some(Sport::Volleyball),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Basketball => "basketball",
            Sport::Hockey => "hockey",
            Sport::Nfl => "nfl",
            Sport::Baseball => "baseball",
            Sport::Rugby => "rugby",
            Sport::Handball => "handball",
            Sport::Volleyball => "volleyball",
        }
    }

    /// Suffix used for per-sport environment variables (`SPORTSEO_CDN_FOOTBALL`, …).
    pub fn env_suffix(&self) -> String {
        self.key().to_ascii_uppercase()
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Normalize a sport route segment to the key used everywhere else.
/// Unknown sports pass through lowercased so their pages still resolve.
pub fn normalize_sport_key(raw: &str) -> String {
    match Sport::from_key(raw) {
        Some(sport) => sport.key().to_owned(),
        None => raw.trim().to_ascii_lowercase(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamRef {
    pub id: Option<String>,
    pub name: String,
    pub logo: Option<String>,
}

/// One fixture/game as the metadata builders consume it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchData {
    pub id: String,
    pub sport: Sport,
    pub home: TeamRef,
    pub away: TeamRef,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub status_short: Option<String>, // "NS", "FT", "PST", "CANC", …
    pub status_long: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub league: Option<String>,
    pub league_logo: Option<String>,
    pub country: Option<String>,
    pub venue: Option<String>,
    pub season: Option<String>,
}

impl MatchData {
    pub fn score_line(&self) -> Option<String> {
        let (home, away) = self.home_score.zip(self.away_score)?;
        Some(format!("{home}-{away}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueData {
    pub id: String,
    pub sport: Sport,
    pub name: String,
    pub logo: Option<String>,
    pub kind: Option<String>, // "League" | "Cup"
    pub country: Option<String>,
    pub country_flag: Option<String>,
    pub season: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerData {
    pub id: String,
    pub sport: Sport,
    pub name: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub photo: Option<String>,
    pub nationality: Option<String>,
    pub age: Option<u32>,
    pub position: Option<String>,
    pub team: Option<TeamRef>,
    pub season: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sport_aliases_collapse_to_canonical_keys() {
        assert_eq!(Sport::from_key("soccer"), Some(Sport::Football));
        assert_eq!(Sport::from_key("Ice-Hockey"), Some(Sport::Hockey));
        assert_eq!(Sport::from_key("ice_hockey"), Some(Sport::Hockey));
        assert_eq!(Sport::from_key("american-football"), Some(Sport::Nfl));
        assert_eq!(Sport::from_key("cricket"), None);
    }

    #[test]
    fn unknown_sports_pass_through_lowercased() {
        assert_eq!(normalize_sport_key("soccer"), "football");
        assert_eq!(normalize_sport_key(" Cricket "), "cricket");
    }

    #[test]
    fn score_line_needs_both_sides() {
        let mut m = MatchData {
            id: "1".into(),
            sport: Sport::Football,
            home: TeamRef::default(),
            away: TeamRef::default(),
            home_score: Some(2),
            away_score: None,
            status_short: None,
            status_long: None,
            date: None,
            league: None,
            league_logo: None,
            country: None,
            venue: None,
            season: None,
        };
        assert_eq!(m.score_line(), None);
        m.away_score = Some(1);
        assert_eq!(m.score_line().as_deref(), Some("2-1"));
    }
}
