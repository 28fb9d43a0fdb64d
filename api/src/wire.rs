/// Provider raw wire types — serde shapes for the response dialects we tolerate.
/// These map to the clean domain types in client.rs. Nothing here is assumed present.
use serde::Deserialize;

/// Ids arrive as numbers from some hosts and as strings from mirrors.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    pub fn as_string(&self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s.clone(),
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            WireId::Number(n) => u32::try_from(*n).ok(),
            WireId::Text(s) => s.trim().parse().ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matches: `fixture`/`game` wrapper or flat root
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    pub id: Option<WireId>,
    pub date: Option<WireDate>,
    pub timestamp: Option<i64>,
    pub status: Option<WireStatus>,
    pub venue: Option<WireVenue>,
    /// Football nests id/date/status/venue under `fixture`.
    pub fixture: Option<Box<WireMatch>>,
    /// American football nests them under `game`.
    pub game: Option<Box<WireMatch>>,
    pub league: Option<WireLeague>,
    pub country: Option<WireCountryField>,
    pub teams: Option<WireTeams>,
    pub goals: Option<WireScores>,
    pub scores: Option<WireScores>,
    pub score: Option<WireScores>,
}

impl WireMatch {
    /// The wrapper holding the fixture header, or the root for flat dialects.
    pub fn header(&self) -> &WireMatch {
        self.fixture
            .as_deref()
            .or(self.game.as_deref())
            .unwrap_or(self)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireDate {
    Text(String),
    Parts {
        date: Option<String>,
        time: Option<String>,
        timestamp: Option<i64>,
    },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireStatus {
    Text(String),
    Detailed {
        short: Option<String>,
        long: Option<String>,
    },
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireVenue {
    pub name: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTeams {
    pub home: Option<WireTeam>,
    pub away: Option<WireTeam>,
    /// NBA-style hosts call the away side `visitors`.
    pub visitors: Option<WireTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTeam {
    pub id: Option<WireId>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireScores {
    pub home: Option<WireScore>,
    pub away: Option<WireScore>,
    pub visitors: Option<WireScore>,
    /// Football's `score` object only carries per-period lines.
    pub fulltime: Option<Box<WireScores>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireScore {
    Number(i64),
    Text(String),
    Detailed {
        total: Option<i64>,
        points: Option<i64>,
    },
}

impl WireScore {
    pub fn value(&self) -> Option<i64> {
        match self {
            WireScore::Number(n) => Some(*n),
            WireScore::Text(s) => s.trim().parse().ok(),
            WireScore::Detailed { total, points } => total.or(*points),
        }
    }
}

impl WireScores {
    pub fn home_value(&self) -> Option<i64> {
        self.home
            .as_ref()
            .and_then(WireScore::value)
            .or_else(|| self.fulltime.as_ref().and_then(|f| f.home_value()))
    }

    pub fn away_value(&self) -> Option<i64> {
        self.away
            .as_ref()
            .or(self.visitors.as_ref())
            .and_then(WireScore::value)
            .or_else(|| self.fulltime.as_ref().and_then(|f| f.away_value()))
    }
}

// ---------------------------------------------------------------------------
// Leagues: nested `league` object (football) or flat root
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireLeague {
    pub id: Option<WireId>,
    pub name: Option<String>,
    pub logo: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub country: Option<WireCountryField>,
    pub flag: Option<String>,
    pub season: Option<WireId>,
}

/// `country` is a plain name on football leagues and an object elsewhere.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireCountryField {
    Name(String),
    Object(WireCountry),
}

impl WireCountryField {
    pub fn name(&self) -> Option<String> {
        match self {
            WireCountryField::Name(name) => Some(name.clone()),
            WireCountryField::Object(c) => c.name.clone(),
        }
    }

    pub fn flag(&self) -> Option<String> {
        match self {
            WireCountryField::Name(_) => None,
            WireCountryField::Object(c) => c.flag.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireCountry {
    pub name: Option<String>,
    pub code: Option<String>,
    pub flag: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireLeagueItem {
    pub league: Option<WireLeague>,
    #[serde(flatten)]
    pub flat: WireLeague,
    pub seasons: Option<Vec<WireSeason>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireSeason {
    pub year: Option<WireId>,
    pub season: Option<WireId>,
    pub current: Option<bool>,
}

// ---------------------------------------------------------------------------
// Players: nested `player` + `statistics` (football) or flat root
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayer {
    pub id: Option<WireId>,
    pub name: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<WireId>,
    pub nationality: Option<String>,
    pub country: Option<WireCountryField>,
    pub birth: Option<WireBirth>,
    pub photo: Option<String>,
    pub image: Option<String>,
    pub position: Option<String>,
    pub team: Option<WireTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireBirth {
    pub country: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayerItem {
    pub player: Option<WirePlayer>,
    #[serde(flatten)]
    pub flat: WirePlayer,
    pub statistics: Option<Vec<WireStatistic>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireStatistic {
    pub team: Option<WireTeam>,
    pub league: Option<WireLeague>,
    pub games: Option<WireGames>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireGames {
    pub position: Option<String>,
}
