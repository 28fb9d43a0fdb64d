/// Direct provider endpoints, one host per sport.
/// All hosts speak the same envelope (`{"response": [...]}`) but the item shapes differ.
use crate::Sport;

pub const API_KEY_HEADER: &str = "x-apisports-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub host: &'static str,
    /// Fixture lookup path; football calls them fixtures, everyone else games.
    pub match_path: &'static str,
    pub league_path: &'static str,
    pub player_path: &'static str,
}

pub fn provider_for(sport: Sport) -> Provider {
    let host = match sport {
        Sport::Football => "https://v3.football.api-sports.io",
        Sport::Basketball => "https://v1.basketball.api-sports.io",
        Sport::Hockey => "https://v1.hockey.api-sports.io",
        Sport::Nfl => "https://v1.american-football.api-sports.io",
        Sport::Baseball => "https://v1.baseball.api-sports.io",
        Sport::Rugby => "https://v1.rugby.api-sports.io",
        Sport::Handball => "https://v1.handball.api-sports.io",
        Sport::Volleyball => "https://v1.volleyball.api-sports.io",
    };
    let match_path = match sport {
        Sport::Football => "/fixtures",
        _ => "/games",
    };
    Provider {
        host,
        match_path,
        league_path: "/leagues",
        player_path: "/players",
    }
}

impl Provider {
    pub fn match_query(&self, id: &str) -> String {
        format!("{}?id={id}", self.match_path)
    }

    pub fn league_query(&self, id: &str, season: &str) -> String {
        format!("{}?id={id}&season={season}", self.league_path)
    }

    pub fn player_query(&self, id: &str, season: &str) -> String {
        format!("{}?id={id}&season={season}", self.player_path)
    }
}
