//! The seam between builders and the sports-data fetcher.

use async_trait::async_trait;
use chrono::Utc;
use sports_api::client::SportsApi;
use sports_api::{LeagueData, MatchData, PlayerData, Sport};
use std::time::Duration;

/// Anything that can look up entities. `None` always means "no data";
/// implementations never fail loudly.
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn match_data(&self, sport: Sport, id: &str, timeout: Duration) -> Option<MatchData>;

    async fn league_data(&self, sport: Sport, id: &str, timeout: Duration) -> Option<LeagueData>;

    async fn player_data(&self, sport: Sport, id: &str, timeout: Duration) -> Option<PlayerData>;
}

#[async_trait]
impl EntitySource for SportsApi {
    async fn match_data(&self, sport: Sport, id: &str, timeout: Duration) -> Option<MatchData> {
        self.fetch_match(sport, id, timeout).await
    }

    async fn league_data(&self, sport: Sport, id: &str, timeout: Duration) -> Option<LeagueData> {
        self.fetch_league(sport, id, timeout, Utc::now()).await
    }

    async fn player_data(&self, sport: Sport, id: &str, timeout: Duration) -> Option<PlayerData> {
        self.fetch_player(sport, id, timeout, Utc::now()).await
    }
}

/// A source with nothing in it. Offline runs and tests use it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEntities;

#[async_trait]
impl EntitySource for NoEntities {
    async fn match_data(&self, _: Sport, _: &str, _: Duration) -> Option<MatchData> {
        None
    }

    async fn league_data(&self, _: Sport, _: &str, _: Duration) -> Option<LeagueData> {
        None
    }

    async fn player_data(&self, _: Sport, _: &str, _: Duration) -> Option<PlayerData> {
        None
    }
}
