use crate::store::model::Domain;
use crate::store::records::{RecordKeys, RecordKind};
use sports_api::client::ApiConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DISK_CACHE_WINDOW: Duration = Duration::from_secs(1);
pub const DEFAULT_DB_CACHE_TTL: Duration = Duration::from_millis(500);

/// Every environment knob, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Explicit configuration directory; the usual fallbacks apply when unset or missing.
    pub config_dir: Option<PathBuf>,
    pub project_root: PathBuf,
    /// Raw `SPORTSEO_CONFIG_JSON` blob (the environment layer).
    pub config_json: Option<String>,
    /// Edge runtimes have no filesystem or database access.
    pub edge: bool,
    pub disk_cache_window: Duration,
    /// Zero disables database caching.
    pub db_cache_ttl: Duration,
    pub record_keys: RecordKeys,
    pub database_url: Option<String>,
    pub api: ApiConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: None,
            project_root: PathBuf::from("."),
            config_json: None,
            edge: false,
            disk_cache_window: DEFAULT_DISK_CACHE_WINDOW,
            db_cache_ttl: DEFAULT_DB_CACHE_TTL,
            record_keys: RecordKeys::default(),
            database_url: None,
            api: ApiConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok());
        if let Ok(cwd) = std::env::current_dir() {
            settings.project_root = cwd;
        }
        settings
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let millis = |key: &str, default: Duration| match non_empty(key) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    log::warn!("{key}={raw:?} is not a number of milliseconds, using default");
                    default
                }
            },
            None => default,
        };

        let mut record_keys = RecordKeys::default();
        let preferred = [
            ("SPORTSEO_DB_KEY_GLOBAL", RecordKind::Global),
            ("SPORTSEO_DB_KEY_MATCH", RecordKind::Domain(Domain::Match)),
            ("SPORTSEO_DB_KEY_LEAGUE", RecordKind::Domain(Domain::League)),
            ("SPORTSEO_DB_KEY_PLAYER", RecordKind::Domain(Domain::Player)),
        ];
        for (var, kind) in preferred {
            if let Some(key) = non_empty(var) {
                record_keys.prefer(kind, &key);
            }
        }

        Self {
            config_dir: non_empty("SPORTSEO_CONFIG_DIR").map(PathBuf::from),
            project_root: PathBuf::from("."),
            config_json: non_empty("SPORTSEO_CONFIG_JSON"),
            edge: non_empty("SPORTSEO_RUNTIME").is_some_and(|v| v.eq_ignore_ascii_case("edge")),
            disk_cache_window: millis("SPORTSEO_DISK_CACHE_MS", DEFAULT_DISK_CACHE_WINDOW),
            db_cache_ttl: millis("SPORTSEO_DB_CACHE_TTL_MS", DEFAULT_DB_CACHE_TTL),
            record_keys,
            database_url: non_empty("SPORTSEO_DATABASE_URL"),
            api: ApiConfig::from_lookup(&lookup),
        }
    }
}
