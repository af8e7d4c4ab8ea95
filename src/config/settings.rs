use std::time::Duration;

use super::env::EnvReader;

/// Coefficients of the pair scoring function. Signs are tuning knobs:
/// a negative coefficient penalizes the shared attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSettings {
    pub max_rating_diff: f64,
    pub course_coefficient: f64,
    pub group_coefficient: f64,
    pub type_coefficient: f64,
    pub time_coefficient: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            max_rating_diff: 1000.0,
            course_coefficient: -0.3,
            group_coefficient: 0.2,
            type_coefficient: -0.6,
            time_coefficient: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchmakingSettings {
    pub interval_secs: u64,
    pub sweep_every_ticks: u64,
    pub quality_threshold: f64,
    pub history_depth: u32,
    pub single_role_per_cycle: bool,
    pub scoring: ScoringSettings,
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            sweep_every_ticks: 100,
            quality_threshold: 0.6,
            history_depth: 3,
            single_role_per_cycle: false,
            scoring: ScoringSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifierSettings {
    pub bot_url: String,
    pub secret_key: String,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// 0 keeps retrying forever
    pub max_attempts: u32,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            bot_url: "http://localhost:8000".to_string(),
            secret_key: String::new(),
            user_agent: "KillerMatchmaking/1.0",
            timeout_secs: 10,
            initial_backoff_ms: 200,
            max_backoff_ms: 30_000,
            max_attempts: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    pub path: String,
    pub reload_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "matchmaking.db".to_string(),
            reload_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub database: DatabaseSettings,
    pub matchmaking: MatchmakingSettings,
    pub notifier: NotifierSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            port: 6543,
            database: DatabaseSettings::default(),
            matchmaking: MatchmakingSettings::default(),
            notifier: NotifierSettings::default(),
        }
    }

    /// Reads the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_reader(&EnvReader::new(|key| std::env::var(key).ok()))
    }

    pub fn from_reader(env: &EnvReader) -> Self {
        let defaults = Self::new();
        let scoring = defaults.matchmaking.scoring;

        Self {
            port: env.parsed("PORT", defaults.port),
            database: DatabaseSettings {
                path: env.string("DATABASE_PATH", &defaults.database.path),
                reload_timeout: Duration::try_from_secs_f64(env.parsed(
                    "RELOAD_TIMEOUT",
                    defaults.database.reload_timeout.as_secs_f64(),
                ))
                .unwrap_or(defaults.database.reload_timeout),
            },
            matchmaking: MatchmakingSettings {
                interval_secs: env
                    .parsed("MATCHMAKING_INTERVAL", defaults.matchmaking.interval_secs)
                    .max(1),
                sweep_every_ticks: env.parsed(
                    "CHOSEN_VICTIM_SWEEP_TICKS",
                    defaults.matchmaking.sweep_every_ticks,
                ),
                quality_threshold: env.parsed(
                    "QUALITY_THRESHOLD",
                    defaults.matchmaking.quality_threshold,
                ),
                history_depth: env.parsed(
                    "MATCH_HISTORY_CHECK_DEPTH",
                    defaults.matchmaking.history_depth,
                ),
                single_role_per_cycle: env.parsed(
                    "SINGLE_ROLE_PER_CYCLE",
                    defaults.matchmaking.single_role_per_cycle,
                ),
                scoring: ScoringSettings {
                    max_rating_diff: env.parsed("MAX_RATING_DIFF", scoring.max_rating_diff),
                    course_coefficient: env
                        .parsed("COURSE_COEFFICIENT", scoring.course_coefficient),
                    group_coefficient: env.parsed("GROUP_COEFFICIENT", scoring.group_coefficient),
                    type_coefficient: env.parsed("TYPE_COEFFICIENT", scoring.type_coefficient),
                    time_coefficient: env.parsed("TIME_COEFFICIENT", scoring.time_coefficient),
                },
            },
            notifier: NotifierSettings {
                bot_url: env.string("BOT_URL", &defaults.notifier.bot_url),
                secret_key: env.secret("SECRET_KEY"),
                user_agent: defaults.notifier.user_agent,
                timeout_secs: env.parsed("NOTIFY_TIMEOUT_SECS", defaults.notifier.timeout_secs),
                initial_backoff_ms: env.parsed(
                    "NOTIFY_INITIAL_BACKOFF_MS",
                    defaults.notifier.initial_backoff_ms,
                ),
                max_backoff_ms: env
                    .parsed("NOTIFY_MAX_BACKOFF_MS", defaults.notifier.max_backoff_ms),
                max_attempts: env.parsed("NOTIFY_MAX_ATTEMPTS", defaults.notifier.max_attempts),
            },
        }
    }
}
