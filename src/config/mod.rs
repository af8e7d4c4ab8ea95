pub mod env;
pub mod settings;

pub use env::EnvReader;
pub use settings::{AppConfig, DatabaseSettings, MatchmakingSettings, NotifierSettings, ScoringSettings};
