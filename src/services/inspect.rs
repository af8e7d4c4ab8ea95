use anyhow::Result;
use colored::Colorize;

use crate::config::AppConfig;
use crate::database::{self, SqliteHistoryOracle};
use crate::domain::PlayerProfile;
use crate::matching::{HistoryOracle, QueueCandidates};

/// Prints who would be queued for the active game
pub struct InspectService {
    config: AppConfig,
}

impl InspectService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<()> {
        let pool = database::create_pool(&self.config.database.path)?;
        let oracle = SqliteHistoryOracle::new(pool);

        let Some(game) = oracle.active_game()? else {
            println!("{}", "No active game".yellow());
            return Ok(());
        };

        let candidates = oracle.queue_candidates(game)?;
        println!("{} {}", "Active game:".bold(), game);
        print!("{}", render(&candidates));
        Ok(())
    }
}

fn render(candidates: &QueueCandidates) -> String {
    let mut out = String::new();
    render_side(&mut out, "Killers", &candidates.killers);
    render_side(&mut out, "Victims", &candidates.victims);
    out
}

fn render_side(out: &mut String, title: &str, players: &[PlayerProfile]) {
    out.push_str(&format!("{} ({})\n", title.green().bold(), players.len()));
    if players.is_empty() {
        out.push_str(&format!("  {}\n", "none".dimmed()));
    }
    for player in players {
        out.push_str(&format!("  {}\n", player));
    }
}
